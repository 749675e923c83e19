//! Operator parameters.
//!
//! A [`ParameterSet`] holds one typed section per parametrized operator. It
//! deserializes with `#[serde(default)]` at every level, so a config file that
//! names a single field of a single operator keeps every other default.
//!
//! Updates never mutate: [`ParameterSet::with_field`] and
//! [`ParameterSet::with_bound`] return a new set and leave the receiver (and
//! every other operator's section) as it was.

mod range;
mod types;

pub use range::{Bound, Range, Sampling};
pub use types::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ParamError;
use crate::ops::OperatorId;

/// Resolved parameters for every operator in the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParameterSet {
    pub rotate: RotateParams,
    pub crop: CropParams,
    pub noise: NoiseParams,
    pub brightness: BrightnessParams,
    pub contrast: ContrastParams,
    pub scale: ScaleParams,
    pub blur: BlurParams,
    pub color_jitter: ColorJitterParams,
    pub motion_blur: MotionBlurParams,
    pub elastic: ElasticParams,
    pub erase: EraseParams,
    pub translate: TranslateParams,
    pub wave_noise: WaveNoiseParams,
    pub fancy_pca: FancyPcaParams,
    pub hsv_jitter: HsvJitterParams,
    pub intensity: IntensityParams,
    pub edge_enhance: EdgeEnhanceParams,
    pub random_hsv: RandomHsvParams,
    pub patch_shuffle: PatchShuffleParams,
}

impl ParameterSet {
    /// The operator's section as a JSON object, or `None` for parameterless operators.
    pub fn section(&self, op: OperatorId) -> Option<Value> {
        use OperatorId::*;
        let value = match op {
            HFlip | VFlip => return None,
            Rotate => serde_json::to_value(&self.rotate),
            Crop => serde_json::to_value(&self.crop),
            Noise => serde_json::to_value(&self.noise),
            Brightness => serde_json::to_value(&self.brightness),
            Contrast => serde_json::to_value(&self.contrast),
            Scale => serde_json::to_value(&self.scale),
            Blur => serde_json::to_value(&self.blur),
            ColorJitter => serde_json::to_value(&self.color_jitter),
            MotionBlur => serde_json::to_value(&self.motion_blur),
            Elastic => serde_json::to_value(&self.elastic),
            Erase => serde_json::to_value(&self.erase),
            Translate => serde_json::to_value(&self.translate),
            WaveNoise => serde_json::to_value(&self.wave_noise),
            FancyPca => serde_json::to_value(&self.fancy_pca),
            HsvJitter => serde_json::to_value(&self.hsv_jitter),
            Intensity => serde_json::to_value(&self.intensity),
            EdgeEnhance => serde_json::to_value(&self.edge_enhance),
            RandomHsv => serde_json::to_value(&self.random_hsv),
            PatchShuffle => serde_json::to_value(&self.patch_shuffle),
        };
        // Plain structs of numbers and unit enums always serialize.
        value.ok()
    }

    /// Return a copy with one field of one operator replaced.
    ///
    /// The value must fit the field's type (a `[low, high]` pair for ranges,
    /// a number, or an enumeration string).
    pub fn with_field(
        &self,
        op: OperatorId,
        field: &str,
        value: Value,
    ) -> Result<Self, ParamError> {
        let mut section = self.section(op).ok_or(ParamError::NoParameters(op))?;
        let slot = section
            .get_mut(field)
            .ok_or_else(|| ParamError::UnknownField {
                operator: op,
                field: field.to_string(),
            })?;
        *slot = value;
        self.with_section(op, field, section)
    }

    /// Return a copy with one bound of a range field replaced.
    ///
    /// The other bound keeps its current value.
    pub fn with_bound(
        &self,
        op: OperatorId,
        field: &str,
        bound: Bound,
        value: f32,
    ) -> Result<Self, ParamError> {
        let mut section = self.section(op).ok_or(ParamError::NoParameters(op))?;
        let slot = section
            .get_mut(field)
            .ok_or_else(|| ParamError::UnknownField {
                operator: op,
                field: field.to_string(),
            })?;
        let pair = slot
            .as_array_mut()
            .filter(|pair| pair.len() == 2)
            .ok_or_else(|| ParamError::NotARange {
                operator: op,
                field: field.to_string(),
            })?;
        pair[bound.index()] = Value::from(value);
        self.with_section(op, field, section)
    }

    fn with_section(&self, op: OperatorId, field: &str, section: Value) -> Result<Self, ParamError> {
        use OperatorId::*;
        let invalid = |e: serde_json::Error| ParamError::InvalidValue {
            operator: op,
            field: field.to_string(),
            message: e.to_string(),
        };

        let mut next = self.clone();
        match op {
            HFlip | VFlip => return Err(ParamError::NoParameters(op)),
            Rotate => next.rotate = serde_json::from_value(section).map_err(invalid)?,
            Crop => next.crop = serde_json::from_value(section).map_err(invalid)?,
            Noise => next.noise = serde_json::from_value(section).map_err(invalid)?,
            Brightness => next.brightness = serde_json::from_value(section).map_err(invalid)?,
            Contrast => next.contrast = serde_json::from_value(section).map_err(invalid)?,
            Scale => next.scale = serde_json::from_value(section).map_err(invalid)?,
            Blur => next.blur = serde_json::from_value(section).map_err(invalid)?,
            ColorJitter => next.color_jitter = serde_json::from_value(section).map_err(invalid)?,
            MotionBlur => next.motion_blur = serde_json::from_value(section).map_err(invalid)?,
            Elastic => next.elastic = serde_json::from_value(section).map_err(invalid)?,
            Erase => next.erase = serde_json::from_value(section).map_err(invalid)?,
            Translate => next.translate = serde_json::from_value(section).map_err(invalid)?,
            WaveNoise => next.wave_noise = serde_json::from_value(section).map_err(invalid)?,
            FancyPca => next.fancy_pca = serde_json::from_value(section).map_err(invalid)?,
            HsvJitter => next.hsv_jitter = serde_json::from_value(section).map_err(invalid)?,
            Intensity => next.intensity = serde_json::from_value(section).map_err(invalid)?,
            EdgeEnhance => next.edge_enhance = serde_json::from_value(section).map_err(invalid)?,
            RandomHsv => next.random_hsv = serde_json::from_value(section).map_err(invalid)?,
            PatchShuffle => {
                next.patch_shuffle = serde_json::from_value(section).map_err(invalid)?
            }
        }
        Ok(next)
    }
}
