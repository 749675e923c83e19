//! The operator catalog.
//!
//! Every operator maps `(source pixels, resolved parameters, random source)`
//! to a new image of the same dimensions. Operators never touch their input
//! and report numeric trouble as an [`OperatorError`] so the pipeline can
//! degrade that one task.
//!
//! ```text
//! geometric:   hflip vflip rotate crop translate scale patchShuffle
//! photometric: brightness contrast intensity colorJitter fancyPca hsvJitter randomHsv
//! noise:       noise waveNoise erase
//! filter:      blur motionBlur edgeEnhance elastic
//! ```

mod filter;
mod geometric;
mod noise;
mod photometric;
mod resample;

pub use filter::{Blur, EdgeEnhance, Elastic, MotionBlur};
pub use geometric::{Crop, HFlip, PatchShuffle, Rotate, Scale, Translate, VFlip};
pub use noise::{Erase, Noise, WaveNoise};
pub use photometric::{
    Brightness, ColorJitter, Contrast, FancyPca, HsvJitter, Intensity, RandomHsv,
};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use image::RgbaImage;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::{OperatorError, ParamError};
use crate::params::ParameterSet;

/// Identifier of a catalog operator.
///
/// The string form (`as_str`) is part of the output naming scheme and must
/// not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OperatorId {
    HFlip,
    VFlip,
    Rotate,
    Crop,
    Noise,
    Brightness,
    Contrast,
    Scale,
    Blur,
    ColorJitter,
    MotionBlur,
    Elastic,
    Erase,
    Translate,
    WaveNoise,
    FancyPca,
    HsvJitter,
    Intensity,
    EdgeEnhance,
    RandomHsv,
    PatchShuffle,
}

impl OperatorId {
    /// Every operator, in catalog order.
    pub const ALL: [OperatorId; 21] = [
        Self::HFlip,
        Self::VFlip,
        Self::Rotate,
        Self::Crop,
        Self::Noise,
        Self::Brightness,
        Self::Contrast,
        Self::Scale,
        Self::Blur,
        Self::ColorJitter,
        Self::MotionBlur,
        Self::Elastic,
        Self::Erase,
        Self::Translate,
        Self::WaveNoise,
        Self::FancyPca,
        Self::HsvJitter,
        Self::Intensity,
        Self::EdgeEnhance,
        Self::RandomHsv,
        Self::PatchShuffle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::HFlip => "hflip",
            Self::VFlip => "vflip",
            Self::Rotate => "rotate",
            Self::Crop => "crop",
            Self::Noise => "noise",
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Scale => "scale",
            Self::Blur => "blur",
            Self::ColorJitter => "colorJitter",
            Self::MotionBlur => "motionBlur",
            Self::Elastic => "elastic",
            Self::Erase => "erase",
            Self::Translate => "translate",
            Self::WaveNoise => "waveNoise",
            Self::FancyPca => "fancyPca",
            Self::HsvJitter => "hsvJitter",
            Self::Intensity => "intensity",
            Self::EdgeEnhance => "edgeEnhance",
            Self::RandomHsv => "randomHsv",
            Self::PatchShuffle => "patchShuffle",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::HFlip => "Horizontal Flip",
            Self::VFlip => "Vertical Flip",
            Self::Rotate => "Rotate",
            Self::Crop => "Center Crop",
            Self::Noise => "Add Noise",
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Scale => "Random Scale",
            Self::Blur => "Gaussian Blur",
            Self::ColorJitter => "Color Jitter",
            Self::MotionBlur => "Motion Blur",
            Self::Elastic => "Elastic Deformation",
            Self::Erase => "Random Erasing",
            Self::Translate => "Translate",
            Self::WaveNoise => "Wave Noise",
            Self::FancyPca => "Fancy PCA",
            Self::HsvJitter => "HSV Jitter",
            Self::Intensity => "Intensity",
            Self::EdgeEnhance => "Edge Enhance",
            Self::RandomHsv => "Random HSV",
            Self::PatchShuffle => "Patch Shuffle",
        }
    }

    pub fn has_parameters(self) -> bool {
        !matches!(self, Self::HFlip | Self::VFlip)
    }

    pub fn descriptor(self) -> OperatorDescriptor {
        OperatorDescriptor {
            id: self,
            display_name: self.display_name(),
            has_parameters: self.has_parameters(),
        }
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for OperatorId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| ParamError::UnknownOperator(s.to_string()))
    }
}

impl TryFrom<String> for OperatorId {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OperatorId> for String {
    fn from(id: OperatorId) -> Self {
        id.as_str().to_string()
    }
}

/// Catalog entry shown to callers choosing operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OperatorDescriptor {
    pub id: OperatorId,
    pub display_name: &'static str,
    pub has_parameters: bool,
}

/// The single capability every operator implements.
pub trait Operator: Send + Sync {
    /// Which catalog entry this is.
    fn id(&self) -> OperatorId;

    /// Produce a transformed copy of `image`.
    ///
    /// The result must have the same width and height as the input.
    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError>;
}

/// Builds an operator from the resolved parameter set.
pub type OperatorFactory = fn(&ParameterSet) -> Arc<dyn Operator>;

/// Maps operator ids to factories.
///
/// Adding an operator means adding a factory here, not editing a dispatch
/// conditional in the pipeline.
pub struct Registry {
    factories: BTreeMap<OperatorId, OperatorFactory>,
}

impl Registry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// The full 21-operator catalog.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry.register(OperatorId::HFlip, |_| Arc::new(HFlip));
        registry.register(OperatorId::VFlip, |_| Arc::new(VFlip));
        registry.register(OperatorId::Rotate, |p| Arc::new(Rotate::new(p.rotate.clone())));
        registry.register(OperatorId::Crop, |p| Arc::new(Crop::new(p.crop.clone())));
        registry.register(OperatorId::Noise, |p| Arc::new(Noise::new(p.noise.clone())));
        registry.register(OperatorId::Brightness, |p| {
            Arc::new(Brightness::new(p.brightness.clone()))
        });
        registry.register(OperatorId::Contrast, |p| {
            Arc::new(Contrast::new(p.contrast.clone()))
        });
        registry.register(OperatorId::Scale, |p| Arc::new(Scale::new(p.scale.clone())));
        registry.register(OperatorId::Blur, |p| Arc::new(Blur::new(p.blur.clone())));
        registry.register(OperatorId::ColorJitter, |p| {
            Arc::new(ColorJitter::new(p.color_jitter.clone()))
        });
        registry.register(OperatorId::MotionBlur, |p| {
            Arc::new(MotionBlur::new(p.motion_blur.clone()))
        });
        registry.register(OperatorId::Elastic, |p| {
            Arc::new(Elastic::new(p.elastic.clone()))
        });
        registry.register(OperatorId::Erase, |p| Arc::new(Erase::new(p.erase.clone())));
        registry.register(OperatorId::Translate, |p| {
            Arc::new(Translate::new(p.translate.clone()))
        });
        registry.register(OperatorId::WaveNoise, |p| {
            Arc::new(WaveNoise::new(p.wave_noise.clone()))
        });
        registry.register(OperatorId::FancyPca, |p| {
            Arc::new(FancyPca::new(p.fancy_pca.clone()))
        });
        registry.register(OperatorId::HsvJitter, |p| {
            Arc::new(HsvJitter::new(p.hsv_jitter.clone()))
        });
        registry.register(OperatorId::Intensity, |p| {
            Arc::new(Intensity::new(p.intensity.clone()))
        });
        registry.register(OperatorId::EdgeEnhance, |p| {
            Arc::new(EdgeEnhance::new(p.edge_enhance.clone()))
        });
        registry.register(OperatorId::RandomHsv, |p| {
            Arc::new(RandomHsv::new(p.random_hsv.clone()))
        });
        registry.register(OperatorId::PatchShuffle, |p| {
            Arc::new(PatchShuffle::new(p.patch_shuffle.clone()))
        });
        registry
    }

    /// Register (or replace) the factory for `id`.
    pub fn register(&mut self, id: OperatorId, factory: OperatorFactory) {
        self.factories.insert(id, factory);
    }

    /// Build the operator for `id` with its section of `params`.
    pub fn build(&self, id: OperatorId, params: &ParameterSet) -> Option<Arc<dyn Operator>> {
        self.factories.get(&id).map(|factory| factory(params))
    }

    pub fn contains(&self, id: OperatorId) -> bool {
        self.factories.contains_key(&id)
    }

    /// Descriptors for every registered operator, in catalog order.
    pub fn descriptors(&self) -> Vec<OperatorDescriptor> {
        OperatorId::ALL
            .into_iter()
            .filter(|id| self.contains(*id))
            .map(OperatorId::descriptor)
            .collect()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Shorthand for an `InvalidParameter` error.
pub(crate) fn invalid(
    operator: OperatorId,
    field: &'static str,
    message: impl Into<String>,
) -> OperatorError {
    OperatorError::InvalidParameter {
        operator,
        field,
        message: message.into(),
    }
}

/// Fail with `Numeric` unless `value` is finite.
pub(crate) fn ensure_finite(
    operator: OperatorId,
    what: &str,
    value: f32,
) -> Result<f32, OperatorError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(OperatorError::Numeric {
            operator,
            message: format!("{what} is {value}"),
        })
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::gradient;
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_catalog_has_21_entries() {
        assert_eq!(OperatorId::ALL.len(), 21);
        let parameterless: Vec<_> = OperatorId::ALL
            .iter()
            .filter(|id| !id.has_parameters())
            .collect();
        assert_eq!(parameterless, vec![&OperatorId::HFlip, &OperatorId::VFlip]);
    }

    #[test]
    fn test_id_round_trip() {
        for id in OperatorId::ALL {
            assert_eq!(id.as_str().parse::<OperatorId>().unwrap(), id);
        }
        assert!("sharpen".parse::<OperatorId>().is_err());
        assert_eq!(OperatorId::ColorJitter.to_string(), "colorJitter");
    }

    #[test]
    fn test_standard_registry_builds_every_operator() {
        let registry = Registry::standard();
        let params = ParameterSet::default();
        for id in OperatorId::ALL {
            let op = registry.build(id, &params).unwrap();
            assert_eq!(op.id(), id);
        }
        assert_eq!(registry.descriptors().len(), 21);
    }

    #[test]
    fn test_every_operator_preserves_dimensions() {
        let registry = Registry::standard();
        let params = ParameterSet::default();
        let mut rng = StdRng::seed_from_u64(11);
        for (w, h) in [(1, 1), (2, 3), (17, 9), (40, 40)] {
            let input = gradient(w, h);
            for id in OperatorId::ALL {
                let op = registry.build(id, &params).unwrap();
                let output = op.apply(&input, &mut rng).unwrap();
                assert_eq!(output.dimensions(), (w, h), "{id} changed {w}x{h}");
            }
        }
    }

    #[test]
    fn test_empty_registry_builds_nothing() {
        let registry = Registry::empty();
        assert!(registry
            .build(OperatorId::Blur, &ParameterSet::default())
            .is_none());
        assert!(registry.descriptors().is_empty());
    }
}
