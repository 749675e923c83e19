//! Per-operator parameter structs with defaults.

use serde::{Deserialize, Serialize};

use super::range::{Range, Sampling};

/// `rotate`: angle in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RotateParams {
    pub angle_range: Range,
    pub sampling: Sampling,
}

impl Default for RotateParams {
    fn default() -> Self {
        Self {
            angle_range: Range::new(-30.0, 30.0),
            sampling: Sampling::Midpoint,
        }
    }
}

/// `crop`: side of the centered square as a fraction of the short edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CropParams {
    pub ratio: f32,
}

impl Default for CropParams {
    fn default() -> Self {
        Self { ratio: 0.8 }
    }
}

/// Noise flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NoiseMode {
    #[default]
    #[serde(rename = "gaussian")]
    Gaussian,
    #[serde(rename = "salt")]
    Salt,
    #[serde(rename = "pepper")]
    Pepper,
    #[serde(rename = "s&p", alias = "salt&pepper")]
    SaltAndPepper,
}

/// `noise`: mode plus per-pixel probability for salt/pepper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoiseParams {
    pub mode: NoiseMode,
    pub amount: f32,
}

impl Default for NoiseParams {
    fn default() -> Self {
        Self {
            mode: NoiseMode::Gaussian,
            amount: 0.05,
        }
    }
}

/// `brightness`: multiplicative factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrightnessParams {
    pub factor_range: Range,
    pub sampling: Sampling,
}

impl Default for BrightnessParams {
    fn default() -> Self {
        Self {
            factor_range: Range::new(0.5, 1.5),
            sampling: Sampling::Midpoint,
        }
    }
}

/// `contrast`: stretch factor about mid-gray.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ContrastParams {
    pub factor_range: Range,
    pub sampling: Sampling,
}

impl Default for ContrastParams {
    fn default() -> Self {
        Self {
            factor_range: Range::new(0.5, 1.5),
            sampling: Sampling::Midpoint,
        }
    }
}

/// `scale`: zoom factor, drawn per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScaleParams {
    pub range: Range,
}

impl Default for ScaleParams {
    fn default() -> Self {
        Self {
            range: Range::new(0.8, 1.2),
        }
    }
}

/// `blur`: kernel size in pixels, drawn per task and forced odd.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BlurParams {
    pub kernel_range: Range,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            kernel_range: Range::new(3.0, 7.0),
        }
    }
}

/// `colorJitter`: symmetric jitter amplitudes.
///
/// `saturation` is accepted but not applied yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ColorJitterParams {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
}

impl Default for ColorJitterParams {
    fn default() -> Self {
        Self {
            brightness: 0.2,
            contrast: 0.2,
            saturation: 0.2,
        }
    }
}

/// Axis along which motion blur smears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlurDirection {
    #[default]
    Horizontal,
    Vertical,
}

/// `motionBlur`: kernel length in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MotionBlurParams {
    pub size: u32,
    pub direction: BlurDirection,
}

impl Default for MotionBlurParams {
    fn default() -> Self {
        Self {
            size: 15,
            direction: BlurDirection::Horizontal,
        }
    }
}

/// `elastic`: displacement scale and smoothing width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ElasticParams {
    pub alpha: f32,
    pub sigma: f32,
}

impl Default for ElasticParams {
    fn default() -> Self {
        Self {
            alpha: 34.0,
            sigma: 4.0,
        }
    }
}

/// `erase`: probability, area fraction bounds, minimum aspect ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EraseParams {
    pub p: f32,
    pub sl: f32,
    pub sh: f32,
    pub r1: f32,
}

impl Default for EraseParams {
    fn default() -> Self {
        Self {
            p: 0.5,
            sl: 0.02,
            sh: 0.4,
            r1: 0.3,
        }
    }
}

/// `translate`: shift in pixels, drawn per axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TranslateParams {
    pub range: Range,
}

impl Default for TranslateParams {
    fn default() -> Self {
        Self {
            range: Range::new(-10.0, 10.0),
        }
    }
}

/// `waveNoise`: displacement amplitude (pixels) and frequency (cycles per pixel).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WaveNoiseParams {
    pub amplitude: f32,
    pub frequency: f32,
}

impl Default for WaveNoiseParams {
    fn default() -> Self {
        Self {
            amplitude: 5.0,
            frequency: 0.1,
        }
    }
}

/// `fancyPca`: half-width of the uniform coefficient draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FancyPcaParams {
    pub alpha_std: f32,
}

impl Default for FancyPcaParams {
    fn default() -> Self {
        Self { alpha_std: 0.1 }
    }
}

/// `hsvJitter`: fixed hue shift in degrees plus S/V scale ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HsvJitterParams {
    pub h_shift: f32,
    pub s_scale: Range,
    pub v_scale: Range,
}

impl Default for HsvJitterParams {
    fn default() -> Self {
        Self {
            h_shift: 10.0,
            s_scale: Range::new(0.8, 1.2),
            v_scale: Range::new(0.8, 1.2),
        }
    }
}

/// `intensity`: multiplicative factor, drawn per task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IntensityParams {
    pub factor: Range,
}

impl Default for IntensityParams {
    fn default() -> Self {
        Self {
            factor: Range::new(0.7, 1.3),
        }
    }
}

/// `edgeEnhance`: weight of the Laplacian response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EdgeEnhanceParams {
    pub strength: f32,
}

impl Default for EdgeEnhanceParams {
    fn default() -> Self {
        Self { strength: 1.0 }
    }
}

/// `randomHsv`: ranges for the H, S and V multipliers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RandomHsvParams {
    pub h_range: Range,
    pub s_range: Range,
    pub v_range: Range,
}

impl Default for RandomHsvParams {
    fn default() -> Self {
        Self {
            h_range: Range::new(0.0, 360.0),
            s_range: Range::new(0.0, 1.0),
            v_range: Range::new(0.0, 1.0),
        }
    }
}

/// `patchShuffle`: block edge length in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PatchShuffleParams {
    pub grid_size: u32,
}

impl Default for PatchShuffleParams {
    fn default() -> Self {
        Self { grid_size: 16 }
    }
}
