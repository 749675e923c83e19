//! Photometric operators: per-pixel color and intensity remaps.
//!
//! These only touch R, G and B. Alpha passes through.

use image::{Rgba, RgbaImage};
use rand::{Rng, RngCore};

use crate::color::{clamp_u8, hsv_to_rgb8, rgb8_to_hsv};
use crate::error::OperatorError;
use crate::params::{
    BrightnessParams, ColorJitterParams, ContrastParams, FancyPcaParams, HsvJitterParams,
    IntensityParams, RandomHsvParams,
};

use super::{ensure_finite, Operator, OperatorId};

/// ImageNet RGB eigenvalues used by the PCA color augmentation.
const PCA_EIGENVALUES: [f32; 3] = [0.2175, 0.0188, 0.0045];

/// Rows are the principal directions matching `PCA_EIGENVALUES`.
const PCA_EIGENVECTORS: [[f32; 3]; 3] = [[0.5, 0.5, 0.5], [0.3, 0.3, -0.6], [0.2, -0.2, 0.1]];

/// Apply `f` to the RGB part of every pixel.
fn map_rgb<F>(image: &RgbaImage, f: F) -> RgbaImage
where
    F: Fn([u8; 3]) -> [u8; 3],
{
    let mut out = image.clone();
    for px in out.pixels_mut() {
        let [r, g, b, a] = px.0;
        let [r, g, b] = f([r, g, b]);
        *px = Rgba([r, g, b, a]);
    }
    out
}

fn scale_channels(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    rgb.map(|c| clamp_u8(c as f32 * factor))
}

fn stretch_channels(rgb: [u8; 3], factor: f32) -> [u8; 3] {
    let intercept = 128.0 * (1.0 - factor);
    rgb.map(|c| clamp_u8(c as f32 * factor + intercept))
}

/// Uniform draw from `[-1, 1)`.
fn symmetric_unit(rng: &mut dyn RngCore) -> f32 {
    rng.gen::<f32>() * 2.0 - 1.0
}

/// `v' = v * factor`.
pub struct Brightness {
    params: BrightnessParams,
}

impl Brightness {
    pub fn new(params: BrightnessParams) -> Self {
        Self { params }
    }
}

impl Operator for Brightness {
    fn id(&self) -> OperatorId {
        OperatorId::Brightness
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let factor = self.params.factor_range.draw(self.params.sampling, rng);
        let factor = ensure_finite(self.id(), "factor", factor)?;
        Ok(map_rgb(image, |rgb| scale_channels(rgb, factor)))
    }
}

/// `v' = v * factor + 128 * (1 - factor)`.
pub struct Contrast {
    params: ContrastParams,
}

impl Contrast {
    pub fn new(params: ContrastParams) -> Self {
        Self { params }
    }
}

impl Operator for Contrast {
    fn id(&self) -> OperatorId {
        OperatorId::Contrast
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let factor = self.params.factor_range.draw(self.params.sampling, rng);
        let factor = ensure_finite(self.id(), "factor", factor)?;
        Ok(map_rgb(image, |rgb| stretch_channels(rgb, factor)))
    }
}

/// Same formula as brightness, always drawn per task.
pub struct Intensity {
    params: IntensityParams,
}

impl Intensity {
    pub fn new(params: IntensityParams) -> Self {
        Self { params }
    }
}

impl Operator for Intensity {
    fn id(&self) -> OperatorId {
        OperatorId::Intensity
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let factor = ensure_finite(self.id(), "factor", self.params.factor.sample(rng))?;
        Ok(map_rgb(image, |rgb| scale_channels(rgb, factor)))
    }
}

/// Random brightness then contrast, each `1 + U(-1, 1) * amplitude`.
pub struct ColorJitter {
    params: ColorJitterParams,
}

impl ColorJitter {
    pub fn new(params: ColorJitterParams) -> Self {
        Self { params }
    }
}

impl Operator for ColorJitter {
    fn id(&self) -> OperatorId {
        OperatorId::ColorJitter
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let brightness = 1.0 + symmetric_unit(rng) * self.params.brightness;
        let contrast = 1.0 + symmetric_unit(rng) * self.params.contrast;
        // Drawn to keep the random stream stable once saturation jitter lands.
        let _saturation = 1.0 + symmetric_unit(rng) * self.params.saturation;

        let brightness = ensure_finite(self.id(), "brightness", brightness)?;
        let contrast = ensure_finite(self.id(), "contrast", contrast)?;

        Ok(map_rgb(image, |rgb| {
            stretch_channels(scale_channels(rgb, brightness), contrast)
        }))
    }
}

/// AlexNet-style PCA lighting noise, one offset for the whole image.
pub struct FancyPca {
    params: FancyPcaParams,
}

impl FancyPca {
    pub fn new(params: FancyPcaParams) -> Self {
        Self { params }
    }

    /// RGB offset in `[0, 1]` units for the given coefficients.
    fn offset(alpha: [f32; 3]) -> [f32; 3] {
        let mut noise = [0.0f32; 3];
        for (c, n) in noise.iter_mut().enumerate() {
            *n = (0..3)
                .map(|k| PCA_EIGENVECTORS[k][c] * PCA_EIGENVALUES[k] * alpha[k])
                .sum();
        }
        noise
    }
}

impl Operator for FancyPca {
    fn id(&self) -> OperatorId {
        OperatorId::FancyPca
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let std = self.params.alpha_std;
        let alpha = [
            symmetric_unit(rng) * std,
            symmetric_unit(rng) * std,
            symmetric_unit(rng) * std,
        ];
        let offset = Self::offset(alpha).map(|n| n * 255.0);
        for n in offset {
            ensure_finite(self.id(), "offset", n)?;
        }

        Ok(map_rgb(image, |[r, g, b]| {
            [
                clamp_u8(r as f32 + offset[0]),
                clamp_u8(g as f32 + offset[1]),
                clamp_u8(b as f32 + offset[2]),
            ]
        }))
    }
}

/// Fixed hue rotation plus per-task S and V scaling.
pub struct HsvJitter {
    params: HsvJitterParams,
}

impl HsvJitter {
    pub fn new(params: HsvJitterParams) -> Self {
        Self { params }
    }
}

impl Operator for HsvJitter {
    fn id(&self) -> OperatorId {
        OperatorId::HsvJitter
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let shift = ensure_finite(self.id(), "hShift", self.params.h_shift)?;
        let s_scale = ensure_finite(self.id(), "sScale", self.params.s_scale.sample(rng))?;
        let v_scale = ensure_finite(self.id(), "vScale", self.params.v_scale.sample(rng))?;

        Ok(map_rgb(image, |rgb| {
            let mut hsv = rgb8_to_hsv(rgb);
            hsv.h = (hsv.h + shift).rem_euclid(360.0);
            hsv.s = (hsv.s * s_scale).clamp(0.0, 1.0);
            hsv.v = (hsv.v * v_scale).clamp(0.0, 1.0);
            hsv_to_rgb8(hsv)
        }))
    }
}

/// Remap hue, saturation and value by per-task multipliers.
///
/// Hue is scaled against 180 degrees and wraps into `[0, 180)`.
pub struct RandomHsv {
    params: RandomHsvParams,
}

impl RandomHsv {
    pub fn new(params: RandomHsvParams) -> Self {
        Self { params }
    }
}

impl Operator for RandomHsv {
    fn id(&self) -> OperatorId {
        OperatorId::RandomHsv
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let h_scale = ensure_finite(self.id(), "hScale", self.params.h_range.sample(rng))?;
        let s_scale = ensure_finite(self.id(), "sScale", self.params.s_range.sample(rng))?;
        let v_scale = ensure_finite(self.id(), "vScale", self.params.v_range.sample(rng))?;

        Ok(map_rgb(image, |rgb| {
            let mut hsv = rgb8_to_hsv(rgb);
            hsv.h = (hsv.h * h_scale / 180.0).rem_euclid(180.0);
            hsv.s = (hsv.s * s_scale).clamp(0.0, 1.0);
            hsv.v = (hsv.v * v_scale).clamp(0.0, 1.0);
            hsv_to_rgb8(hsv)
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{gradient, solid};
    use crate::params::{Range, Sampling};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn brightness(factor: f32) -> Brightness {
        Brightness::new(BrightnessParams {
            factor_range: Range::fixed(factor),
            sampling: Sampling::Midpoint,
        })
    }

    #[test]
    fn test_brightness_doubles_without_clamping() {
        let img = solid(1, 1, [100, 100, 100, 255]);
        let out = brightness(2.0).apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_brightness_clamps_overflow() {
        let img = solid(1, 1, [100, 100, 100, 255]);
        let out = brightness(3.0).apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_brightness_uses_midpoint_by_default() {
        let img = solid(1, 1, [100, 50, 10, 255]);
        let op = Brightness::new(BrightnessParams {
            factor_range: Range::new(1.0, 3.0),
            sampling: Sampling::Midpoint,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [200, 100, 20, 255]);
    }

    #[test]
    fn test_brightness_leaves_alpha() {
        let img = solid(2, 2, [10, 10, 10, 77]);
        let out = brightness(5.0).apply(&img, &mut rng()).unwrap();
        assert!(out.pixels().all(|p| p.0[3] == 77));
    }

    #[test]
    fn test_contrast_pivots_on_128() {
        let img = solid(1, 1, [128, 0, 255, 255]);
        let op = Contrast::new(ContrastParams {
            factor_range: Range::fixed(0.5),
            sampling: Sampling::Midpoint,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [128, 64, 192, 255]);
    }

    #[test]
    fn test_intensity_draw_stays_in_range() {
        let img = solid(1, 1, [100, 100, 100, 255]);
        let op = Intensity::new(IntensityParams {
            factor: Range::new(0.5, 1.0),
        });
        let mut rng = rng();
        for _ in 0..50 {
            let v = op.apply(&img, &mut rng).unwrap().get_pixel(0, 0).0[0];
            assert!((50..=100).contains(&v));
        }
    }

    #[test]
    fn test_color_jitter_zero_amplitude_is_identity() {
        let img = gradient(6, 6);
        let op = ColorJitter::new(ColorJitterParams {
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
        });
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_fancy_pca_offset_is_uniform() {
        let img = solid(3, 3, [120, 120, 120, 255]);
        let op = FancyPca::new(FancyPcaParams { alpha_std: 1.0 });
        let out = op.apply(&img, &mut rng()).unwrap();
        let first = out.get_pixel(0, 0).0;
        assert!(out.pixels().all(|p| p.0 == first));
    }

    #[test]
    fn test_fancy_pca_offset_math() {
        let offset = FancyPca::offset([1.0, 0.0, 0.0]);
        assert!((offset[0] - 0.10875).abs() < 1e-6);
        assert!((offset[2] - 0.10875).abs() < 1e-6);
        let offset = FancyPca::offset([0.0, 0.0, 0.0]);
        assert_eq!(offset, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_hsv_jitter_neutral_settings_round_trip() {
        let img = gradient(8, 8);
        let op = HsvJitter::new(HsvJitterParams {
            h_shift: 0.0,
            s_scale: Range::fixed(1.0),
            v_scale: Range::fixed(1.0),
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        for (a, b) in img.pixels().zip(out.pixels()) {
            for c in 0..3 {
                assert!((a.0[c] as i32 - b.0[c] as i32).abs() <= 1);
            }
        }
    }

    #[test]
    fn test_hsv_jitter_full_turn_shift() {
        let img = solid(1, 1, [255, 0, 0, 255]);
        let op = HsvJitter::new(HsvJitterParams {
            h_shift: 120.0,
            s_scale: Range::fixed(1.0),
            v_scale: Range::fixed(1.0),
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0, 255, 0, 255]);
    }

    #[test]
    fn test_random_hsv_zero_value_blackens() {
        let img = gradient(4, 4);
        let op = RandomHsv::new(RandomHsvParams {
            h_range: Range::fixed(180.0),
            s_range: Range::fixed(1.0),
            v_range: Range::fixed(0.0),
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0, 255]));
    }

    #[test]
    fn test_non_finite_factor_is_an_error() {
        let op = brightness(f32::NAN);
        let err = op.apply(&gradient(2, 2), &mut rng()).unwrap_err();
        assert!(matches!(err, OperatorError::Numeric { .. }));
    }
}
