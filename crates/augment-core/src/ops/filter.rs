//! Convolution-based operators and the elastic warp.

use image::RgbaImage;
use rand::{Rng, RngCore};

use crate::color::clamp_u8;
use crate::error::OperatorError;
use crate::params::{BlurDirection, BlurParams, EdgeEnhanceParams, ElasticParams, MotionBlurParams};

use super::resample::{box_kernel, convolve_separable, gaussian_kernel, sample_clamped, smooth_field, to_rgba8};
use super::{ensure_finite, invalid, Operator, OperatorId};

/// Kernels wider than twice the long edge add nothing but work.
fn max_kernel_len(image: &RgbaImage) -> usize {
    2 * image.width().max(image.height()) as usize + 1
}

/// Separable Gaussian blur with a per-task odd kernel size.
pub struct Blur {
    params: BlurParams,
}

impl Blur {
    pub fn new(params: BlurParams) -> Self {
        Self { params }
    }

    /// OpenCV's default sigma for a kernel of `len` taps.
    fn sigma_for(len: usize) -> f32 {
        0.3 * ((len as f32 - 1.0) * 0.5 - 1.0) + 0.8
    }
}

impl Operator for Blur {
    fn id(&self) -> OperatorId {
        OperatorId::Blur
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let drawn = ensure_finite(self.id(), "kernel", self.params.kernel_range.sample(rng))?;
        if drawn < 1.0 {
            return Ok(image.clone());
        }

        let mut len = (drawn.round() as usize).min(max_kernel_len(image));
        if len % 2 == 0 {
            len += 1;
        }
        let kernel = gaussian_kernel(Self::sigma_for(len), len / 2);
        Ok(convolve_separable(image, &kernel, &kernel))
    }
}

/// Linear box smear along one axis.
pub struct MotionBlur {
    params: MotionBlurParams,
}

impl MotionBlur {
    pub fn new(params: MotionBlurParams) -> Self {
        Self { params }
    }
}

impl Operator for MotionBlur {
    fn id(&self) -> OperatorId {
        OperatorId::MotionBlur
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let len = (self.params.size as usize).min(max_kernel_len(image));
        if len <= 1 {
            return Ok(image.clone());
        }

        let kernel = box_kernel(len);
        let identity = [1.0];
        Ok(match self.params.direction {
            BlurDirection::Horizontal => convolve_separable(image, &kernel, &identity),
            BlurDirection::Vertical => convolve_separable(image, &identity, &kernel),
        })
    }
}

/// Laplacian sharpening on interior pixels; the one-pixel border is kept.
pub struct EdgeEnhance {
    params: EdgeEnhanceParams,
}

impl EdgeEnhance {
    pub fn new(params: EdgeEnhanceParams) -> Self {
        Self { params }
    }
}

impl Operator for EdgeEnhance {
    fn id(&self) -> OperatorId {
        OperatorId::EdgeEnhance
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let strength = ensure_finite(self.id(), "strength", self.params.strength)?;
        let (w, h) = image.dimensions();
        let mut out = image.clone();
        if w < 3 || h < 3 {
            return Ok(out);
        }

        for y in 1..h - 1 {
            for x in 1..w - 1 {
                let center = image.get_pixel(x, y).0;
                let neighbours = [
                    image.get_pixel(x, y - 1).0,
                    image.get_pixel(x - 1, y).0,
                    image.get_pixel(x + 1, y).0,
                    image.get_pixel(x, y + 1).0,
                ];
                let px = out.get_pixel_mut(x, y);
                for c in 0..3 {
                    let laplacian = 4.0 * center[c] as f32
                        - neighbours.iter().map(|n| n[c] as f32).sum::<f32>();
                    px.0[c] = clamp_u8(center[c] as f32 + strength * laplacian);
                }
            }
        }
        Ok(out)
    }
}

/// Elastic deformation: a smoothed random displacement field scaled by `alpha`.
pub struct Elastic {
    params: ElasticParams,
}

impl Elastic {
    pub fn new(params: ElasticParams) -> Self {
        Self { params }
    }

    fn displacement_field(&self, w: usize, h: usize, rng: &mut dyn RngCore) -> Vec<f32> {
        let mut field: Vec<f32> = (0..w * h).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
        let radius = ((3.0 * self.params.sigma).ceil() as usize).min(w.max(h));
        smooth_field(&mut field, w, h, &gaussian_kernel(self.params.sigma, radius));
        for v in field.iter_mut() {
            *v *= self.params.alpha;
        }
        field
    }
}

impl Operator for Elastic {
    fn id(&self) -> OperatorId {
        OperatorId::Elastic
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        ensure_finite(self.id(), "alpha", self.params.alpha)?;
        let sigma = ensure_finite(self.id(), "sigma", self.params.sigma)?;
        if sigma < 0.0 {
            return Err(invalid(self.id(), "sigma", format!("{sigma} is negative")));
        }

        let (w, h) = image.dimensions();
        let (wu, hu) = (w as usize, h as usize);
        let dx = self.displacement_field(wu, hu, rng);
        let dy = self.displacement_field(wu, hu, rng);

        Ok(RgbaImage::from_fn(w, h, |x, y| {
            let i = y as usize * wu + x as usize;
            to_rgba8(sample_clamped(image, x as f32 + dx[i], y as f32 + dy[i]))
        }))
    }
}
