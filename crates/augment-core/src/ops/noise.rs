//! Noise-style operators: additive/impulse noise, sinusoidal warp, random erasing.

use image::{Rgba, RgbaImage};
use rand::{Rng, RngCore};

use crate::color::clamp_u8;
use crate::error::OperatorError;
use crate::params::{EraseParams, NoiseMode, NoiseParams, Range, WaveNoiseParams};

use super::{ensure_finite, invalid, Operator, OperatorId};

/// Half-width of the additive noise draw, in 8-bit levels.
const GAUSSIAN_SPREAD: f32 = 25.0;

/// Additive or impulse noise.
pub struct Noise {
    params: NoiseParams,
}

impl Noise {
    pub fn new(params: NoiseParams) -> Self {
        Self { params }
    }
}

impl Operator for Noise {
    fn id(&self) -> OperatorId {
        OperatorId::Noise
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let amount = ensure_finite(self.id(), "amount", self.params.amount)?;
        let mut out = image.clone();

        for px in out.pixels_mut() {
            let [r, g, b, a] = px.0;
            let rgb = match self.params.mode {
                NoiseMode::Gaussian => {
                    let n = (rng.gen::<f32>() - 0.5) * 2.0 * GAUSSIAN_SPREAD;
                    [r, g, b].map(|c| clamp_u8(c as f32 + n))
                }
                NoiseMode::Salt => {
                    if rng.gen::<f32>() < amount {
                        [255; 3]
                    } else {
                        [r, g, b]
                    }
                }
                NoiseMode::Pepper => {
                    if rng.gen::<f32>() < amount {
                        [0; 3]
                    } else {
                        [r, g, b]
                    }
                }
                NoiseMode::SaltAndPepper => {
                    let salt = rng.gen::<f32>() < amount;
                    let pepper = rng.gen::<f32>() < amount;
                    if salt {
                        [255; 3]
                    } else if pepper {
                        [0; 3]
                    } else {
                        [r, g, b]
                    }
                }
            };
            *px = Rgba([rgb[0], rgb[1], rgb[2], a]);
        }
        Ok(out)
    }
}

/// Per-pixel sinusoidal displacement: rows sway horizontally, columns vertically.
pub struct WaveNoise {
    params: WaveNoiseParams,
}

impl WaveNoise {
    pub fn new(params: WaveNoiseParams) -> Self {
        Self { params }
    }

    /// Displacement for row or column `coord`, limited to `±limit` pixels.
    fn offset(&self, coord: u32, limit: u32) -> i64 {
        let phase = 2.0 * std::f32::consts::PI * self.params.frequency * coord as f32;
        let limit = limit as f32;
        (self.params.amplitude * phase.sin()).floor().clamp(-limit, limit) as i64
    }
}

impl Operator for WaveNoise {
    fn id(&self) -> OperatorId {
        OperatorId::WaveNoise
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        ensure_finite(self.id(), "amplitude", self.params.amplitude)?;
        ensure_finite(self.id(), "frequency", self.params.frequency)?;

        let (w, h) = image.dimensions();
        let limit = w.max(h);
        let mut out = image.clone();
        for y in 0..h {
            let dx = self.offset(y, limit);
            for x in 0..w {
                let dy = self.offset(x, limit);
                let sx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                let sy = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                let [r, g, b, _] = image.get_pixel(sx, sy).0;
                let a = image.get_pixel(x, y).0[3];
                out.put_pixel(x, y, Rgba([r, g, b, a]));
            }
        }
        Ok(out)
    }
}

/// Random erasing: with probability `p`, black out one rectangle.
pub struct Erase {
    params: EraseParams,
}

impl Erase {
    pub fn new(params: EraseParams) -> Self {
        Self { params }
    }
}

impl Operator for Erase {
    fn id(&self) -> OperatorId {
        OperatorId::Erase
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let EraseParams { p, sl, sh, r1 } = self.params;
        let mut out = image.clone();
        if rng.gen::<f32>() >= p {
            return Ok(out);
        }
        if !(r1.is_finite() && r1 > 0.0) {
            return Err(invalid(self.id(), "r1", format!("{r1} is not positive")));
        }

        let (w, h) = image.dimensions();
        let (wf, hf) = (w as f32, h as f32);
        let area = wf * hf * Range::new(sl, sh).sample(rng);
        let aspect = Range::new(r1, 1.0 / r1).sample(rng);
        let area = ensure_finite(self.id(), "area", area)?;

        let erase_h = (area * aspect).sqrt();
        let erase_w = area / erase_h;
        if !(erase_h < hf && erase_w < wf) {
            return Ok(out);
        }

        let left = rng.gen::<f32>() * (wf - erase_w);
        let top = rng.gen::<f32>() * (hf - erase_h);
        let x0 = left.round() as u32;
        let y0 = top.round() as u32;
        let x1 = ((left + erase_w).round() as u32).min(w);
        let y1 = ((top + erase_h).round() as u32).min(h);

        for y in y0..y1 {
            for x in x0..x1 {
                out.put_pixel(x, y, Rgba([0, 0, 0, 255]));
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{gradient, solid};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(99)
    }

    fn noise(mode: NoiseMode, amount: f32) -> Noise {
        Noise::new(NoiseParams { mode, amount })
    }

    #[test]
    fn test_gaussian_noise_is_bounded() {
        let img = solid(16, 16, [128, 128, 128, 255]);
        let out = noise(NoiseMode::Gaussian, 0.05)
            .apply(&img, &mut rng())
            .unwrap();
        for px in out.pixels() {
            let [r, g, b, a] = px.0;
            assert!((103..=153).contains(&r));
            // Same offset for every channel of a pixel
            assert_eq!(r, g);
            assert_eq!(g, b);
            assert_eq!(a, 255);
        }
        assert_ne!(out, img);
    }

    #[test]
    fn test_salt_only_whitens() {
        let img = solid(32, 32, [50, 60, 70, 255]);
        let out = noise(NoiseMode::Salt, 0.5).apply(&img, &mut rng()).unwrap();
        let mut salted = 0;
        for px in out.pixels() {
            match px.0 {
                [255, 255, 255, 255] => salted += 1,
                [50, 60, 70, 255] => {}
                other => panic!("unexpected pixel {other:?}"),
            }
        }
        assert!(salted > 0);
    }

    #[test]
    fn test_pepper_only_blackens() {
        let img = solid(32, 32, [50, 60, 70, 255]);
        let out = noise(NoiseMode::Pepper, 0.5).apply(&img, &mut rng()).unwrap();
        assert!(out.pixels().any(|p| p.0 == [0, 0, 0, 255]));
        assert!(out
            .pixels()
            .all(|p| p.0 == [0, 0, 0, 255] || p.0 == [50, 60, 70, 255]));
    }

    #[test]
    fn test_salt_and_pepper_produces_both() {
        let img = solid(32, 32, [50, 60, 70, 255]);
        let out = noise(NoiseMode::SaltAndPepper, 0.3)
            .apply(&img, &mut rng())
            .unwrap();
        assert!(out.pixels().any(|p| p.0 == [0, 0, 0, 255]));
        assert!(out.pixels().any(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_zero_amount_impulse_is_identity() {
        let img = gradient(8, 8);
        for mode in [NoiseMode::Salt, NoiseMode::Pepper, NoiseMode::SaltAndPepper] {
            assert_eq!(noise(mode, 0.0).apply(&img, &mut rng()).unwrap(), img);
        }
    }

    #[test]
    fn test_wave_zero_amplitude_is_identity() {
        let img = gradient(11, 9);
        let op = WaveNoise::new(WaveNoiseParams {
            amplitude: 0.0,
            frequency: 0.1,
        });
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_wave_displaces_rows() {
        let img = gradient(20, 20);
        let op = WaveNoise::new(WaveNoiseParams {
            amplitude: 3.0,
            frequency: 0.25,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        // Row 1: sin(pi/2) = 1 -> shift x by 3; column 0: sin(0) = 0 -> no y shift
        assert_eq!(out.get_pixel(0, 1).0, img.get_pixel(3, 1).0);
        assert_ne!(out, img);
    }

    #[test]
    fn test_wave_huge_amplitude_clamps_to_edges() {
        let img = gradient(4, 4);
        let op = WaveNoise::new(WaveNoiseParams {
            amplitude: 1e30,
            frequency: 0.1,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.dimensions(), (4, 4));
        // Row 0 and column 0 have zero phase, so pixel (0, 0) stays put
        assert_eq!(out.get_pixel(0, 0), img.get_pixel(0, 0));
        // Row 1 and column 1 both have sin > 0: the offsets clamp to the far corner
        assert_eq!(out.get_pixel(1, 1), img.get_pixel(3, 3));
        for px in out.pixels() {
            assert_eq!(px.0[3], 255);
        }
    }

    #[test]
    fn test_erase_with_zero_probability_is_identity() {
        let img = gradient(10, 10);
        let op = Erase::new(EraseParams {
            p: 0.0,
            ..EraseParams::default()
        });
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_erase_blacks_out_a_rectangle() {
        let img = solid(50, 50, [200, 200, 200, 128]);
        let op = Erase::new(EraseParams {
            p: 1.0,
            sl: 0.1,
            sh: 0.1,
            r1: 1.0,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        let erased = out.pixels().filter(|p| p.0 == [0, 0, 0, 255]).count();
        // ~10% of 2500 pixels, allowing for edge rounding
        assert!((200..=300).contains(&erased), "erased {erased}");
    }

    #[test]
    fn test_erase_rejects_non_positive_aspect() {
        let op = Erase::new(EraseParams {
            p: 1.0,
            r1: 0.0,
            ..EraseParams::default()
        });
        assert!(op.apply(&gradient(10, 10), &mut rng()).is_err());
    }
}
