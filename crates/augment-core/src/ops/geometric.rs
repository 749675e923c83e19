//! Geometric operators: mirror, rotate, crop, shift, zoom, block shuffle.
//!
//! All of them resample back onto the source canvas so width and height never
//! change. Areas with no source coverage come out transparent.

use image::{imageops, RgbaImage};
use rand::seq::SliceRandom;
use rand::RngCore;

use crate::error::OperatorError;
use crate::params::{CropParams, PatchShuffleParams, RotateParams, ScaleParams, TranslateParams};

use super::resample::warp;
use super::{ensure_finite, invalid, Operator, OperatorId};

/// Mirror left-right.
pub struct HFlip;

impl Operator for HFlip {
    fn id(&self) -> OperatorId {
        OperatorId::HFlip
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        Ok(imageops::flip_horizontal(image))
    }
}

/// Mirror top-bottom.
pub struct VFlip;

impl Operator for VFlip {
    fn id(&self) -> OperatorId {
        OperatorId::VFlip
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        Ok(imageops::flip_vertical(image))
    }
}

/// Rotate about the canvas center; positive angles turn clockwise.
pub struct Rotate {
    params: RotateParams,
}

impl Rotate {
    pub fn new(params: RotateParams) -> Self {
        Self { params }
    }
}

impl Operator for Rotate {
    fn id(&self) -> OperatorId {
        OperatorId::Rotate
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let degrees = self.params.angle_range.draw(self.params.sampling, rng);
        let degrees = ensure_finite(self.id(), "angle", degrees)?;
        let (sin, cos) = degrees.to_radians().sin_cos();

        let (w, h) = image.dimensions();
        let cx = w as f32 / 2.0;
        let cy = h as f32 / 2.0;

        Ok(warp(image, |x, y| {
            let dx = x + 0.5 - cx;
            let dy = y + 0.5 - cy;
            (
                dx * cos + dy * sin + cx - 0.5,
                -dx * sin + dy * cos + cy - 0.5,
            )
        }))
    }
}

/// Centered square crop of `min(w, h) * ratio`, stretched back to the canvas.
pub struct Crop {
    params: CropParams,
}

impl Crop {
    pub fn new(params: CropParams) -> Self {
        Self { params }
    }
}

impl Operator for Crop {
    fn id(&self) -> OperatorId {
        OperatorId::Crop
    }

    fn apply(&self, image: &RgbaImage, _rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let ratio = self.params.ratio;
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(invalid(self.id(), "ratio", format!("{ratio} is not positive")));
        }

        let (w, h) = image.dimensions();
        let size = w.min(h) as f32 * ratio;
        let left = (w as f32 - size) / 2.0;
        let top = (h as f32 - size) / 2.0;
        let sx_step = size / w as f32;
        let sy_step = size / h as f32;

        Ok(warp(image, |x, y| {
            (
                left + (x + 0.5) * sx_step - 0.5,
                top + (y + 0.5) * sy_step - 0.5,
            )
        }))
    }
}

/// Shift content by an independent per-axis draw; uncovered areas are blank.
pub struct Translate {
    params: TranslateParams,
}

impl Translate {
    pub fn new(params: TranslateParams) -> Self {
        Self { params }
    }
}

impl Operator for Translate {
    fn id(&self) -> OperatorId {
        OperatorId::Translate
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let dx = ensure_finite(self.id(), "dx", self.params.range.sample(rng))?;
        let dy = ensure_finite(self.id(), "dy", self.params.range.sample(rng))?;
        Ok(warp(image, |x, y| (x - dx, y - dy)))
    }
}

/// Zoom about the center by a drawn factor (> 1 zooms in).
pub struct Scale {
    params: ScaleParams,
}

impl Scale {
    pub fn new(params: ScaleParams) -> Self {
        Self { params }
    }
}

impl Operator for Scale {
    fn id(&self) -> OperatorId {
        OperatorId::Scale
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let factor = ensure_finite(self.id(), "factor", self.params.range.sample(rng))?;
        if factor <= 0.0 {
            return Err(invalid(self.id(), "range", format!("factor {factor} is not positive")));
        }

        let (w, h) = image.dimensions();
        let cx = w as f32 / 2.0;
        let cy = h as f32 / 2.0;

        Ok(warp(image, |x, y| {
            (
                (x + 0.5 - cx) / factor + cx - 0.5,
                (y + 0.5 - cy) / factor + cy - 0.5,
            )
        }))
    }
}

/// Cut the canvas into `gridSize`-pixel square blocks and permute them.
///
/// Trailing partial rows and columns stay where they are.
pub struct PatchShuffle {
    params: PatchShuffleParams,
}

impl PatchShuffle {
    pub fn new(params: PatchShuffleParams) -> Self {
        Self { params }
    }
}

impl Operator for PatchShuffle {
    fn id(&self) -> OperatorId {
        OperatorId::PatchShuffle
    }

    fn apply(&self, image: &RgbaImage, rng: &mut dyn RngCore) -> Result<RgbaImage, OperatorError> {
        let size = self.params.grid_size;
        if size == 0 {
            return Err(invalid(self.id(), "gridSize", "must be > 0"));
        }

        let (w, h) = image.dimensions();
        let cols = w / size;
        let rows = h / size;
        let mut out = image.clone();
        if cols == 0 || rows == 0 {
            return Ok(out);
        }

        let mut order: Vec<u32> = (0..rows * cols).collect();
        order.shuffle(rng);

        for (target, source) in order.into_iter().enumerate() {
            let target = target as u32;
            let (dst_x, dst_y) = ((target % cols) * size, (target / cols) * size);
            let (src_x, src_y) = ((source % cols) * size, (source / cols) * size);
            for y in 0..size {
                for x in 0..size {
                    let px = *image.get_pixel(src_x + x, src_y + y);
                    out.put_pixel(dst_x + x, dst_y + y, px);
                }
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::test_support::{gradient, solid};
    use crate::params::{Range, Sampling};
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_hflip_twice_is_identity() {
        let img = gradient(7, 4);
        let once = HFlip.apply(&img, &mut rng()).unwrap();
        assert_ne!(once, img);
        let twice = HFlip.apply(&once, &mut rng()).unwrap();
        assert_eq!(twice.as_raw(), img.as_raw());
    }

    #[test]
    fn test_hflip_mirrors_columns() {
        let img = gradient(5, 2);
        let out = HFlip.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 1), img.get_pixel(4, 1));
    }

    #[test]
    fn test_vflip_solid_red_is_unchanged() {
        let img = solid(4, 4, [255, 0, 0, 255]);
        let out = VFlip.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.as_raw(), img.as_raw());
    }

    #[test]
    fn test_rotate_zero_is_identity() {
        let img = gradient(12, 7);
        let op = Rotate::new(RotateParams {
            angle_range: Range::fixed(0.0),
            sampling: Sampling::Uniform,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out, img);
    }

    #[test]
    fn test_rotate_midpoint_of_symmetric_range_is_identity() {
        let img = gradient(10, 10);
        let op = Rotate::new(RotateParams::default());
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_rotate_quarter_turn_moves_corners() {
        let mut img = solid(4, 4, [0, 0, 0, 255]);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let op = Rotate::new(RotateParams {
            angle_range: Range::fixed(90.0),
            sampling: Sampling::Midpoint,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        // Clockwise: top-left lands top-right
        assert_eq!(out.get_pixel(3, 0).0[0], 255);
        assert_eq!(out.get_pixel(0, 0).0[0], 0);
    }

    #[test]
    fn test_rotate_leaves_corners_transparent() {
        let img = solid(20, 20, [50, 60, 70, 255]);
        let op = Rotate::new(RotateParams {
            angle_range: Range::fixed(45.0),
            sampling: Sampling::Midpoint,
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(10, 10).0, [50, 60, 70, 255]);
    }

    #[test]
    fn test_crop_full_ratio_on_square_is_identity() {
        let img = gradient(8, 8);
        let op = Crop::new(CropParams { ratio: 1.0 });
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_crop_zooms_into_center() {
        // Dark border, bright 4x4 center
        let mut img = solid(8, 8, [0, 0, 0, 255]);
        for y in 2..6 {
            for x in 2..6 {
                img.put_pixel(x, y, Rgba([200, 200, 200, 255]));
            }
        }
        let op = Crop::new(CropParams { ratio: 0.5 });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.dimensions(), (8, 8));
        // Outermost ring blends with the dark border; everything inside is center
        for y in 1..7 {
            for x in 1..7 {
                assert_eq!(out.get_pixel(x, y).0[0], 200, "({x}, {y})");
            }
        }
        assert!(out.get_pixel(0, 0).0[0] < 200);
    }

    #[test]
    fn test_crop_rejects_non_positive_ratio() {
        let op = Crop::new(CropParams { ratio: 0.0 });
        assert!(op.apply(&gradient(4, 4), &mut rng()).is_err());
    }

    #[test]
    fn test_translate_shifts_and_blanks() {
        let img = solid(6, 6, [9, 9, 9, 255]);
        let op = Translate::new(TranslateParams {
            range: Range::fixed(2.0),
        });
        let out = op.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(1, 5).0, [0, 0, 0, 0]);
        assert_eq!(out.get_pixel(2, 2).0, [9, 9, 9, 255]);
        assert_eq!(out.get_pixel(5, 5).0, [9, 9, 9, 255]);
    }

    #[test]
    fn test_scale_one_is_identity_and_shrink_leaves_border() {
        let img = gradient(9, 9);
        let identity = Scale::new(ScaleParams {
            range: Range::fixed(1.0),
        });
        assert_eq!(identity.apply(&img, &mut rng()).unwrap(), img);

        let shrink = Scale::new(ScaleParams {
            range: Range::fixed(0.5),
        });
        let out = shrink.apply(&img, &mut rng()).unwrap();
        assert_eq!(out.get_pixel(0, 0).0[3], 0);
        assert_eq!(out.get_pixel(4, 4).0[3], 255);
    }

    #[test]
    fn test_scale_rejects_zero_factor() {
        let op = Scale::new(ScaleParams {
            range: Range::fixed(0.0),
        });
        assert!(op.apply(&gradient(4, 4), &mut rng()).is_err());
    }

    fn blocks(img: &RgbaImage, size: u32) -> HashMap<Vec<u8>, usize> {
        let mut counts = HashMap::new();
        for by in 0..img.height() / size {
            for bx in 0..img.width() / size {
                let block = imageops::crop_imm(img, bx * size, by * size, size, size).to_image();
                *counts.entry(block.into_raw()).or_insert(0) += 1;
            }
        }
        counts
    }

    #[test]
    fn test_patch_shuffle_preserves_block_multiset() {
        // Every 4x4 block gets a distinct color
        let img = RgbaImage::from_fn(16, 12, |x, y| {
            Rgba([(x / 4) as u8 * 60, (y / 4) as u8 * 80, 7, 255])
        });
        let op = PatchShuffle::new(PatchShuffleParams { grid_size: 4 });
        let out = op.apply(&img, &mut rng()).unwrap();

        assert_eq!(blocks(&out, 4), blocks(&img, 4));
        assert_ne!(out, img, "seeded shuffle of 12 blocks should move something");
    }

    #[test]
    fn test_patch_shuffle_keeps_partial_edges() {
        let img = gradient(10, 10);
        let op = PatchShuffle::new(PatchShuffleParams { grid_size: 4 });
        let out = op.apply(&img, &mut rng()).unwrap();
        for i in 0..10 {
            for edge in 8..10 {
                assert_eq!(out.get_pixel(edge, i), img.get_pixel(edge, i));
                assert_eq!(out.get_pixel(i, edge), img.get_pixel(i, edge));
            }
        }
    }

    #[test]
    fn test_patch_shuffle_larger_than_image_is_passthrough() {
        let img = gradient(5, 5);
        let op = PatchShuffle::new(PatchShuffleParams { grid_size: 16 });
        assert_eq!(op.apply(&img, &mut rng()).unwrap(), img);
    }

    #[test]
    fn test_patch_shuffle_rejects_zero_grid() {
        let op = PatchShuffle::new(PatchShuffleParams { grid_size: 0 });
        assert!(op.apply(&gradient(5, 5), &mut rng()).is_err());
    }
}
