//! Sampling and convolution helpers shared by the geometric and filter operators.
//!
//! Coordinates are pixel indices: `(x, y)` addresses the pixel whose center
//! sits at `(x + 0.5, y + 0.5)` in continuous canvas space.

use image::{Rgba, RgbaImage};

use crate::color::clamp_u8;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Bilinear sample with clamped neighbours, returning `None` when the sample
/// point falls outside the source canvas.
pub(crate) fn sample_bounded(image: &RgbaImage, sx: f32, sy: f32) -> Option<[f32; 4]> {
    let (w, h) = image.dimensions();
    let cx = sx + 0.5;
    let cy = sy + 0.5;
    if !(cx >= 0.0 && cx < w as f32 && cy >= 0.0 && cy < h as f32) {
        return None;
    }
    Some(sample_clamped(image, sx, sy))
}

/// Bilinear sample with coordinates clamped to the canvas edge.
pub(crate) fn sample_clamped(image: &RgbaImage, sx: f32, sy: f32) -> [f32; 4] {
    let (w, h) = image.dimensions();
    let max_x = (w - 1) as f32;
    let max_y = (h - 1) as f32;
    let sx = if sx.is_nan() { 0.0 } else { sx.clamp(0.0, max_x) };
    let sy = if sy.is_nan() { 0.0 } else { sy.clamp(0.0, max_y) };

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(w - 1);
    let y1 = (y0 + 1).min(h - 1);
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] as f32 * (1.0 - fx) + p10[c] as f32 * fx;
        let bottom = p01[c] as f32 * (1.0 - fx) + p11[c] as f32 * fx;
        out[c] = top * (1.0 - fy) + bottom * fy;
    }
    out
}

/// Build an output image by inverse mapping every destination pixel into the
/// source. Destinations that map outside the source are left transparent.
pub(crate) fn warp<F>(image: &RgbaImage, map: F) -> RgbaImage
where
    F: Fn(f32, f32) -> (f32, f32),
{
    let (w, h) = image.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let (sx, sy) = map(x as f32, y as f32);
        match sample_bounded(image, sx, sy) {
            Some(px) => to_rgba8(px),
            None => TRANSPARENT,
        }
    })
}

pub(crate) fn to_rgba8(px: [f32; 4]) -> Rgba<u8> {
    Rgba([
        clamp_u8(px[0]),
        clamp_u8(px[1]),
        clamp_u8(px[2]),
        clamp_u8(px[3]),
    ])
}

/// Normalized 1-D Gaussian kernel of length `2 * radius + 1`.
pub(crate) fn gaussian_kernel(sigma: f32, radius: usize) -> Vec<f32> {
    if sigma <= 0.0 || radius == 0 {
        return vec![1.0];
    }
    let two_sigma_sq = 2.0 * sigma * sigma;
    let mut kernel: Vec<f32> = (0..=2 * radius)
        .map(|i| {
            let d = i as f32 - radius as f32;
            (-d * d / two_sigma_sq).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for k in kernel.iter_mut() {
        *k /= sum;
    }
    kernel
}

/// Normalized box kernel of `len` taps.
pub(crate) fn box_kernel(len: usize) -> Vec<f32> {
    let len = len.max(1);
    vec![1.0 / len as f32; len]
}

/// Convolve the RGB channels with a horizontal then a vertical kernel.
///
/// Kernels are centered (odd lengths center exactly; even lengths lean left).
/// Edges replicate the border pixel. Alpha is copied unchanged.
pub(crate) fn convolve_separable(
    image: &RgbaImage,
    horizontal: &[f32],
    vertical: &[f32],
) -> RgbaImage {
    let (w, h) = image.dimensions();
    let (w, h) = (w as usize, h as usize);
    let src = image.as_raw();

    let mut pass = vec![0.0f32; w * h * 3];
    let half = (horizontal.len() / 2) as isize;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in horizontal.iter().enumerate() {
                let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                let i = (y * w + sx) * 4;
                for c in 0..3 {
                    acc[c] += src[i + c] as f32 * weight;
                }
            }
            pass[(y * w + x) * 3..(y * w + x) * 3 + 3].copy_from_slice(&acc);
        }
    }

    let mut out = image.clone();
    let dst: &mut [u8] = &mut out;
    let half = (vertical.len() / 2) as isize;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 3];
            for (k, weight) in vertical.iter().enumerate() {
                let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                let i = (sy * w + x) * 3;
                for c in 0..3 {
                    acc[c] += pass[i + c] * weight;
                }
            }
            let o = (y * w + x) * 4;
            for c in 0..3 {
                dst[o + c] = clamp_u8(acc[c]);
            }
        }
    }
    out
}

/// Smooth a scalar field in place with a separable kernel, replicating edges.
pub(crate) fn smooth_field(field: &mut [f32], w: usize, h: usize, kernel: &[f32]) {
    if kernel.len() <= 1 {
        return;
    }
    let half = (kernel.len() / 2) as isize;
    let mut tmp = vec![0.0f32; field.len()];

    for y in 0..h {
        for x in 0..w {
            tmp[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sx = (x as isize + k as isize - half).clamp(0, w as isize - 1) as usize;
                    field[y * w + sx] * weight
                })
                .sum();
        }
    }
    for y in 0..h {
        for x in 0..w {
            field[y * w + x] = kernel
                .iter()
                .enumerate()
                .map(|(k, weight)| {
                    let sy = (y as isize + k as isize - half).clamp(0, h as isize - 1) as usize;
                    tmp[sy * w + x] * weight
                })
                .sum();
        }
    }
}
