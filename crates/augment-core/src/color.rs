//! RGB <-> HSV conversion on normalized channels.
//!
//! Inputs are expected in `[0, 1]` (callers clamp). Hue is in degrees,
//! `[0, 360)`, and is defined as 0 for achromatic colors.

/// A color in hue/saturation/value form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`
    pub h: f32,
    /// Saturation, `[0, 1]`
    pub s: f32,
    /// Value, `[0, 1]`
    pub v: f32,
}

/// Convert normalized RGB to HSV.
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> Hsv {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let s = if max == 0.0 { 0.0 } else { delta / max };

    let sector = if max == min {
        0.0
    } else if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    Hsv {
        h: sector * 60.0,
        s,
        v: max,
    }
}

/// Convert HSV back to normalized RGB.
///
/// Hue outside `[0, 360)` wraps.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - f * s);
    let t = v * (1.0 - (1.0 - f) * s);

    match sector as u32 % 6 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Convert an 8-bit RGB triple to HSV.
pub fn rgb8_to_hsv(rgb: [u8; 3]) -> Hsv {
    rgb_to_hsv(
        rgb[0] as f32 / 255.0,
        rgb[1] as f32 / 255.0,
        rgb[2] as f32 / 255.0,
    )
}

/// Convert HSV to an 8-bit RGB triple, clamping each channel.
pub fn hsv_to_rgb8(hsv: Hsv) -> [u8; 3] {
    let (r, g, b) = hsv_to_rgb(hsv.h, hsv.s, hsv.v);
    [unit_to_u8(r), unit_to_u8(g), unit_to_u8(b)]
}

/// Clamp a channel value to `[0, 255]` and round to the nearest integer.
pub fn clamp_u8(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 255.0) as u8
}

fn unit_to_u8(value: f32) -> u8 {
    clamp_u8(value * 255.0)
}
