//! Color-space helpers shared by the filters and adjustments.
//!
//! All conversions work on 8-bit channel values or on `f32` in `0.0..=1.0`;
//! hue is in degrees.

/// Integer BT.601 luma, `(77 r + 150 g + 29 b + 128) >> 8`.
///
/// Exact at the extremes: white stays 255, black stays 0.
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((77 * r as u32 + 150 * g as u32 + 29 * b as u32 + 128) >> 8) as u8
}

/// Round and saturate a float into the 8-bit channel range.
pub fn saturate_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

/// RGB (0..1) → HSV (H: 0..360 degrees, S: 0..1, V: 0..1).
pub fn rgb_to_hsv(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;
    let v = max;
    if max <= 0.0 || d < 1e-6 {
        return (0.0, 0.0, v);
    }
    let s = d / max;
    let h = if (max - r).abs() < 1e-6 {
        let h = (g - b) / d;
        if h < 0.0 { h + 6.0 } else { h }
    } else if (max - g).abs() < 1e-6 {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    (h * 60.0, s, v)
}

/// HSV (H: degrees, any value; S, V: 0..1) → RGB (0..1).
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (f32, f32, f32) {
    if s <= 0.0 {
        return (v, v, v);
    }
    let h = h.rem_euclid(360.0) / 60.0;
    let sector = h.floor();
    let f = h - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match sector as u32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    }
}

/// Full-range BT.601 RGB → (Y, Cb, Cr), chroma centered on 128.
pub fn rgb_to_ycbcr(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = (b - y) * 0.564 + 128.0;
    let cr = (r - y) * 0.713 + 128.0;
    (y, cb, cr)
}

pub fn ycbcr_to_rgb(y: f32, cb: f32, cr: f32) -> (f32, f32, f32) {
    let cb = cb - 128.0;
    let cr = cr - 128.0;
    (
        y + 1.403 * cr,
        y - 0.714 * cr - 0.344 * cb,
        y + 1.773 * cb,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn luma_extremes_are_exact() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(128, 128, 128), 128);
    }

    #[test]
    fn luma_weights_green_most() {
        assert!(luma(0, 255, 0) > luma(255, 0, 0));
        assert!(luma(255, 0, 0) > luma(0, 0, 255));
    }

    #[test]
    fn hsv_primary_hues() {
        assert_eq!(rgb_to_hsv(1.0, 0.0, 0.0), (0.0, 1.0, 1.0));
        let (h, _, _) = rgb_to_hsv(0.0, 1.0, 0.0);
        assert!((h - 120.0).abs() < 1e-3);
        let (h, _, _) = rgb_to_hsv(0.0, 0.0, 1.0);
        assert!((h - 240.0).abs() < 1e-3);
    }

    #[test]
    fn hsv_round_trip() {
        for &(r, g, b) in &[(0.2, 0.4, 0.6), (0.9, 0.1, 0.3), (0.5, 0.5, 0.5), (1.0, 1.0, 0.0)] {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert!((r - r2).abs() < 1e-4, "{r} vs {r2}");
            assert!((g - g2).abs() < 1e-4, "{g} vs {g2}");
            assert!((b - b2).abs() < 1e-4, "{b} vs {b2}");
        }
    }

    #[test]
    fn hsv_to_rgb_wraps_hue() {
        let a = hsv_to_rgb(30.0, 1.0, 1.0);
        let b = hsv_to_rgb(390.0, 1.0, 1.0);
        let c = hsv_to_rgb(-330.0, 1.0, 1.0);
        assert!((a.1 - b.1).abs() < 1e-5);
        assert!((a.1 - c.1).abs() < 1e-5);
    }

    #[test]
    fn ycbcr_round_trip_is_close() {
        let (y, cb, cr) = rgb_to_ycbcr(200.0, 100.0, 50.0);
        let (r, g, b) = ycbcr_to_rgb(y, cb, cr);
        assert!((r - 200.0).abs() < 1.0);
        assert!((g - 100.0).abs() < 1.0);
        assert!((b - 50.0).abs() < 1.0);
    }

    #[test]
    fn saturate_clamps() {
        assert_eq!(saturate_u8(300.0), 255);
        assert_eq!(saturate_u8(-4.0), 0);
        assert_eq!(saturate_u8(12.5), 13);
    }
}
