//! Parameterized color adjustments.
//!
//! Each mapping is monotonic in its parameter and saturates at the channel
//! bounds. Hue is the exception: it rotates around the color wheel and wraps.
//! Alpha is never touched.

use super::buffer::ImageBuffer;
use super::color::{hsv_to_rgb, rgb_to_hsv, saturate_u8};
use super::transform::{map_color_channels, map_pixels};
use crate::catalog::{Brightness, Contrast, Hue, Saturation};

/// Adds the offset to every color channel.
pub(crate) fn brightness(input: &ImageBuffer, param: Brightness) -> ImageBuffer {
    let offset = param.value();
    map_color_channels(input, move |v| saturate_u8(v as f32 + offset))
}

/// Scales every color channel by `percent / 100`.
pub(crate) fn contrast(input: &ImageBuffer, param: Contrast) -> ImageBuffer {
    let gain = param.value() / 100.0;
    map_color_channels(input, move |v| saturate_u8(v as f32 * gain))
}

/// Runs `f` over (h, s, v) of each RGB pixel. Gray buffers have no hue or
/// saturation to change and are copied through.
fn map_hsv<F>(input: &ImageBuffer, f: F) -> ImageBuffer
where
    F: Fn(f32, f32, f32) -> (f32, f32, f32) + Sync,
{
    if !input.layout().is_color() {
        return ImageBuffer::from_parts(
            input.width(),
            input.height(),
            input.layout(),
            input.pixels().to_vec(),
        );
    }
    map_pixels(input, input.layout(), |p, o| {
        o.copy_from_slice(p);
        let (h, s, v) = rgb_to_hsv(p[0] as f32 / 255.0, p[1] as f32 / 255.0, p[2] as f32 / 255.0);
        let (h, s, v) = f(h, s, v);
        let (r, g, b) = hsv_to_rgb(h, s, v);
        o[0] = saturate_u8(r * 255.0);
        o[1] = saturate_u8(g * 255.0);
        o[2] = saturate_u8(b * 255.0);
    })
}

/// Multiplies HSV saturation by `percent / 100`, capped at full saturation.
pub(crate) fn saturation(input: &ImageBuffer, param: Saturation) -> ImageBuffer {
    let gain = param.value() / 100.0;
    map_hsv(input, move |h, s, v| (h, (s * gain).min(1.0), v))
}

/// Rotates hue by the given degrees, wrapping modulo 360.
pub(crate) fn hue(input: &ImageBuffer, param: Hue) -> ImageBuffer {
    let degrees = param.value();
    map_hsv(input, move |h, s, v| ((h + degrees).rem_euclid(360.0), s, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ChannelLayout;
    use crate::test_helpers::{gradient_rgb, solid_gray, solid_rgb, solid_rgba};

    #[test]
    fn brightness_adds_and_saturates() {
        let img = solid_rgb(1, 1, [10, 200, 250]);
        assert_eq!(brightness(&img, Brightness::new(50.0)).pixels(), &[60, 250, 255]);
        assert_eq!(brightness(&img, Brightness::new(-50.0)).pixels(), &[0, 150, 200]);
    }

    #[test]
    fn brightness_skips_alpha() {
        let out = brightness(&solid_rgba(1, 1, [0, 0, 0, 100]), Brightness::new(100.0));
        assert_eq!(out.pixels(), &[100, 100, 100, 100]);
    }

    #[test]
    fn brightness_works_on_gray() {
        let out = brightness(&solid_gray(2, 2, 10), Brightness::new(-30.0));
        assert!(out.pixels().iter().all(|&v| v == 0));
    }

    #[test]
    fn contrast_scales_and_saturates() {
        let img = solid_rgb(1, 1, [100, 200, 0]);
        assert_eq!(contrast(&img, Contrast::new(200.0)).pixels(), &[200, 255, 0]);
        assert_eq!(contrast(&img, Contrast::new(50.0)).pixels(), &[50, 100, 0]);
        assert_eq!(contrast(&img, Contrast::new(0.0)).pixels(), &[0, 0, 0]);
    }

    #[test]
    fn brightness_is_monotonic_in_parameter() {
        let img = gradient_rgb(6, 6);
        let lo = brightness(&img, Brightness::new(-20.0));
        let hi = brightness(&img, Brightness::new(20.0));
        assert!(lo.pixels().iter().zip(hi.pixels()).all(|(a, b)| a <= b));
    }

    #[test]
    fn zero_saturation_makes_gray() {
        let out = saturation(&solid_rgb(1, 1, [200, 50, 50]), Saturation::new(0.0));
        let p = out.pixels();
        assert_eq!(p[0], p[1]);
        assert_eq!(p[1], p[2]);
    }

    #[test]
    fn saturation_boost_caps_at_full() {
        let out = saturation(&solid_rgb(1, 1, [255, 0, 0]), Saturation::new(200.0));
        assert_eq!(out.pixels(), &[255, 0, 0]);
    }

    #[test]
    fn saturation_leaves_gray_layouts_alone() {
        let img = solid_gray(2, 2, 90);
        assert_eq!(saturation(&img, Saturation::new(200.0)), img);
    }

    #[test]
    fn hue_rotates_primaries() {
        let out = hue(&solid_rgb(1, 1, [255, 0, 0]), Hue::new(120.0));
        assert_eq!(out.pixels(), &[0, 255, 0]);
        let out = hue(&solid_rgb(1, 1, [255, 0, 0]), Hue::new(-120.0));
        assert_eq!(out.pixels(), &[0, 0, 255]);
    }

    #[test]
    fn hue_wraps_at_half_turn() {
        let plus = hue(&solid_rgb(1, 1, [255, 0, 0]), Hue::new(180.0));
        let minus = hue(&solid_rgb(1, 1, [255, 0, 0]), Hue::new(-180.0));
        assert_eq!(plus, minus);
        assert_eq!(plus.pixels(), &[0, 255, 255]);
    }

    #[test]
    fn hue_keeps_alpha_and_layout() {
        let out = hue(&solid_rgba(1, 1, [255, 0, 0, 12]), Hue::new(120.0));
        assert_eq!(out.layout(), ChannelLayout::Rgba);
        assert_eq!(out.pixels(), &[0, 255, 0, 12]);
    }
}
