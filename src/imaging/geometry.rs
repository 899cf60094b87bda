//! Lossless geometric transforms: quarter-turn rotations and mirror flips.
//!
//! Each one is a permutation of whole pixels, so it is layout-agnostic and
//! exactly reversible.

use super::buffer::ImageBuffer;
use rayon::prelude::*;

/// Build an output of `out_w × out_h` where output pixel `(x, y)` is copied
/// from the input pixel returned by `source(x, y)`.
fn permute<F>(input: &ImageBuffer, out_w: u32, out_h: u32, source: F) -> ImageBuffer
where
    F: Fn(usize, usize) -> (usize, usize) + Sync,
{
    let c = input.channels();
    let in_w = input.width() as usize;
    let src = input.pixels();
    let stride = out_w as usize * c;
    let mut dst = vec![0u8; stride * out_h as usize];

    dst.par_chunks_mut(stride).enumerate().for_each(|(y, row_out)| {
        for (x, px) in row_out.chunks_exact_mut(c).enumerate() {
            let (sx, sy) = source(x, y);
            let start = (sy * in_w + sx) * c;
            px.copy_from_slice(&src[start..start + c]);
        }
    });

    ImageBuffer::from_parts(out_w, out_h, input.layout(), dst)
}

/// 90° counter-clockwise.
pub(crate) fn rotate_left(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = input.dimensions();
    let last_x = w as usize - 1;
    permute(input, h, w, |x, y| (last_x - y, x))
}

/// 90° clockwise.
pub(crate) fn rotate_right(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = input.dimensions();
    let last_y = h as usize - 1;
    permute(input, h, w, |x, y| (y, last_y - x))
}

pub(crate) fn flip_horizontal(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = input.dimensions();
    let last_x = w as usize - 1;
    permute(input, w, h, |x, y| (last_x - x, y))
}

pub(crate) fn flip_vertical(input: &ImageBuffer) -> ImageBuffer {
    let (w, h) = input.dimensions();
    let last_y = h as usize - 1;
    permute(input, w, h, |x, y| (x, last_y - y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::ChannelLayout;
    use crate::test_helpers::{gradient_rgb, indexed};

    /// 3×2 gray image:
    /// ```text
    /// 1 2 3
    /// 4 5 6
    /// ```
    fn small() -> ImageBuffer {
        ImageBuffer::new(3, 2, ChannelLayout::Gray, vec![1, 2, 3, 4, 5, 6]).unwrap()
    }

    #[test]
    fn rotate_left_layout() {
        let out = rotate_left(&small());
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.pixels(), &[3, 6, 2, 5, 1, 4]);
    }

    #[test]
    fn rotate_right_layout() {
        let out = rotate_right(&small());
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.pixels(), &[4, 1, 5, 2, 6, 3]);
    }

    #[test]
    fn flips() {
        assert_eq!(flip_horizontal(&small()).pixels(), &[3, 2, 1, 6, 5, 4]);
        assert_eq!(flip_vertical(&small()).pixels(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn rotations_are_inverses() {
        let img = gradient_rgb(5, 3);
        assert_eq!(rotate_right(&rotate_left(&img)), img);
        assert_eq!(rotate_left(&rotate_right(&img)), img);
    }

    #[test]
    fn four_quarter_turns_restore() {
        let img = gradient_rgb(4, 7);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate_left(&out);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn flips_are_involutions() {
        let img = indexed(6, 2);
        assert_eq!(flip_horizontal(&flip_horizontal(&img)), img);
        assert_eq!(flip_vertical(&flip_vertical(&img)), img);
    }

    #[test]
    fn single_pixel_survives_everything() {
        let img = ImageBuffer::new(1, 1, ChannelLayout::Rgba, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(rotate_left(&img), img);
        assert_eq!(rotate_right(&img), img);
        assert_eq!(flip_horizontal(&img), img);
    }
}
