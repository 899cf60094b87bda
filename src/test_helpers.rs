//! Shared test utilities: small synthetic buffers.
//!
//! Every helper builds its buffer from a closed-form pattern, so a test can
//! recompute any expected pixel without reading the buffer back.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_helpers::*;
//!
//! let img = gradient_rgb(4, 3);
//! let out = apply(&Operation::Invert, &img).unwrap();
//! assert_eq!(out.pixel(0, 0), Some(&[255, 255, 127][..]));
//! ```

use crate::imaging::{ChannelLayout, ImageBuffer};

// =========================================================================
// Buffer builders
// =========================================================================

fn build(width: u32, height: u32, layout: ChannelLayout, pixel: impl Fn(u32, u32) -> Vec<u8>) -> ImageBuffer {
    let mut pixels = Vec::with_capacity(width as usize * height as usize * layout.channels());
    for y in 0..height {
        for x in 0..width {
            pixels.extend(pixel(x, y));
        }
    }
    ImageBuffer::new(width, height, layout, pixels).unwrap()
}

/// RGB gradient: red grows left to right, green top to bottom, blue fixed
/// at 128. Every pixel in a buffer up to 256 wide and tall is distinct.
pub fn gradient_rgb(width: u32, height: u32) -> ImageBuffer {
    let step = |i: u32, n: u32| {
        if n <= 1 {
            0
        } else {
            (i * 255 / (n - 1)) as u8
        }
    };
    build(width, height, ChannelLayout::Rgb, |x, y| {
        vec![step(x, width), step(y, height), 128]
    })
}

pub fn solid_rgb(width: u32, height: u32, rgb: [u8; 3]) -> ImageBuffer {
    build(width, height, ChannelLayout::Rgb, |_, _| rgb.to_vec())
}

pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> ImageBuffer {
    build(width, height, ChannelLayout::Rgba, |_, _| rgba.to_vec())
}

pub fn solid_gray(width: u32, height: u32, value: u8) -> ImageBuffer {
    build(width, height, ChannelLayout::Gray, |_, _| vec![value])
}

/// Palette-index buffer. Indices cycle through 0..4.
pub fn indexed(width: u32, height: u32) -> ImageBuffer {
    build(width, height, ChannelLayout::Indexed, |x, y| {
        vec![((x + y) % 4) as u8]
    })
}

/// Gray buffer, black on the left half and white on the right.
pub fn vertical_edge(width: u32, height: u32) -> ImageBuffer {
    build(width, height, ChannelLayout::Gray, |x, _| {
        vec![if x < width / 2 { 0 } else { 255 }]
    })
}
