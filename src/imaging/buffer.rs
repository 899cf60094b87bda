//! Immutable pixel buffers.
//!
//! An [`ImageBuffer`] is a value: dimensions, a [`ChannelLayout`], and the
//! pixel bytes, plus a version number stamped at construction. Pixel bytes
//! sit behind an `Arc`, so cloning a buffer (into history, or out to a
//! renderer) never copies pixels, and nothing can change them after the fact.
//!
//! Equality compares layout, dimensions, and pixels. The version is identity
//! for caches and logs, not content, so two buffers built from the same bytes
//! are equal even though their versions differ.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

static NEXT_VERSION: AtomicU64 = AtomicU64::new(1);

fn next_version() -> u64 {
    NEXT_VERSION.fetch_add(1, Ordering::Relaxed)
}

/// How the bytes of one pixel are laid out. All channels are 8-bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Gray,
    GrayAlpha,
    Rgb,
    Rgba,
    /// Palette indices. Only geometric operations make sense on these.
    Indexed,
}

impl ChannelLayout {
    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Gray | ChannelLayout::Indexed => 1,
            ChannelLayout::GrayAlpha => 2,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }

    pub fn has_alpha(self) -> bool {
        matches!(self, ChannelLayout::GrayAlpha | ChannelLayout::Rgba)
    }

    pub fn is_color(self) -> bool {
        matches!(self, ChannelLayout::Rgb | ChannelLayout::Rgba)
    }

    pub fn is_gray(self) -> bool {
        matches!(self, ChannelLayout::Gray | ChannelLayout::GrayAlpha)
    }

    /// Number of leading channels that carry color or luminance (alpha excluded).
    pub fn color_channels(self) -> usize {
        match self {
            ChannelLayout::Gray | ChannelLayout::GrayAlpha | ChannelLayout::Indexed => 1,
            ChannelLayout::Rgb | ChannelLayout::Rgba => 3,
        }
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChannelLayout::Gray => "gray",
            ChannelLayout::GrayAlpha => "gray+alpha",
            ChannelLayout::Rgb => "rgb",
            ChannelLayout::Rgba => "rgba",
            ChannelLayout::Indexed => "indexed",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("pixel data is {actual} bytes, expected {expected} for {width}x{height} {layout}")]
    LengthMismatch {
        width: u32,
        height: u32,
        layout: ChannelLayout,
        expected: usize,
        actual: usize,
    },
}

/// An immutable image snapshot.
#[derive(Clone)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    layout: ChannelLayout,
    pixels: Arc<[u8]>,
    version: u64,
}

impl ImageBuffer {
    /// Build a buffer, checking that `pixels` holds exactly
    /// `width * height * channels` bytes. Zero-sized buffers are allowed;
    /// transforms reject them.
    pub fn new(
        width: u32,
        height: u32,
        layout: ChannelLayout,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Result<Self, BufferError> {
        let pixels = pixels.into();
        let expected = width as usize * height as usize * layout.channels();
        if pixels.len() != expected {
            return Err(BufferError::LengthMismatch {
                width,
                height,
                layout,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
            version: next_version(),
        })
    }

    /// Constructor for transform output whose length is correct by construction.
    pub(crate) fn from_parts(width: u32, height: u32, layout: ChannelLayout, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * layout.channels()
        );
        Self {
            width,
            height,
            layout,
            pixels: pixels.into(),
            version: next_version(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub fn channels(&self) -> usize {
        self.layout.channels()
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Bytes per row.
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels();
        let start = (y as usize * self.width as usize + x as usize) * c;
        Some(&self.pixels[start..start + c])
    }

    /// Whether both buffers share the same pixel allocation.
    pub fn shares_pixels_with(&self, other: &ImageBuffer) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }
}

impl PartialEq for ImageBuffer {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.layout == other.layout
            && (Arc::ptr_eq(&self.pixels, &other.pixels) || self.pixels == other.pixels)
    }
}

impl Eq for ImageBuffer {}

impl fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("layout", &self.layout)
            .field("version", &self.version)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_length() {
        let err = ImageBuffer::new(2, 2, ChannelLayout::Rgb, vec![0u8; 11]).unwrap_err();
        assert_eq!(
            err,
            BufferError::LengthMismatch {
                width: 2,
                height: 2,
                layout: ChannelLayout::Rgb,
                expected: 12,
                actual: 11,
            }
        );
    }

    #[test]
    fn zero_sized_buffer_is_constructible() {
        let buf = ImageBuffer::new(0, 5, ChannelLayout::Gray, Vec::new()).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn versions_increase() {
        let a = ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![7]).unwrap();
        let b = ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![7]).unwrap();
        assert!(b.version() > a.version());
    }

    #[test]
    fn equality_ignores_version() {
        let a = ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![7]).unwrap();
        let b = ImageBuffer::new(1, 1, ChannelLayout::Gray, vec![7]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn equality_checks_dimensions_and_layout() {
        let wide = ImageBuffer::new(2, 1, ChannelLayout::Gray, vec![1, 2]).unwrap();
        let tall = ImageBuffer::new(1, 2, ChannelLayout::Gray, vec![1, 2]).unwrap();
        let alpha = ImageBuffer::new(1, 1, ChannelLayout::GrayAlpha, vec![1, 2]).unwrap();
        assert_ne!(wide, tall);
        assert_ne!(wide, alpha);
    }

    #[test]
    fn clone_shares_pixels() {
        let a = ImageBuffer::new(2, 1, ChannelLayout::Gray, vec![1, 2]).unwrap();
        let b = a.clone();
        assert!(a.shares_pixels_with(&b));
        assert_eq!(a.version(), b.version());
    }

    #[test]
    fn pixel_lookup() {
        let buf = ImageBuffer::new(2, 2, ChannelLayout::Rgb, (0u8..12).collect::<Vec<_>>()).unwrap();
        assert_eq!(buf.pixel(1, 1), Some(&[9u8, 10, 11][..]));
        assert_eq!(buf.pixel(2, 0), None);
        assert_eq!(buf.stride(), 6);
    }
}
