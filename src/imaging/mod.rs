//! Image buffers, the transform engine, and the codec boundary.
//!
//! | Operation | Where |
//! |---|---|
//! | **Buffer** | [`ImageBuffer`]: immutable, `Arc`-shared pixels, versioned |
//! | **Filters** | `filters`: grayscale, blur, sharpen, Canny edges, sepia, invert, equalize, adaptive threshold |
//! | **Adjustments** | `adjustments`: brightness, contrast (per channel); saturation, hue (HSV) |
//! | **Geometry** | `geometry`: quarter-turn rotations, flips |
//! | **Decode / encode** | [`ImageCodec`] trait + [`RustCodec`] (`image` crate) |
//!
//! The module is split into:
//! - **Buffer**: the value type every other part passes around
//! - **Kernels**: pure pixel functions, reached only through [`transform::apply`]
//! - **Codec**: [`ImageCodec`] trait, so sessions can run against a mock in tests

pub mod adjustments;
pub mod buffer;
pub mod codec;
pub mod color;
pub mod filters;
pub mod geometry;
pub mod rust_codec;
pub mod transform;

pub use buffer::{BufferError, ChannelLayout, ImageBuffer};
pub use codec::{CodecError, ImageCodec, LoadParams, Quality, SaveParams, fit_within};
pub use rust_codec::{RustCodec, supported_extensions};
pub use transform::{TransformFailure, apply};
