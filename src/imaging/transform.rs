//! The transform engine: one entry point that applies a mutating
//! [`Operation`] to an [`ImageBuffer`] and returns a new buffer.
//!
//! Every function reachable from [`apply`] is pure. The input buffer is
//! never touched; output is always a freshly allocated buffer with a new
//! version. Kernels run row-parallel on the rayon global pool, and each row
//! is computed independently, so results do not depend on thread count.
//!
//! | Family | Dimensions | Layouts |
//! |---|---|---|
//! | Filters | unchanged | any except indexed |
//! | Adjustments | unchanged | any except indexed |
//! | Rotate | width and height swap | all |
//! | Flip | unchanged | all |

use super::buffer::{ChannelLayout, ImageBuffer};
use super::{adjustments, filters, geometry};
use crate::catalog::{Family, Operation, OperationKind};
use rayon::prelude::*;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformFailure {
    #[error("{operation} does not work on {layout} images")]
    Unsupported {
        operation: OperationKind,
        layout: ChannelLayout,
    },
    #[error("{operation} needs an image with non-zero width and height")]
    EmptyBuffer { operation: OperationKind },
    /// View and control operations never reach the engine.
    #[error("{0} does not change pixels")]
    NotAnImageOperation(OperationKind),
}

impl TransformFailure {
    pub fn kind(&self) -> &'static str {
        match self {
            TransformFailure::Unsupported { .. } => "unsupported",
            TransformFailure::EmptyBuffer { .. } => "empty_buffer",
            TransformFailure::NotAnImageOperation(_) => "not_an_image_operation",
        }
    }
}

/// Apply a mutating operation.
///
/// Fails with [`TransformFailure::EmptyBuffer`] for zero-sized input and with
/// [`TransformFailure::Unsupported`] when the operation cannot interpret the
/// buffer's channel layout. On failure nothing is produced.
pub fn apply(op: &Operation, input: &ImageBuffer) -> Result<ImageBuffer, TransformFailure> {
    let kind = op.kind();
    if !kind.is_mutating() {
        return Err(TransformFailure::NotAnImageOperation(kind));
    }
    if input.is_empty() {
        warn!(operation = %kind, "transform on empty buffer");
        return Err(TransformFailure::EmptyBuffer { operation: kind });
    }
    if input.layout() == ChannelLayout::Indexed && op.family() != Family::Transform {
        warn!(operation = %kind, layout = %input.layout(), "unsupported channel layout");
        return Err(TransformFailure::Unsupported {
            operation: kind,
            layout: input.layout(),
        });
    }

    let output = match *op {
        Operation::Grayscale => filters::grayscale(input),
        Operation::Blur => filters::blur(input),
        Operation::Sharpen => filters::sharpen(input),
        Operation::EdgeDetection => filters::edge_detection(input),
        Operation::Sepia => filters::sepia(input),
        Operation::Invert => filters::invert(input),
        Operation::HistogramEqualization => filters::equalize_histogram(input),
        Operation::AdaptiveThreshold => filters::adaptive_threshold(input),
        Operation::Brightness(p) => adjustments::brightness(input, p),
        Operation::Contrast(p) => adjustments::contrast(input, p),
        Operation::Saturation(p) => adjustments::saturation(input, p),
        Operation::Hue(p) => adjustments::hue(input, p),
        Operation::RotateLeft => geometry::rotate_left(input),
        Operation::RotateRight => geometry::rotate_right(input),
        Operation::FlipHorizontal => geometry::flip_horizontal(input),
        Operation::FlipVertical => geometry::flip_vertical(input),
        Operation::ZoomIn
        | Operation::ZoomOut
        | Operation::ResetZoom
        | Operation::Fit
        | Operation::Undo
        | Operation::Redo
        | Operation::Reset
        | Operation::Help
        | Operation::Exit => return Err(TransformFailure::NotAnImageOperation(kind)),
    };
    Ok(output)
}

/// Map every pixel of `input` into a buffer of `out_layout` with the same
/// dimensions. `f` receives one input pixel and writes one output pixel.
pub(crate) fn map_pixels<F>(input: &ImageBuffer, out_layout: ChannelLayout, f: F) -> ImageBuffer
where
    F: Fn(&[u8], &mut [u8]) + Sync,
{
    let (w, h) = (input.width() as usize, input.height() as usize);
    let in_c = input.channels();
    let out_c = out_layout.channels();
    let src = input.pixels();
    let in_stride = w * in_c;
    let out_stride = w * out_c;
    let mut dst = vec![0u8; out_stride * h];

    dst.par_chunks_mut(out_stride).enumerate().for_each(|(y, row_out)| {
        let row_in = &src[y * in_stride..(y + 1) * in_stride];
        for (px_in, px_out) in row_in.chunks_exact(in_c).zip(row_out.chunks_exact_mut(out_c)) {
            f(px_in, px_out);
        }
    });

    ImageBuffer::from_parts(input.width(), input.height(), out_layout, dst)
}

/// Like [`map_pixels`] but only the color channels pass through `f`;
/// alpha is copied unchanged. `f` maps one channel value.
pub(crate) fn map_color_channels<F>(input: &ImageBuffer, f: F) -> ImageBuffer
where
    F: Fn(u8) -> u8 + Sync,
{
    let color = input.layout().color_channels();
    map_pixels(input, input.layout(), |px_in, px_out| {
        for (i, (&v, o)) in px_in.iter().zip(px_out.iter_mut()).enumerate() {
            *o = if i < color { f(v) } else { v };
        }
    })
}
