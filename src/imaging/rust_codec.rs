//! Pure Rust codec built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (PNG, JPEG, WebP, BMP, TIFF, GIF) | `image::ImageReader` with format sniffing |
//! | Load-time downscale | `DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode JPEG | `image::codecs::jpeg::JpegEncoder` at the requested quality |
//! | Encode everything else | `DynamicImage::write_to` (lossless) |
//!
//! Decoded images keep 8-bit gray, gray+alpha, RGB, and RGBA layouts as-is.
//! Deeper or exotic pixel types are narrowed to 8-bit gray or RGB(A).

use super::buffer::{ChannelLayout, ImageBuffer};
use super::codec::{CodecError, ImageCodec, LoadParams, SaveParams, extension_of, fit_within};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::io::Cursor;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

const FORMAT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("png", ImageFormat::Png),
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("webp", ImageFormat::WebP),
    ("bmp", ImageFormat::Bmp),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    FORMAT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled() && fmt.writing_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Extensions this codec can both read and write.
pub fn supported_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

fn format_for(path: &Path) -> Result<ImageFormat, CodecError> {
    let ext = extension_of(path);
    FORMAT_CANDIDATES
        .iter()
        .find(|(candidate, _)| *candidate == ext)
        .map(|(_, fmt)| *fmt)
        .ok_or_else(|| {
            CodecError::UnsupportedFormat(if ext.is_empty() {
                path.display().to_string()
            } else {
                ext.clone()
            })
        })
}

/// Production codec. Stateless.
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustCodec {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(path: &Path) -> Result<DynamicImage, CodecError> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(|e| CodecError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}

/// Move decoded pixels into an [`ImageBuffer`] without copying when the
/// layout is already 8-bit.
fn into_buffer(img: DynamicImage) -> ImageBuffer {
    let (width, height) = (img.width(), img.height());
    let (layout, pixels) = match img {
        DynamicImage::ImageLuma8(b) => (ChannelLayout::Gray, b.into_raw()),
        DynamicImage::ImageLumaA8(b) => (ChannelLayout::GrayAlpha, b.into_raw()),
        DynamicImage::ImageRgb8(b) => (ChannelLayout::Rgb, b.into_raw()),
        DynamicImage::ImageRgba8(b) => (ChannelLayout::Rgba, b.into_raw()),
        other => {
            let color = other.color();
            match (color.has_color(), color.has_alpha()) {
                (false, false) => (ChannelLayout::Gray, other.to_luma8().into_raw()),
                (false, true) => (ChannelLayout::GrayAlpha, other.to_luma_alpha8().into_raw()),
                (true, false) => (ChannelLayout::Rgb, other.to_rgb8().into_raw()),
                (true, true) => (ChannelLayout::Rgba, other.to_rgba8().into_raw()),
            }
        }
    };
    ImageBuffer::from_parts(width, height, layout, pixels)
}

fn to_dynamic(image: &ImageBuffer, path: &Path) -> Result<DynamicImage, CodecError> {
    let (w, h) = image.dimensions();
    let raw = image.pixels().to_vec();
    let converted = match image.layout() {
        ChannelLayout::Gray => image::GrayImage::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
        ChannelLayout::GrayAlpha => {
            image::GrayAlphaImage::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8)
        }
        ChannelLayout::Rgb => image::RgbImage::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
        ChannelLayout::Rgba => image::RgbaImage::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        ChannelLayout::Indexed => None,
    };
    converted.ok_or_else(|| CodecError::Encode {
        path: path.to_path_buf(),
        message: format!("cannot encode a {} buffer", image.layout()),
    })
}

/// Narrow the pixel type to one the target encoder accepts.
fn prepare_for(format: ImageFormat, img: DynamicImage) -> DynamicImage {
    let color = img.color();
    match format {
        ImageFormat::Jpeg if color.has_alpha() => {
            if color.has_color() {
                DynamicImage::ImageRgb8(img.to_rgb8())
            } else {
                DynamicImage::ImageLuma8(img.to_luma8())
            }
        }
        ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        ImageFormat::WebP if color.has_alpha() => DynamicImage::ImageRgba8(img.to_rgba8()),
        ImageFormat::WebP => DynamicImage::ImageRgb8(img.to_rgb8()),
        ImageFormat::Tiff if color.has_alpha() && !color.has_color() => {
            DynamicImage::ImageRgba8(img.to_rgba8())
        }
        _ => img,
    }
}

impl ImageCodec for RustCodec {
    fn load(&self, params: &LoadParams) -> Result<ImageBuffer, CodecError> {
        let img = decode(&params.source)?;
        let original = (img.width(), img.height());
        let img = match params.max_dimension {
            Some(max) => {
                let target = fit_within(original, max);
                if target != original {
                    info!(
                        path = %params.source.display(),
                        from = ?original,
                        to = ?target,
                        "downscaling large image"
                    );
                    img.resize_exact(target.0, target.1, FilterType::Lanczos3)
                } else {
                    img
                }
            }
            None => img,
        };
        let buffer = into_buffer(img);
        debug!(
            path = %params.source.display(),
            layout = %buffer.layout(),
            width = buffer.width(),
            height = buffer.height(),
            "decoded image"
        );
        Ok(buffer)
    }

    fn save(&self, image: &ImageBuffer, params: &SaveParams) -> Result<(), CodecError> {
        let format = format_for(&params.output)?;
        let img = prepare_for(format, to_dynamic(image, &params.output)?);
        // Encode fully before touching the destination so a failed encode
        // never leaves a truncated file behind.
        let mut encoded = Cursor::new(Vec::new());
        let result = if format == ImageFormat::Jpeg {
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut encoded,
                params.quality.value(),
            );
            img.write_with_encoder(encoder)
        } else {
            img.write_to(&mut encoded, format)
        };
        result.map_err(|e| CodecError::Encode {
            path: params.output.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&params.output, encoded.into_inner())?;
        info!(path = %params.output.display(), ?format, "saved image");
        Ok(())
    }
}
