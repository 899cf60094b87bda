//! The codec boundary: turning files into [`ImageBuffer`]s and back.
//!
//! The editing core never reads or writes image files itself. It talks to an
//! [`ImageCodec`], which the session receives from the caller. The production
//! implementation is [`RustCodec`](super::rust_codec::RustCodec), built on
//! the `image` crate. Tests use the recording `MockCodec` below.

use super::buffer::ImageBuffer;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },
    #[error("failed to encode {path}: {message}")]
    Encode { path: PathBuf, message: String },
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),
}

impl CodecError {
    pub fn kind(&self) -> &'static str {
        match self {
            CodecError::Io(_) => "io",
            CodecError::Decode { .. } => "decode",
            CodecError::Encode { .. } => "encode",
            CodecError::UnsupportedFormat(_) => "unsupported_format",
        }
    }
}

/// Lossy encoding quality (1-100, default 90). Clamped on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// What to load and how large it may be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadParams {
    pub source: PathBuf,
    /// Longest allowed edge in pixels. Larger images are downscaled with
    /// their aspect ratio kept; `None` loads at full size.
    pub max_dimension: Option<u32>,
}

/// Where to write and at what quality. The format follows the extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveParams {
    pub output: PathBuf,
    pub quality: Quality,
}

/// Trait for codec collaborators.
pub trait ImageCodec: Send + Sync {
    fn load(&self, params: &LoadParams) -> Result<ImageBuffer, CodecError>;

    fn save(&self, image: &ImageBuffer, params: &SaveParams) -> Result<(), CodecError>;
}

/// Dimensions that fit `(width, height)` inside a `max × max` box, keeping
/// the aspect ratio. Never upscales and never returns a zero edge.
///
/// ```
/// # use voxedit::imaging::fit_within;
/// assert_eq!(fit_within((4000, 3000), 2048), (2048, 1536));
/// assert_eq!(fit_within((800, 600), 2048), (800, 600));
/// ```
pub fn fit_within(dimensions: (u32, u32), max: u32) -> (u32, u32) {
    let (w, h) = dimensions;
    let longest = w.max(h);
    if max == 0 || longest <= max {
        return (w, h);
    }
    let scale = max as f64 / longest as f64;
    let scaled = |edge: u32| ((edge as f64 * scale).round() as u32).max(1);
    if w >= h { (max, scaled(h)) } else { (scaled(w), max) }
}

/// Lower-cased extension of `path`, or an empty string.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Codec that hands out queued buffers and records every call.
    /// Uses Mutex (not RefCell) so it is Sync like the real codec.
    #[derive(Default)]
    pub struct MockCodec {
        pub images: Mutex<Vec<ImageBuffer>>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Load {
            source: String,
            max_dimension: Option<u32>,
        },
        Save {
            output: String,
            width: u32,
            height: u32,
            version: u64,
        },
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self::default()
        }

        /// Queue images; loads pop from the back.
        pub fn with_images(images: Vec<ImageBuffer>) -> Self {
            Self {
                images: Mutex::new(images),
                operations: Mutex::new(Vec::new()),
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl ImageCodec for MockCodec {
        fn load(&self, params: &LoadParams) -> Result<ImageBuffer, CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::Load {
                source: params.source.to_string_lossy().to_string(),
                max_dimension: params.max_dimension,
            });
            self.images
                .lock()
                .unwrap()
                .pop()
                .ok_or_else(|| CodecError::Decode {
                    path: params.source.clone(),
                    message: "no mock image queued".to_string(),
                })
        }

        fn save(&self, image: &ImageBuffer, params: &SaveParams) -> Result<(), CodecError> {
            self.operations.lock().unwrap().push(RecordedOp::Save {
                output: params.output.to_string_lossy().to_string(),
                width: image.width(),
                height: image.height(),
                version: image.version(),
            });
            Ok(())
        }
    }

    #[test]
    fn mock_records_load() {
        let img = crate::test_helpers::gradient_rgb(3, 2);
        let codec = MockCodec::with_images(vec![img.clone()]);

        let loaded = codec
            .load(&LoadParams {
                source: "/photos/cat.png".into(),
                max_dimension: Some(2048),
            })
            .unwrap();
        assert_eq!(loaded, img);

        let ops = codec.get_operations();
        assert_eq!(ops.len(), 1);
        assert!(matches!(
            &ops[0],
            RecordedOp::Load { source, max_dimension: Some(2048) } if source == "/photos/cat.png"
        ));
    }

    #[test]
    fn mock_load_without_queued_image_errors() {
        let codec = MockCodec::new();
        let err = codec
            .load(&LoadParams {
                source: "/missing.png".into(),
                max_dimension: None,
            })
            .unwrap_err();
        assert_eq!(err.kind(), "decode");
    }

    #[test]
    fn mock_records_save() {
        let codec = MockCodec::new();
        let img = crate::test_helpers::solid_gray(4, 5, 0);
        codec
            .save(
                &img,
                &SaveParams {
                    output: "/out.jpg".into(),
                    quality: Quality::default(),
                },
            )
            .unwrap();
        assert!(matches!(
            &codec.get_operations()[0],
            RecordedOp::Save { width: 4, height: 5, .. }
        ));
    }

    #[test]
    fn quality_clamps() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(500).value(), 100);
        assert_eq!(Quality::default().value(), 90);
    }

    #[test]
    fn fit_within_keeps_aspect() {
        assert_eq!(fit_within((3000, 4000), 2048), (1536, 2048));
        assert_eq!(fit_within((5000, 10), 100), (100, 1));
        assert_eq!(fit_within((2048, 2048), 2048), (2048, 2048));
    }

    #[test]
    fn fit_within_zero_disables() {
        assert_eq!(fit_within((9000, 9000), 0), (9000, 9000));
    }

    #[test]
    fn extension_is_lowercased() {
        assert_eq!(extension_of(Path::new("a/B.PNG")), "png");
        assert_eq!(extension_of(Path::new("noext")), "");
    }
}
