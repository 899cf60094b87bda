//! Session and session controller.
//!
//! A [`Session`] exists while an image is open. It owns the [`EditPipeline`]
//! (original image, history, zoom), the path the image came from, and whether
//! the displayed buffer differs from what was last saved.
//!
//! The [`SessionController`] sits in front of it. It takes raw utterances,
//! runs them through the [`CommandParser`], applies them, and publishes the
//! resulting buffer. It outlives sessions: loading a new image replaces the
//! session but keeps the recent command and file lists.
//!
//! ```text
//! text ─► CommandParser ─► Operation ─► EditPipeline ─► ImageBuffer
//!                                             │
//!                                    PublishedImage (swap)
//! ```

use crate::catalog::{Family, Operation};
use crate::config::EditorConfig;
use crate::dispatch::PublishedImage;
use crate::imaging::{CodecError, ImageBuffer, ImageCodec, LoadParams, Quality, SaveParams};
use crate::output;
use crate::parser::{CommandParser, ParseFailure};
use crate::pipeline::{EditPipeline, PipelineFailure};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Parse(#[from] ParseFailure),
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
    /// Raised before any edit, view, or history command when no image is open.
    #[error("no image loaded")]
    NoImageLoaded,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl SessionError {
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::Parse(failure) => failure.kind(),
            SessionError::Pipeline(failure) => failure.kind(),
            SessionError::NoImageLoaded => "no_image_loaded",
            SessionError::Codec(err) => err.kind(),
        }
    }
}

/// One open image and everything tied to its lifetime.
#[derive(Debug, Clone)]
pub struct Session {
    source: Option<PathBuf>,
    pipeline: EditPipeline,
    unsaved: bool,
}

impl Session {
    pub fn new(original: ImageBuffer, source: Option<PathBuf>, config: &EditorConfig) -> Self {
        Self {
            source,
            pipeline: EditPipeline::new(original, config.history.capacity, config.zoom),
            unsaved: false,
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn pipeline(&self) -> &EditPipeline {
        &self.pipeline
    }

    pub fn current(&self) -> &ImageBuffer {
        self.pipeline.current()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.unsaved
    }
}

/// Result of one handled command.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutcome {
    pub operation: Operation,
    /// The buffer on display after the command, if an image is open.
    pub image: Option<ImageBuffer>,
    /// Short confirmation line, e.g. `"Rotated left"`.
    pub feedback: String,
    /// Set when the command asked the session to end.
    pub exit: bool,
}

pub struct SessionController {
    config: EditorConfig,
    parser: CommandParser,
    session: Option<Session>,
    published: PublishedImage,
    viewport: Option<(u32, u32)>,
    recent_commands: VecDeque<String>,
    recent_files: VecDeque<PathBuf>,
}

impl SessionController {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            parser: CommandParser::new(config.parser.policy()),
            config,
            session: None,
            published: PublishedImage::new(),
            viewport: None,
            recent_commands: VecDeque::new(),
            recent_files: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// A reader handle onto the displayed buffer. Clones share one slot.
    pub fn published(&self) -> PublishedImage {
        self.published.clone()
    }

    /// Most recent first.
    pub fn recent_commands(&self) -> impl Iterator<Item = &str> {
        self.recent_commands.iter().map(String::as_str)
    }

    /// Most recent first.
    pub fn recent_files(&self) -> impl Iterator<Item = &Path> {
        self.recent_files.iter().map(PathBuf::as_path)
    }

    pub fn clear_recent_files(&mut self) {
        self.recent_files.clear();
    }

    /// Record the drawing area size so `fit` has something to fit into.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Some((width, height));
        if let Some(session) = self.session.as_mut() {
            session.pipeline.set_viewport(width, height);
        }
    }

    /// Decode `path` through `codec` and start a new session on it.
    pub fn load(&mut self, codec: &dyn ImageCodec, path: &Path) -> Result<&ImageBuffer, SessionError> {
        let params = LoadParams {
            source: path.to_path_buf(),
            max_dimension: self.config.load.limit(),
        };
        let image = codec.load(&params)?;
        self.remember_file(path);
        Ok(self.open(image, Some(path.to_path_buf())))
    }

    /// Start a new session on an already decoded buffer. Any previous session,
    /// its history included, is dropped.
    pub fn open(&mut self, image: ImageBuffer, source: Option<PathBuf>) -> &ImageBuffer {
        info!(
            source = ?source.as_deref(),
            width = image.width(),
            height = image.height(),
            layout = %image.layout(),
            "image loaded"
        );
        let mut session = Session::new(image, source, &self.config);
        if let Some((w, h)) = self.viewport {
            session.pipeline.set_viewport(w, h);
        }
        self.published.publish(Some(session.current().clone()));
        self.session.insert(session).current()
    }

    /// End the session. Returns whether there was one.
    pub fn close(&mut self) -> bool {
        let closed = self.session.take().is_some();
        if closed {
            info!("image closed");
            self.published.publish(None);
        }
        closed
    }

    /// Encode the displayed buffer to `path`. Clears the unsaved flag.
    pub fn save(&mut self, codec: &dyn ImageCodec, path: &Path) -> Result<(), SessionError> {
        let session = self.session.as_mut().ok_or(SessionError::NoImageLoaded)?;
        let params = SaveParams {
            output: path.to_path_buf(),
            quality: Quality::default(),
        };
        codec.save(session.current(), &params)?;
        session.unsaved = false;
        Ok(())
    }

    /// Parse and apply one utterance.
    pub fn handle_text(&mut self, text: &str) -> Result<CommandOutcome, SessionError> {
        self.remember_command(text);
        let op = self.parser.parse(text)?;
        self.handle_operation(&op)
    }

    /// Apply an already parsed operation.
    ///
    /// `Help` and `Exit` work without an image; everything else needs one.
    pub fn handle_operation(&mut self, op: &Operation) -> Result<CommandOutcome, SessionError> {
        match op {
            Operation::Help | Operation::Exit => {
                return Ok(CommandOutcome {
                    operation: *op,
                    image: self.session.as_ref().map(|s| s.current().clone()),
                    feedback: output::feedback(op, None),
                    exit: *op == Operation::Exit,
                });
            }
            _ => {}
        }

        let session = self.session.as_mut().ok_or(SessionError::NoImageLoaded)?;
        let image = session.pipeline.apply_operation(op)?;
        if op.family() != Family::View {
            session.unsaved = true;
            self.published.publish(Some(image.clone()));
        }
        Ok(CommandOutcome {
            operation: *op,
            feedback: output::feedback(op, Some(session.pipeline.zoom())),
            image: Some(image),
            exit: false,
        })
    }

    fn remember_command(&mut self, text: &str) {
        let text = text.trim();
        if text.is_empty() || self.config.session.recent_commands == 0 {
            return;
        }
        self.recent_commands.push_front(text.to_string());
        self.recent_commands
            .truncate(self.config.session.recent_commands);
    }

    fn remember_file(&mut self, path: &Path) {
        if self.config.session.recent_files == 0 {
            return;
        }
        self.recent_files.retain(|p| p != path);
        self.recent_files.push_front(path.to_path_buf());
        self.recent_files.truncate(self.config.session.recent_files);
        debug!(count = self.recent_files.len(), "recent files updated");
    }
}
