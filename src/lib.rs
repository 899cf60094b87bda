//! # voxedit
//!
//! Voice-driven raster image editing. Short spoken commands ("blur",
//! "brightness by 50", "rotate left", "undo") come in as text; reversible
//! edits to a single in-memory image come out.
//!
//! Speech capture, transcription, and rendering are collaborators outside
//! this crate. What lives here is the part that has to be right: turning
//! noisy text into a closed set of typed operations, and applying those
//! operations with a linear, memory-bounded undo history.
//!
//! # Architecture
//!
//! ```text
//! text ─► parser ─► Operation ─► pipeline ─► ImageBuffer
//!           │                       │
//!        catalog             history · view · imaging::transform
//! ```
//!
//! The [`session::SessionController`] drives this flow one utterance at a
//! time. [`dispatch`] hands utterances to it through a single-slot queue and
//! publishes each new buffer for readers.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | The closed set of operations, their phrases and synonyms, clamped parameters |
//! | [`parser`] | Text → [`catalog::Operation`] with exact, tolerant, and token matching |
//! | [`imaging`] | Immutable image buffers, the transform engine, the codec boundary |
//! | [`history`] | Cursor-based linear undo/redo with a capacity bound |
//! | [`view`] | Zoom state, kept apart from history |
//! | [`pipeline`] | Routes each operation to transform, history, or zoom; atomic apply |
//! | [`session`] | One open image plus the controller in front of it |
//! | [`dispatch`] | Single-slot utterance queue and buffer publication |
//! | [`config`] | `voxedit.toml` loading, validation, and merging |
//! | [`output`] | Feedback lines, help text, failure and history rendering |
//!
//! # Design Decisions
//!
//! ## Clamp, Don't Reject
//!
//! "brightness by 999" applies full brightness instead of failing. Spoken
//! numbers are imprecise and a rejected command costs the user another
//! utterance; the clamped result is almost always what was meant.
//!
//! ## One Sequence and a Cursor
//!
//! Undo and redo move a cursor over one ordered sequence. A new edit cuts
//! the sequence at the cursor and appends, so there is never a branching
//! tree to reason about.
//!
//! ## Immutable Buffers
//!
//! Every operation produces a new [`imaging::ImageBuffer`]. Pixel bytes sit
//! behind an `Arc`, so history entries and published snapshots share storage
//! and readers never need a lock on the pixels themselves.
//!
//! ## Pure-Rust Imaging
//!
//! Filters and adjustments are implemented directly over byte rows and run
//! in parallel with rayon. Decoding and encoding go through the `image`
//! crate. There are no system libraries to install.

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod history;
pub mod imaging;
pub mod output;
pub mod parser;
pub mod pipeline;
pub mod session;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
