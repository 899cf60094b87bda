//! The boundary between the editor core and its producers and readers.
//!
//! Two concerns live here:
//!
//! - **Utterance hand-off.** Transcription runs on its own thread and produces
//!   one finished utterance at a time. [`utterance_channel`] gives it a
//!   single-slot queue into the core. [`UtteranceSender::offer`] never blocks:
//!   if an utterance is already waiting, the new one is dropped and the caller
//!   gets [`DispatchError::Busy`]. Commands spoken while the editor is busy are
//!   stale by the time it catches up, so they are not queued. Typed or
//!   scripted input is different: every line is meant to run, so
//!   [`UtteranceSender::send`] waits for the slot instead.
//! - **Publication.** [`PublishedImage`] holds the buffer on display. The
//!   controller swaps a new buffer in after every successful edit; readers
//!   take a snapshot, which is a cheap handle clone since pixel bytes are
//!   shared.

use crate::imaging::ImageBuffer;
use crate::session::{CommandOutcome, SessionController, SessionError};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchError {
    /// A command is already waiting. The utterance was dropped.
    #[error("busy, command dropped")]
    Busy,
    /// The receiving side is gone.
    #[error("editor is not accepting commands")]
    Closed,
}

impl DispatchError {
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::Busy => "busy",
            DispatchError::Closed => "closed",
        }
    }
}

/// Producer side. Clone it to hand to more than one producer.
#[derive(Debug, Clone)]
pub struct UtteranceSender {
    tx: SyncSender<String>,
}

#[derive(Debug)]
pub struct UtteranceReceiver {
    rx: Receiver<String>,
}

/// Create a single-slot utterance queue.
pub fn utterance_channel() -> (UtteranceSender, UtteranceReceiver) {
    let (tx, rx) = mpsc::sync_channel(1);
    (UtteranceSender { tx }, UtteranceReceiver { rx })
}

impl UtteranceSender {
    /// Hand one utterance to the core without waiting.
    pub fn offer(&self, text: impl Into<String>) -> Result<(), DispatchError> {
        match self.tx.try_send(text.into()) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(dropped)) => {
                warn!(utterance = %dropped, "editor busy, utterance dropped");
                Err(DispatchError::Busy)
            }
            Err(TrySendError::Disconnected(_)) => Err(DispatchError::Closed),
        }
    }

    /// Hand one utterance to the core, waiting for the slot to free up.
    /// Never drops; fails only once the receiver is gone.
    pub fn send(&self, text: impl Into<String>) -> Result<(), DispatchError> {
        self.tx.send(text.into()).map_err(|_| DispatchError::Closed)
    }
}

impl UtteranceReceiver {
    /// Block until the next utterance. `None` once every sender is dropped.
    pub fn next(&self) -> Option<String> {
        self.rx.recv().ok()
    }
}

/// Run commands until `Exit` is handled or every sender is dropped.
///
/// `on_result` sees each utterance with its outcome, in order. Returns the
/// number of utterances handled.
pub fn run_loop<F>(
    controller: &mut SessionController,
    receiver: &UtteranceReceiver,
    mut on_result: F,
) -> usize
where
    F: FnMut(&str, &Result<CommandOutcome, SessionError>),
{
    let mut handled = 0;
    while let Some(text) = receiver.next() {
        let result = controller.handle_text(&text);
        handled += 1;
        on_result(&text, &result);
        if matches!(&result, Ok(outcome) if outcome.exit) {
            debug!(handled, "exit requested");
            break;
        }
    }
    handled
}

/// The buffer currently on display, shared between the controller and any
/// number of readers.
#[derive(Debug, Clone, Default)]
pub struct PublishedImage {
    slot: Arc<RwLock<Option<ImageBuffer>>>,
}

impl PublishedImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the displayed buffer. Readers see either the old buffer or the
    /// new one, never a mix.
    pub fn publish(&self, image: Option<ImageBuffer>) {
        let mut slot = self.slot.write().unwrap_or_else(PoisonError::into_inner);
        *slot = image;
    }

    pub fn snapshot(&self) -> Option<ImageBuffer> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
