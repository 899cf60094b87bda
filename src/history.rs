//! Linear undo/redo history.
//!
//! History is one ordered sequence of [`HistoryEntry`] values plus a cursor.
//! Position 0 is the original image, which lives outside the sequence and is
//! never evicted; position `i > 0` is `entries[i - 1]`. Undo and redo only
//! move the cursor. A new edit truncates everything after the cursor (the
//! redo tail) and appends, so the history never branches.
//!
//! Capacity bounds memory: once more than `capacity` entries exist, the
//! oldest are evicted silently. The original is never evicted, so undoing
//! past the oldest surviving entry lands on it; the evicted intermediate
//! states are simply gone.

use crate::catalog::Operation;
use crate::imaging::ImageBuffer;
use std::collections::VecDeque;
use tracing::debug;

/// One applied edit and the image it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub operation: Operation,
    pub image: ImageBuffer,
}

#[derive(Debug, Clone)]
pub struct History {
    original: ImageBuffer,
    entries: VecDeque<HistoryEntry>,
    cursor: usize,
    capacity: usize,
    evicted: usize,
}

impl History {
    /// Start a history at `original`. A capacity of 0 is treated as 1.
    pub fn new(original: ImageBuffer, capacity: usize) -> Self {
        Self {
            original,
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
            evicted: 0,
        }
    }

    pub fn original(&self) -> &ImageBuffer {
        &self.original
    }

    /// The buffer at the cursor, which is the one on display.
    pub fn current(&self) -> &ImageBuffer {
        match self.cursor {
            0 => &self.original,
            i => &self.entries[i - 1].image,
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of retained entries, not counting the original.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries dropped by the capacity bound since the last reset.
    pub fn evicted(&self) -> usize {
        self.evicted
    }

    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// How many undo steps are available from here.
    pub fn undo_depth(&self) -> usize {
        self.cursor
    }

    pub fn redo_depth(&self) -> usize {
        self.entries.len() - self.cursor
    }

    pub fn can_undo(&self) -> bool {
        self.undo_depth() > 0
    }

    pub fn can_redo(&self) -> bool {
        self.redo_depth() > 0
    }

    /// Record a new edit. Drops the redo tail, appends, and evicts from the
    /// front past capacity. Returns how many entries were evicted.
    pub fn push(&mut self, operation: Operation, image: ImageBuffer) -> usize {
        let discarded = self.entries.len() - self.cursor;
        self.entries.truncate(self.cursor);
        self.entries.push_back(HistoryEntry { operation, image });

        let mut evicted = 0;
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            evicted += 1;
        }
        self.evicted += evicted;
        self.cursor = self.entries.len();

        debug!(
            %operation,
            cursor = self.cursor,
            discarded_redo = discarded,
            evicted,
            capacity = self.capacity,
            "history push"
        );
        evicted
    }

    /// Step back one entry. `None` when already at the oldest reachable state.
    pub fn undo(&mut self) -> Option<&ImageBuffer> {
        if !self.can_undo() {
            debug!(cursor = self.cursor, "nothing to undo");
            return None;
        }
        self.cursor -= 1;
        debug!(cursor = self.cursor, "history undo");
        Some(self.current())
    }

    /// Step forward one entry. `None` when already at the newest.
    pub fn redo(&mut self) -> Option<&ImageBuffer> {
        if !self.can_redo() {
            debug!(cursor = self.cursor, "nothing to redo");
            return None;
        }
        self.cursor += 1;
        debug!(cursor = self.cursor, "history redo");
        Some(self.current())
    }

    /// Drop every entry and return to the original. Not undoable.
    pub fn reset(&mut self) -> &ImageBuffer {
        debug!(dropped = self.entries.len(), "history reset");
        self.entries.clear();
        self.cursor = 0;
        self.evicted = 0;
        &self.original
    }
}
