//! Undo/redo history
//!
//! Each committed transaction records a snapshot of the document and
//! selection taken before it ran. Undo swaps the current state with the most
//! recent snapshot; redo swaps it back. A new transaction clears the redo
//! stack.

use crate::document_model::{Document, Selection};

/// Document state captured before a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub doc: Document,
    pub selection: Option<Selection>,
}

/// Bounded undo/redo stacks
#[derive(Debug)]
pub struct History {
    /// Snapshots to return to on undo (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Snapshots to return to on redo (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// Create a history with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(100)
    }

    pub fn with_max_levels(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
        }
    }

    /// Record the state a committed transaction started from
    pub fn record(&mut self, before: Snapshot) {
        self.undo_stack.push(before);

        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // New edits invalidate the redo branch
        self.redo_stack.clear();
    }

    /// Step back; `current` is what redo will return to
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward again; `current` is what undo will return to
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop()?;
        self.undo_stack.push(current);
        Some(next)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}
