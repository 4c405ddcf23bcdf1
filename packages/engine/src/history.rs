//! # Undo/Redo History
//!
//! Linear history over whole-state snapshots.
//!
//! ## Design
//!
//! - A [`Snapshot`] holds the draft set (with its contribution vectors) and
//!   the suggestion ledger, so they are always restored together
//! - The pre-edit snapshot is pushed before every mutating edit
//! - Undo hands back the latest snapshot and stores the current state for redo
//! - Redo is the mirror operation
//! - New edits clear the redo stack

use crate::draft::DraftSet;
use crate::ledger::Ledger;

/// Consistent copy of the mutable session state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub drafts: DraftSet,
    pub ledger: Ledger,
}

#[derive(Debug)]
pub struct History {
    /// Snapshots before each applied edit (most recent last)
    undo_stack: Vec<Snapshot>,

    /// Snapshots displaced by undo (most recent last)
    redo_stack: Vec<Snapshot>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,
}

impl History {
    /// History with default max levels (100)
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

    /// Record the state before an edit
    pub fn push(&mut self, snapshot: Snapshot) {
        self.undo_stack.push(snapshot);

        // Trim if exceeded max levels
        if self.max_levels > 0 && self.undo_stack.len() > self.max_levels {
            self.undo_stack.remove(0);
        }

        // A new edit invalidates the undone future
        self.redo_stack.clear();
    }

    /// Trade `current` for the most recent snapshot
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop()?;
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Trade `current` for the most recently undone snapshot
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

    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
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
