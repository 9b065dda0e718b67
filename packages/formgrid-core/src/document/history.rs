//! Undo/redo snapshots.

use std::collections::VecDeque;

use super::FormDocument;

/// Bounded undo/redo stacks of whole-document snapshots.
#[derive(Debug, Clone)]
pub struct History {
    undo: VecDeque<FormDocument>,
    redo: Vec<FormDocument>,
    limit: usize,
}

impl History {
    /// Creates an empty history keeping at most `limit` undo steps.
    pub fn new(limit: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            limit,
        }
    }

    /// Records the state preceding a committed operation.
    ///
    /// Clears the redo stack.
    pub fn record(&mut self, before: FormDocument) {
        if self.limit == 0 {
            return;
        }
        if self.undo.len() == self.limit {
            self.undo.pop_front();
        }
        self.undo.push_back(before);
        self.redo.clear();
    }

    /// Swaps `current` with the latest undo snapshot.
    ///
    /// Returns `false` when there is nothing to undo.
    pub fn undo(&mut self, current: &mut FormDocument) -> bool {
        match self.undo.pop_back() {
            Some(previous) => {
                self.redo.push(std::mem::replace(current, previous));
                true
            }
            None => false,
        }
    }

    /// Re-applies the latest undone state.
    pub fn redo(&mut self, current: &mut FormDocument) -> bool {
        match self.redo.pop() {
            Some(next) => {
                self.undo.push_back(std::mem::replace(current, next));
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}
