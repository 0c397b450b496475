//! Undo journal
//!
//! Every state write records the value it replaced. A checkpoint is just
//! the journal length at some point in time; reverting pops entries back
//! to that length, newest first, and hands them to the caller to restore.

/// Append-only log of undo entries
#[derive(Debug, Clone)]
pub struct Journal<E> {
    entries: Vec<E>,
}

impl<E> Default for Journal<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<E> Journal<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the prior value of a cell about to be written
    pub fn record(&mut self, entry: E) {
        self.entries.push(entry);
    }

    /// Current position, usable as a checkpoint
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every entry recorded after `checkpoint`, newest first
    pub fn unwind(&mut self, checkpoint: usize) -> impl Iterator<Item = E> + '_ {
        let start = checkpoint.min(self.entries.len());
        self.entries.drain(start..).rev()
    }

    /// Forget all entries (the outermost operation committed)
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
