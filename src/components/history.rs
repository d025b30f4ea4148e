use std::collections::VecDeque;

use crate::canvas::{Snapshot, Surface};

/// One history step: the surface as it was, plus the action it belongs to.
#[derive(Clone, Debug)]
pub struct HistoryEntry {
    pub description: String,
    pub snapshot: Snapshot,
}

impl HistoryEntry {
    fn memory_size(&self) -> usize {
        self.snapshot.memory_bytes() + self.description.len()
    }
}

// ============================================================================
// HISTORY STACK - linear undo/redo over full-surface snapshots
// ============================================================================

/// Undo/redo history with step and memory limits.
///
/// `snapshot` is called *before* a mutation, so the top of the undo stack is
/// always the state the next undo returns to. Any new snapshot discards the
/// redo stack; there is no branching timeline.
pub struct HistoryStack {
    undo_stack: VecDeque<HistoryEntry>,
    redo_stack: VecDeque<HistoryEntry>,
    max_history_size: usize,
    /// Optional memory cap in bytes.
    max_memory_bytes: Option<usize>,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(50)
    }
}

impl HistoryStack {
    /// `max_history_size` is raised to 1 if zero.
    pub fn new(max_history_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_history_size: max_history_size.max(1),
            max_memory_bytes: Some(100 * 1024 * 1024), // 100 MB default limit
            total_memory: 0,
        }
    }

    pub fn with_memory_limit(mut self, max_memory_bytes: Option<usize>) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self.prune();
        self
    }

    /// Record the surface's current state under `description` and drop any
    /// redo history.
    pub fn snapshot(&mut self, surface: &Surface, description: &str) {
        for entry in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(entry.memory_size());
        }

        let entry = HistoryEntry {
            description: description.to_string(),
            snapshot: Snapshot::capture(surface),
        };
        self.total_memory += entry.memory_size();
        self.undo_stack.push_back(entry);

        self.prune();
    }

    /// Restore the most recent snapshot. The state being left goes onto the
    /// redo stack. Returns the undone action's description, or `None` (and
    /// leaves the surface alone) when there is nothing to undo.
    pub fn undo(&mut self, surface: &mut Surface) -> Option<String> {
        let entry = self.undo_stack.pop_back()?;
        let current = HistoryEntry {
            description: entry.description.clone(),
            snapshot: Snapshot::capture(surface),
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size()) + current.memory_size();
        entry.snapshot.restore_into(surface);
        self.redo_stack.push_back(current);
        Some(entry.description)
    }

    /// Mirror of [`HistoryStack::undo`].
    pub fn redo(&mut self, surface: &mut Surface) -> Option<String> {
        let entry = self.redo_stack.pop_back()?;
        let current = HistoryEntry {
            description: entry.description.clone(),
            snapshot: Snapshot::capture(surface),
        };
        self.total_memory = self.total_memory.saturating_sub(entry.memory_size()) + current.memory_size();
        entry.snapshot.restore_into(surface);
        self.undo_stack.push_back(current);
        Some(entry.description)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack.back().map(|e| e.description.as_str())
    }

    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack.back().map(|e| e.description.as_str())
    }

    /// Get all undo descriptions (most recent first)
    pub fn undo_history(&self) -> Vec<String> {
        self.undo_stack.iter().rev().map(|e| e.description.clone()).collect()
    }

    /// Get the current memory usage of the history (O(1) via cached total)
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    /// Prune old entries to stay within limits
    fn prune(&mut self) {
        let mut pruned = 0usize;
        while self.undo_stack.len() > self.max_history_size {
            if let Some(removed) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                pruned += 1;
            }
        }

        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.undo_stack.len() > 1 {
                if let Some(removed) = self.undo_stack.pop_front() {
                    self.total_memory = self.total_memory.saturating_sub(removed.memory_size());
                    pruned += 1;
                }
            }
        }

        if pruned > 0 {
            crate::log_info!(
                "History: pruned {} oldest step(s), {} remain ({} bytes)",
                pruned,
                self.undo_stack.len(),
                self.total_memory
            );
        }
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    /// Undo up to `count` steps; returns how many were undone.
    pub fn undo_to(&mut self, count: usize, surface: &mut Surface) -> usize {
        let mut done = 0;
        while done < count && self.undo(surface).is_some() {
            done += 1;
        }
        done
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
