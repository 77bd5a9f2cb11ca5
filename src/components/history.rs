//! Undo/redo: a bounded stack of full drawing-layer snapshots.
//!
//! Only the drawing layer is ever snapshotted; backgrounds and the overlay
//! are always regenerable and stay out of history to bound memory. Every
//! committed mutation captures the post-commit buffer, so the top of the
//! undo stack always mirrors the live canvas and undo steps to the entry
//! beneath it.

use std::collections::VecDeque;

use log::debug;

use crate::canvas::Surface;

/// An opaque full-buffer copy of the drawing layer, dimensions fixed at
/// capture time. Owned exclusively by the history store — never aliased by
/// a live surface, otherwise later draws would retroactively corrupt it.
pub struct CanvasSnapshot {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CanvasSnapshot {
    pub fn capture(surface: &Surface) -> Self {
        Self {
            width: surface.width(),
            height: surface.height(),
            pixels: surface.raw().to_vec(),
        }
    }

    /// Write this snapshot into the live surface. Dimension changes (a
    /// snapshot taken before a resize) restore the surface to the snapshot's
    /// exact size — undo of a resize is exact, not letterboxed.
    pub fn restore_into(&self, surface: &mut Surface) {
        surface.set_content(self.width, self.height, &self.pixels);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn memory_bytes(&self) -> usize {
        self.pixels.len()
    }
}

/// Linear (non-branching) undo/redo stacks with FIFO eviction.
pub struct HistoryStore {
    undo_stack: VecDeque<CanvasSnapshot>,
    redo_stack: VecDeque<CanvasSnapshot>,
    max_undo_steps: usize,
    /// Optional memory cap in bytes across both stacks.
    max_memory_bytes: Option<usize>,
    /// Running memory total across both stacks.
    total_memory: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new(50)
    }
}

impl HistoryStore {
    pub fn new(max_undo_steps: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_undo_steps: max_undo_steps.max(1),
            max_memory_bytes: None,
            total_memory: 0,
        }
    }

    pub fn with_memory_cap(mut self, bytes: Option<usize>) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    /// Snapshot the drawing layer's current buffer: defensive copy pushed
    /// onto `undo`, `redo` cleared, oldest entries evicted past the caps.
    /// Side effect only — the surface itself is untouched.
    pub fn capture(&mut self, surface: &Surface) {
        for old in self.redo_stack.drain(..) {
            self.total_memory = self.total_memory.saturating_sub(old.memory_bytes());
        }
        let snapshot = CanvasSnapshot::capture(surface);
        self.total_memory += snapshot.memory_bytes();
        self.undo_stack.push_back(snapshot);
        self.prune();
    }

    /// Step back one committed state. Returns `false` (and touches nothing)
    /// when there is no earlier state to return to.
    pub fn undo(&mut self, surface: &mut Surface) -> bool {
        if self.undo_stack.len() <= 1 {
            return false;
        }
        // The popped top mirrors the live buffer; parking it on the redo
        // stack is what makes undo and redo exact inverses.
        if let Some(current) = self.undo_stack.pop_back() {
            self.redo_stack.push_back(current);
        }
        if let Some(previous) = self.undo_stack.back() {
            previous.restore_into(surface);
        }
        true
    }

    /// Step forward again. Applies the popped snapshot and pushes it back
    /// onto `undo`, so a following `undo` returns to the pre-redo state.
    pub fn redo(&mut self, surface: &mut Surface) -> bool {
        let Some(snapshot) = self.redo_stack.pop_back() else {
            return false;
        };
        snapshot.restore_into(surface);
        self.undo_stack.push_back(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.undo_stack.len() > 1
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    /// Current memory held by both stacks, O(1) via the running total.
    pub fn memory_usage(&self) -> usize {
        self.total_memory
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.total_memory = 0;
    }

    /// Evict oldest entries first: by count, then by the optional memory
    /// cap. The newest entry is never evicted.
    fn prune(&mut self) {
        while self.undo_stack.len() > self.max_undo_steps {
            if let Some(evicted) = self.undo_stack.pop_front() {
                self.total_memory = self.total_memory.saturating_sub(evicted.memory_bytes());
                debug!("history: evicted oldest snapshot (count cap)");
            }
        }
        if let Some(max_bytes) = self.max_memory_bytes {
            while self.total_memory > max_bytes && self.undo_stack.len() > 1 {
                if let Some(evicted) = self.undo_stack.pop_front() {
                    self.total_memory = self.total_memory.saturating_sub(evicted.memory_bytes());
                    debug!("history: evicted oldest snapshot (memory cap)");
                }
            }
        }
    }
}
