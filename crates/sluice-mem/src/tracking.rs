//! High-water mark tracking for arenas and buffers.
//!
//! Single-threaded by construction: owners are not `Sync`, so a `Cell` is
//! enough and recording works through `&self`.

use std::cell::Cell;

#[derive(Debug, Default)]
pub struct PeakTracker {
    peak_bytes: Cell<usize>,
}

impl PeakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new "used bytes" value; updates the peak if higher.
    pub fn record_used(&self, used_bytes: usize) {
        if used_bytes > self.peak_bytes.get() {
            self.peak_bytes.set(used_bytes);
            #[cfg(feature = "tracing")]
            tracing::trace!(peak = used_bytes, "new memory high-water mark");
        }
    }

    pub fn peak(&self) -> usize {
        self.peak_bytes.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_only_moves_up() {
        let t = PeakTracker::new();
        t.record_used(10);
        t.record_used(4);
        t.record_used(12);
        assert_eq!(t.peak(), 12);
    }
}
