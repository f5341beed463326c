//! Scoped scratch arena backed by `bumpalo`.
//!
//! The CSV decoder resets the arena before each line and only copies into it
//! when a quoted field contains a doubled quote. Every allocation borrows the
//! arena, so the borrow checker rejects holding such a slice across `reset`.

use std::cell::Cell;

use bumpalo::Bump;

use crate::error::{Error, Result};
use crate::tracking::PeakTracker;

pub const DEFAULT_BLOCK_SIZE: usize = 64 * 1024;

pub struct ScratchArena {
    bump: Bump,
    limit: Option<usize>,
    used: Cell<usize>,
    peak: PeakTracker,
}

impl Default for ScratchArena {
    fn default() -> Self {
        Self::new()
    }
}

impl ScratchArena {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_BLOCK_SIZE, None)
    }

    /// Arena whose first chunk holds `block_size` bytes. Larger requests get
    /// their own chunk.
    pub fn with_block_size(block_size: usize) -> Self {
        Self::with_limit(block_size, None)
    }

    /// Arena that refuses to hand out more than `limit` bytes between resets.
    pub fn with_limit(block_size: usize, limit: Option<usize>) -> Self {
        Self {
            bump: Bump::with_capacity(block_size),
            limit,
            used: Cell::new(0),
            peak: PeakTracker::new(),
        }
    }

    fn reserve(&self, bytes: usize) -> Result<()> {
        let used = self.used.get() + bytes;
        if let Some(limit) = self.limit {
            if used > limit {
                #[cfg(feature = "tracing")]
                tracing::warn!(bytes, limit, "scratch arena limit reached");
                return Err(Error::AllocFailed {
                    tag: "scratch_arena",
                    bytes,
                    limit,
                });
            }
        }
        self.used.set(used);
        self.peak.record_used(used);
        Ok(())
    }

    /// `n` zeroed bytes valid until the next `reset`.
    pub fn alloc(&self, n: usize) -> Result<&mut [u8]> {
        self.reserve(n)?;
        Ok(self.bump.alloc_slice_fill_copy(n, 0u8))
    }

    pub fn alloc_bytes(&self, bytes: &[u8]) -> Result<&[u8]> {
        self.reserve(bytes.len())?;
        Ok(self.bump.alloc_slice_copy(bytes))
    }

    pub fn alloc_str(&self, s: &str) -> Result<&str> {
        self.reserve(s.len())?;
        Ok(self.bump.alloc_str(s))
    }

    /// Copy `raw` into the arena, collapsing each doubled `quote` byte into
    /// a single one.
    pub fn alloc_unescaped(&self, raw: &[u8], quote: u8) -> Result<&[u8]> {
        let out = self.alloc(raw.len())?;
        let mut written = 0;
        let mut i = 0;
        while i < raw.len() {
            let b = raw[i];
            out[written] = b;
            written += 1;
            i += if b == quote && raw.get(i + 1) == Some(&quote) {
                2
            } else {
                1
            };
        }
        Ok(&out[..written])
    }

    /// Invalidate every allocation at once; chunk memory is kept for reuse.
    pub fn reset(&mut self) {
        self.bump.reset();
        self.used.set(0);
    }

    /// Bytes handed out since the last reset.
    pub fn used_bytes(&self) -> usize {
        self.used.get()
    }

    /// Largest `used_bytes` observed over the arena's lifetime.
    pub fn peak_bytes(&self) -> usize {
        self.peak.peak()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unescape_collapses_doubled_quotes() {
        let arena = ScratchArena::new();
        let out = arena.alloc_unescaped(br#"a""b"#, b'"').unwrap();
        assert_eq!(out, b"a\"b");
        let out = arena.alloc_unescaped(br#""""""#, b'"').unwrap();
        assert_eq!(out, b"\"\"");
    }

    #[test]
    fn alloc_is_zeroed() {
        let arena = ScratchArena::with_block_size(16);
        let big = arena.alloc(1024).unwrap();
        assert_eq!(big.len(), 1024);
        assert!(big.iter().all(|&b| b == 0));
    }

    #[test]
    fn reset_clears_usage_and_keeps_peak() {
        let mut arena = ScratchArena::new();
        arena.alloc_str("hello").unwrap();
        assert_eq!(arena.used_bytes(), 5);
        arena.reset();
        assert_eq!(arena.used_bytes(), 0);
        assert_eq!(arena.peak_bytes(), 5);
    }

    #[test]
    fn limit_turns_into_error() {
        let mut arena = ScratchArena::with_limit(64, Some(8));
        arena.alloc(6).unwrap();
        let err = arena.alloc(3).unwrap_err();
        assert!(matches!(err, Error::AllocFailed { bytes: 3, limit: 8, .. }));
        arena.reset();
        arena.alloc(8).unwrap();
    }
}
