//! Fixed-bin histogram whose range grows to cover every value seen.
//!
//! The range starts degenerate at the first value. The first different value
//! opens it (padded by 1% each side) and all earlier, identical values land in
//! one bin. A value outside the range doubles the width towards it, merging
//! adjacent bin pairs, until it fits.

use sluice_core::format::format_general;

pub const BINS: usize = 32;

#[derive(Debug, Clone)]
pub struct AdaptiveHistogram {
    lo: f64,
    hi: f64,
    counts: [u64; BINS],
    n: u64,
}

impl Default for AdaptiveHistogram {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveHistogram {
    pub fn new() -> Self {
        Self {
            lo: 0.0,
            hi: 0.0,
            counts: [0; BINS],
            n: 0,
        }
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn range(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    pub fn counts(&self) -> &[u64; BINS] {
        &self.counts
    }

    fn degenerate(&self) -> bool {
        self.lo == self.hi
    }

    /// Non-finite values are ignored.
    pub fn add(&mut self, y: f64) {
        if !y.is_finite() {
            return;
        }
        self.n += 1;
        if self.n == 1 {
            self.lo = y;
            self.hi = y;
            return;
        }
        if self.degenerate() {
            if y == self.lo {
                return;
            }
            let first = self.lo;
            if y < self.lo {
                self.lo = y;
            } else {
                self.hi = y;
            }
            let pad = (self.hi - self.lo) * 0.01;
            self.lo -= pad;
            self.hi += pad;
            self.counts = [0; BINS];
            let b = self.bin(first);
            self.counts[b] += self.n - 1;
            let b = self.bin(y);
            self.counts[b] += 1;
            return;
        }

        while y > self.hi {
            self.grow_right();
        }
        while y < self.lo {
            self.grow_left();
        }
        let b = self.bin(y);
        self.counts[b] += 1;
    }

    fn bin(&self, y: f64) -> usize {
        let width = (self.hi - self.lo) / BINS as f64;
        let idx = ((y - self.lo) / width).floor();
        if idx <= 0.0 {
            0
        } else {
            (idx as usize).min(BINS - 1)
        }
    }

    fn grow_right(&mut self) {
        let old = self.counts;
        self.hi = self.lo + 2.0 * (self.hi - self.lo);
        for i in 0..BINS / 2 {
            self.counts[i] = old[2 * i] + old[2 * i + 1];
        }
        self.counts[BINS / 2..].fill(0);
    }

    fn grow_left(&mut self) {
        let old = self.counts;
        self.lo = self.hi - 2.0 * (self.hi - self.lo);
        for i in BINS / 2..BINS {
            let j = 2 * (i - BINS / 2);
            self.counts[i] = old[j] + old[j + 1];
        }
        self.counts[..BINS / 2].fill(0);
    }

    /// `lo:hi:c1,...,c32`, or `None` with fewer than two observations.
    pub fn render(&self) -> Option<String> {
        if self.n < 2 {
            return None;
        }
        let mut counts = self.counts;
        if self.degenerate() {
            counts[0] = self.n;
        }
        let joined = counts
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Some(format!(
            "{}:{}:{}",
            format_general(self.lo, 6),
            format_general(self.hi, 6),
            joined
        ))
    }
}
