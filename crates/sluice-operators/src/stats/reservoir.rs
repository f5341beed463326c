//! Algorithm R reservoir sampling over a xorshift64 generator.

use sluice_core::config::DEFAULT_SAMPLE_SEED;

#[derive(Debug, Clone)]
pub struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    /// A zero seed would never leave zero; it is replaced by the default.
    pub fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { DEFAULT_SAMPLE_SEED } else { seed },
        }
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

/// Uniform sample of at most `capacity` items from a stream of unknown length.
#[derive(Debug, Clone)]
pub struct Reservoir<T> {
    capacity: usize,
    items: Vec<T>,
    seen: u64,
    rng: XorShift64,
}

impl<T> Reservoir<T> {
    pub fn new(capacity: usize, seed: u64) -> Self {
        Self {
            capacity,
            items: Vec::with_capacity(capacity.min(1024)),
            seen: 0,
            rng: XorShift64::new(seed),
        }
    }

    /// Offer the next stream item; `make` only runs if the item is kept.
    pub fn offer_with(&mut self, make: impl FnOnce() -> T) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(make());
            return;
        }
        let j = self.rng.next_u64() % self.seen;
        if j < self.capacity as u64 {
            self.items[j as usize] = make();
        }
    }

    pub fn offer(&mut self, item: T) {
        self.offer_with(|| item);
    }

    pub fn seen(&self) -> u64 {
        self.seen
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}
