//! Growable single-producer/single-consumer byte queue.
//!
//! `write` appends, `read` copies out and advances the read cursor, and
//! `compact` drops the consumed prefix. `readable()` is always
//! `len - read_pos`. When every byte has been consumed the buffer rewinds to
//! the start so steady-state streaming never grows it.

use std::io;

use crate::tracking::PeakTracker;

pub const INITIAL_CAPACITY: usize = 4096;

#[derive(Debug, Default)]
pub struct ByteBuffer {
    data: Vec<u8>,
    read_pos: usize,
    peak: PeakTracker,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `bytes`, doubling capacity (from 4 KiB) as needed.
    pub fn write(&mut self, bytes: &[u8]) {
        let needed = self.data.len() + bytes.len();
        if needed > self.data.capacity() {
            let mut cap = self.data.capacity().max(INITIAL_CAPACITY);
            while cap < needed {
                cap *= 2;
            }
            self.data.reserve_exact(cap - self.data.len());
        }
        self.data.extend_from_slice(bytes);
        self.peak.record_used(self.data.len());
    }

    pub fn write_str(&mut self, s: &str) {
        self.write(s.as_bytes());
    }

    /// Copy up to `out.len()` unread bytes into `out`; returns the count.
    /// Zero means nothing is buffered right now.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = self.readable().min(out.len());
        out[..n].copy_from_slice(&self.data[self.read_pos..self.read_pos + n]);
        self.consume(n);
        n
    }

    /// Drain up to `max` unread bytes into a fresh vector.
    pub fn read_to_vec(&mut self, max: usize) -> Vec<u8> {
        let n = self.readable().min(max);
        let out = self.data[self.read_pos..self.read_pos + n].to_vec();
        self.consume(n);
        out
    }

    pub fn readable(&self) -> usize {
        self.data.len() - self.read_pos
    }

    pub fn is_empty(&self) -> bool {
        self.readable() == 0
    }

    /// Unread bytes, without consuming them.
    pub fn unread(&self) -> &[u8] {
        &self.data[self.read_pos..]
    }

    /// Mark `n` unread bytes as consumed (clamped to what is readable).
    pub fn consume(&mut self, n: usize) {
        self.read_pos += n.min(self.readable());
        if self.read_pos == self.data.len() {
            self.data.clear();
            self.read_pos = 0;
        }
    }

    /// Discard the consumed prefix, moving unread bytes to the front.
    pub fn compact(&mut self) {
        if self.read_pos > 0 {
            self.data.drain(..self.read_pos);
            self.read_pos = 0;
        }
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.read_pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Largest number of bytes ever held at once.
    pub fn peak_bytes(&self) -> usize {
        self.peak.peak()
    }
}

impl io::Write for ByteBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        ByteBuffer::write(self, buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
