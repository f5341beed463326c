//! HyperLogLog distinct-count estimator, 2^10 registers.

pub const PRECISION: u32 = 10;
pub const REGISTERS: usize = 1 << PRECISION;

/// Bits left after the register index.
const RANK_BITS: u32 = 32 - PRECISION;

/// 32-bit FNV-1a followed by the murmur3 `fmix32` finaliser.
pub fn hash32(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0x811c_9dc5;
    for &b in bytes {
        h ^= u32::from(b);
        h = h.wrapping_mul(0x0100_0193);
    }
    h ^= h >> 16;
    h = h.wrapping_mul(0x85eb_ca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2_ae35);
    h ^= h >> 16;
    h
}

#[derive(Debug, Clone)]
pub struct HyperLogLog {
    registers: Vec<u8>,
}

impl Default for HyperLogLog {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperLogLog {
    pub fn new() -> Self {
        Self {
            registers: vec![0; REGISTERS],
        }
    }

    pub fn add(&mut self, bytes: &[u8]) {
        let x = hash32(bytes);
        let idx = (x >> RANK_BITS) as usize;
        let rest = x << PRECISION;
        let rank = (rest.leading_zeros() + 1).min(RANK_BITS) as u8;
        if rank > self.registers[idx] {
            self.registers[idx] = rank;
        }
    }

    pub fn estimate(&self) -> f64 {
        let m = REGISTERS as f64;
        let alpha = 0.7213 / (1.0 + 1.079 / m);
        let mut sum = 0.0;
        let mut zeros = 0usize;
        for &r in &self.registers {
            sum += 2f64.powi(-i32::from(r));
            if r == 0 {
                zeros += 1;
            }
        }
        let e = alpha * m * m / sum;

        let two_32 = 4_294_967_296.0_f64;
        if e <= 2.5 * m && zeros > 0 {
            m * (m / zeros as f64).ln()
        } else if e <= two_32 / 30.0 {
            e
        } else {
            -two_32 * (1.0 - e / two_32).ln()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_estimates_zero() {
        assert_eq!(HyperLogLog::new().estimate(), 0.0);
    }

    #[test]
    fn duplicates_do_not_inflate() {
        let mut h = HyperLogLog::new();
        for _ in 0..1_000 {
            h.add(b"same");
        }
        assert_eq!(h.estimate().round(), 1.0);
    }

    #[test]
    fn within_five_percent_at_ten_thousand() {
        let mut h = HyperLogLog::new();
        for i in 0..10_000 {
            h.add(i.to_string().as_bytes());
        }
        let est = h.estimate();
        assert!((est - 10_000.0).abs() / 10_000.0 < 0.05, "estimate {}", est);
    }

    #[test]
    fn hash_is_stable() {
        assert_eq!(hash32(b"abc"), hash32(b"abc"));
        assert_ne!(hash32(b"abc"), hash32(b"abd"));
    }
}
