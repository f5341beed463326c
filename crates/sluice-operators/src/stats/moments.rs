//! Streaming mean/variance (Welford) and raw moments for shape statistics.

/// Variance below this is treated as zero when normalising shape moments.
const FLAT_VARIANCE: f64 = 1e-15;

#[derive(Debug, Clone, Default)]
pub struct Moments {
    n: u64,
    mean: f64,
    m2: f64,
    /// Running means of v, v², v³, v⁴.
    raw: [f64; 4],
}

impl Moments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, v: f64) {
        self.n += 1;
        let gamma = 1.0 / self.n as f64;

        let delta = v - self.mean;
        self.mean += delta * gamma;
        self.m2 += delta * (v - self.mean);

        let mut p = v;
        for m in &mut self.raw {
            *m += (p - *m) * gamma;
            p *= v;
        }
    }

    pub fn count(&self) -> u64 {
        self.n
    }

    pub fn mean(&self) -> Option<f64> {
        (self.n > 0).then_some(self.mean)
    }

    /// Sample variance (n - 1 denominator).
    pub fn variance(&self) -> Option<f64> {
        (self.n > 1).then(|| self.m2 / (self.n - 1) as f64)
    }

    pub fn stddev(&self) -> Option<f64> {
        self.variance().map(f64::sqrt)
    }

    fn raw_variance(&self) -> f64 {
        self.raw[1] - self.raw[0] * self.raw[0]
    }

    pub fn skewness(&self) -> Option<f64> {
        if self.n <= 2 {
            return None;
        }
        let vr = self.raw_variance();
        if vr <= FLAT_VARIANCE {
            return Some(0.0);
        }
        let [m1, _, m3, _] = self.raw;
        Some((m3 - 3.0 * m1 * vr - m1 * m1 * m1) / vr.powf(1.5))
    }

    /// Excess kurtosis.
    pub fn kurtosis(&self) -> Option<f64> {
        if self.n <= 3 {
            return None;
        }
        let vr = self.raw_variance();
        if vr <= FLAT_VARIANCE {
            return Some(0.0);
        }
        let [m1, m2, m3, m4] = self.raw;
        let m1_2 = m1 * m1;
        let central4 = m4 - 4.0 * m1 * m3 + 6.0 * m1_2 * m2 - 3.0 * m1_2 * m1_2;
        Some(central4 / (vr * vr) - 3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn welford_mean_and_variance() {
        let mut m = Moments::new();
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            m.add(v);
        }
        assert!(close(m.mean().unwrap(), 5.0));
        assert!(close(m.variance().unwrap(), 32.0 / 7.0));
    }

    #[test]
    fn shape_needs_enough_values() {
        let mut m = Moments::new();
        m.add(1.0);
        m.add(2.0);
        assert!(m.variance().is_some());
        assert!(m.skewness().is_none());
        m.add(3.0);
        assert!(close(m.skewness().unwrap(), 0.0));
        assert!(m.kurtosis().is_none());
    }

    #[test]
    fn constant_input_has_flat_shape() {
        let mut m = Moments::new();
        for _ in 0..10 {
            m.add(3.0);
        }
        assert_eq!(m.skewness(), Some(0.0));
        assert_eq!(m.kurtosis(), Some(0.0));
        assert!(close(m.variance().unwrap(), 0.0));
    }

    #[test]
    fn right_skew_is_positive() {
        let mut m = Moments::new();
        for v in [1.0, 1.0, 1.0, 1.0, 10.0] {
            m.add(v);
        }
        assert!(m.skewness().unwrap() > 0.0);
    }

    #[test]
    fn uniform_kurtosis_is_negative() {
        let mut m = Moments::new();
        for i in 0..1000 {
            m.add(i as f64);
        }
        // Excess kurtosis of a uniform distribution is -1.2.
        assert!((m.kurtosis().unwrap() + 1.2).abs() < 0.01);
    }
}
