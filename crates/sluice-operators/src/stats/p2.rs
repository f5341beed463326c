//! P² streaming quantile estimator (Jain & Chlamtac): five markers, O(1)
//! memory, no stored sample.

#[derive(Debug, Clone)]
pub struct P2Quantile {
    tau: f64,
    /// Marker heights.
    q: [f64; 5],
    /// Actual marker positions (1-based).
    pos: [i64; 5],
    /// Desired marker positions.
    desired: [f64; 5],
    /// Desired-position increments per observation.
    step: [f64; 5],
    count: u64,
}

impl P2Quantile {
    pub fn new(tau: f64) -> Self {
        Self {
            tau,
            q: [0.0; 5],
            pos: [1, 2, 3, 4, 5],
            desired: [0.0; 5],
            step: [0.0, tau / 2.0, tau, (1.0 + tau) / 2.0, 1.0],
            count: 0,
        }
    }

    pub fn tau(&self) -> f64 {
        self.tau
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn add(&mut self, y: f64) {
        if self.count < 5 {
            self.q[self.count as usize] = y;
            self.count += 1;
            if self.count == 5 {
                self.q.sort_by(f64::total_cmp);
                let t = self.tau;
                self.pos = [1, 2, 3, 4, 5];
                self.desired = [1.0, 1.0 + 2.0 * t, 1.0 + 4.0 * t, 3.0 + 2.0 * t, 5.0];
            }
            return;
        }
        self.count += 1;

        let k = if y < self.q[0] {
            self.q[0] = y;
            0
        } else if y >= self.q[4] {
            self.q[4] = y;
            3
        } else {
            (1..5).find(|&i| y < self.q[i]).map_or(3, |i| i - 1)
        };

        for p in &mut self.pos[k + 1..] {
            *p += 1;
        }
        for (d, s) in self.desired.iter_mut().zip(self.step) {
            *d += s;
        }

        for i in 1..4 {
            let d = self.desired[i] - self.pos[i] as f64;
            let room_up = self.pos[i + 1] - self.pos[i] > 1;
            let room_down = self.pos[i - 1] - self.pos[i] < -1;
            if (d >= 1.0 && room_up) || (d <= -1.0 && room_down) {
                let dir: i64 = if d >= 0.0 { 1 } else { -1 };
                let candidate = self.parabolic(i, dir as f64);
                self.q[i] = if self.q[i - 1] < candidate && candidate < self.q[i + 1] {
                    candidate
                } else {
                    self.linear(i, dir)
                };
                self.pos[i] += dir;
            }
        }
    }

    fn parabolic(&self, i: usize, d: f64) -> f64 {
        let (q, n) = (&self.q, &self.pos);
        let (n_lo, n_i, n_hi) = (n[i - 1] as f64, n[i] as f64, n[i + 1] as f64);
        q[i] + d / (n_hi - n_lo)
            * ((n_i - n_lo + d) * (q[i + 1] - q[i]) / (n_hi - n_i)
                + (n_hi - n_i - d) * (q[i] - q[i - 1]) / (n_i - n_lo))
    }

    fn linear(&self, i: usize, dir: i64) -> f64 {
        let j = (i as i64 + dir) as usize;
        self.q[i] + dir as f64 * (self.q[j] - self.q[i]) / (self.pos[j] - self.pos[i]) as f64
    }

    /// Current estimate; NaN before any observation. With fewer than five
    /// observations the exact order statistic at `floor(tau * (n - 1))`.
    pub fn value(&self) -> f64 {
        match self.count {
            0 => f64::NAN,
            n if n < 5 => {
                let mut seen = self.q[..n as usize].to_vec();
                seen.sort_by(f64::total_cmp);
                let idx = (self.tau * (n - 1) as f64).floor() as usize;
                seen[idx.min(seen.len() - 1)]
            }
            _ => self.q[2],
        }
    }
}
