/// Exponential smoothing in integer arithmetic.
///
/// With `alpha = 1 / 2^s`, the output follows
/// `y[n] = alpha * x[n] + (1 - alpha) * y[n - 1]`, kept as the running sum
/// `y_sum = y * 2^s`. The shift starts low so the first samples are followed
/// closely, grows with the sample count up to the configured shift, and is
/// lowered again whenever the sum would no longer fit in 31 bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExponentialFilter {
    y_prev: i32,
    y_sum: i64,
    s: u8,
    s_prev: u8,
    n: u32,
}

/// Floor of the base 2 logarithm of `|n|`, with `order(0) == 0`
fn order(n: i64) -> u8 {
    match n.unsigned_abs() {
        0 => 0,
        n => (63 - n.leading_zeros()) as u8,
    }
}

impl ExponentialFilter {
    pub fn new(shift: u8) -> Self {
        let mut filter = Self::default();
        filter.reset(shift);
        filter
    }

    /// Forget every sample, keeping `shift` as the slowest response
    pub fn reset(&mut self, shift: u8) {
        *self = Self {
            s: shift.min(30),
            ..Default::default()
        };
    }

    /// Number of samples taken into account, saturating at `2^shift`
    pub fn samples(&self) -> u32 {
        self.n
    }

    pub fn output(&self) -> i32 {
        self.y_prev
    }

    pub fn filter(&mut self, sample: i32) -> i32 {
        self.n = self.n.saturating_add(1);
        if self.n == 1 {
            self.y_prev = sample;
            self.y_sum = sample as i64;
            self.s_prev = 0;
        }

        let mut s = self.s;
        if (1u32 << s) > self.n {
            s = order(self.n as i64);
        } else {
            self.n = 1 << s;
        }

        let magnitude = (self.y_prev as i64).abs().max((sample as i64).abs());
        s = s.min(30u8.saturating_sub(order(magnitude)));

        if self.s_prev > s {
            self.y_sum >>= self.s_prev - s;
        } else if self.s_prev < s {
            self.y_sum <<= s - self.s_prev;
        }

        self.y_sum += sample as i64 - self.y_prev as i64;
        self.y_prev = (self.y_sum >> s).clamp(i32::MIN as i64, i32::MAX as i64) as i32;
        self.s_prev = s;

        log::trace!("filter: {} -> {} ({})", sample, self.y_prev, s);

        self.y_prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_of_values() {
        assert_eq!(order(0), 0);
        assert_eq!(order(1), 0);
        assert_eq!(order(2), 1);
        assert_eq!(order(-1024), 10);
        assert_eq!(order(1_000_000_000), 29);
    }

    #[test]
    fn first_sample_passes_through() {
        let mut filter = ExponentialFilter::new(6);
        assert_eq!(filter.filter(12_345), 12_345);
        assert_eq!(filter.filter(12_345), 12_345);
        assert_eq!(filter.samples(), 2);
    }

    #[test]
    fn converges_to_constant_input() {
        for shift in [1, 4, 6] {
            let mut filter = ExponentialFilter::new(shift);
            filter.filter(0);

            let bound = 16 << shift;
            let steps = (0..bound)
                .position(|_| filter.filter(1000) == 1000)
                .expect("filter did not converge");
            assert!(steps < bound);

            // and stays there
            for _ in 0..10 {
                assert_eq!(filter.filter(1000), 1000);
            }
        }
    }

    #[test]
    fn converges_from_above() {
        let mut filter = ExponentialFilter::new(6);
        filter.filter(-50_000);
        let mut last = -50_000;
        for _ in 0..2000 {
            last = filter.filter(0);
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn sample_count_saturates_at_shift() {
        let mut filter = ExponentialFilter::new(3);
        for _ in 0..100 {
            filter.filter(7);
        }
        assert_eq!(filter.samples(), 8);
    }

    #[test]
    fn large_samples_lower_the_shift() {
        let mut filter = ExponentialFilter::new(6);
        for _ in 0..100 {
            filter.filter(999_999_999);
        }
        // half way between both extremes, as with a shift of 1
        let output = filter.filter(-999_999_999);
        assert!(output.abs() <= 1, "{output}");
    }

    #[test]
    fn reset_forgets_history() {
        let mut filter = ExponentialFilter::new(6);
        filter.filter(500);
        filter.filter(600);
        filter.reset(6);
        assert_eq!(filter.samples(), 0);
        assert_eq!(filter.filter(-3), -3);
    }
}
