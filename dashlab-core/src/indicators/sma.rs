//! Simple Moving Average (SMA).
//!
//! Rolling mean of a series over a lookback window, used for the price chart
//! overlays. First valid value at index `period - 1`.

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    /// A period of zero is treated as one.
    pub fn new(period: usize) -> Self {
        let period = period.max(1);
        Self {
            period,
            name: format!("SMA {period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// One output per input; NaN during warmup and wherever the window holds
    /// a non-finite value.
    pub fn compute(&self, values: &[f64]) -> Vec<f64> {
        let period = self.period;
        let mut out = Vec::with_capacity(values.len());
        let mut sum = 0.0;
        // Non-finite values currently inside the window; they never enter `sum`.
        let mut gaps = 0usize;

        for (i, &entering) in values.iter().enumerate() {
            if entering.is_finite() {
                sum += entering;
            } else {
                gaps += 1;
            }
            if let Some(&leaving) = i.checked_sub(period).and_then(|j| values.get(j)) {
                if leaving.is_finite() {
                    sum -= leaving;
                } else {
                    gaps -= 1;
                }
            }

            let full = i + 1 >= period;
            out.push(if full && gaps == 0 {
                sum / period as f64
            } else {
                f64::NAN
            });
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn sma_5_basic() {
        let result = Sma::new(5).compute(&[10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0]);

        assert_eq!(result.len(), 7);
        for (i, v) in result.iter().enumerate().take(4) {
            assert!(v.is_nan(), "expected NaN at index {i}");
        }
        // SMA[4] = mean(10,11,12,13,14) = 12.0
        assert_approx(result[4], 12.0, DEFAULT_EPSILON);
        assert_approx(result[5], 13.0, DEFAULT_EPSILON);
        assert_approx(result[6], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_1_is_identity() {
        let result = Sma::new(1).compute(&[100.0, 200.0, 300.0]);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_nan_propagation() {
        let result = Sma::new(3).compute(&[10.0, 11.0, f64::NAN, 13.0, 14.0, 15.0]);
        // Windows touching index 2 are NaN
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
        // [13,14,15]
        assert_approx(result[5], 14.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_period_and_name() {
        assert_eq!(Sma::new(20).name(), "SMA 20");
        assert_eq!(Sma::new(0).period(), 1);
    }

    #[test]
    fn sma_recovers_after_infinite_value() {
        let result = Sma::new(2).compute(&[1.0, f64::INFINITY, 3.0, 5.0]);
        assert!(result[1].is_nan());
        assert!(result[2].is_nan());
        assert_approx(result[3], 4.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sma_too_few_values() {
        let result = Sma::new(5).compute(&[10.0, 11.0]);
        assert!(result.iter().all(|v| v.is_nan()));
    }
}
