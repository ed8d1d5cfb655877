//! Equal-width histogram.
//!
//! Edges follow the usual convention: `bins + 1` evenly spaced edges from the
//! minimum to the maximum finite value. Every bin is half-open `[lo, hi)`
//! except the last, which also includes its right edge. A constant series is
//! widened to `[v - 0.5, v + 0.5]`; an empty one to `[0, 1]`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bin the finite entries of `values`. NaN and infinities are skipped.
    pub fn compute(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();

        let (lo, hi) = match finite.iter().copied().fold(None, |acc: Option<(f64, f64)>, v| {
            Some(match acc {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            })
        }) {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(bounds) => bounds,
        };

        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..bins).map(|i| lo + width * i as f64).collect();
        edges.push(hi);

        let mut counts = vec![0usize; bins];
        for v in finite {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Self { edges, counts }
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Number of values binned.
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Left and right edge of bin `i`.
    pub fn bin_range(&self, i: usize) -> Option<(f64, f64)> {
        Some((*self.edges.get(i)?, *self.edges.get(i + 1)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn evenly_spaced_edges() {
        let h = Histogram::compute(&[0.0, 1.0, 2.0, 3.0, 4.0], 4);
        assert_eq!(h.edges, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        // Max value lands in the closed last bin
        assert_eq!(h.counts, vec![1, 1, 1, 2]);
        assert_eq!(h.total(), 5);
        assert_eq!(h.max_count(), 2);
    }

    #[test]
    fn non_finite_values_are_skipped() {
        let h = Histogram::compute(&[1.0, f64::NAN, 2.0, f64::INFINITY], 2);
        assert_eq!(h.total(), 2);
        assert_eq!(h.bin_range(0), Some((1.0, 1.5)));
    }

    #[test]
    fn constant_series_is_widened() {
        let h = Histogram::compute(&[5.0, 5.0, 5.0], 2);
        assert_approx(h.edges[0], 4.5, DEFAULT_EPSILON);
        assert_approx(h.edges[2], 5.5, DEFAULT_EPSILON);
        assert_eq!(h.counts, vec![0, 3]);
    }

    #[test]
    fn empty_series_has_unit_range() {
        let h = Histogram::compute(&[], 3);
        assert_eq!(h.bins(), 3);
        assert_eq!(h.total(), 0);
        assert_eq!(h.edges.first(), Some(&0.0));
        assert_eq!(h.edges.last(), Some(&1.0));
        assert_eq!(h.bin_range(3), None);
    }

    #[test]
    fn zero_bins_means_one() {
        let h = Histogram::compute(&[1.0, 2.0], 0);
        assert_eq!(h.counts, vec![2]);
    }
}
