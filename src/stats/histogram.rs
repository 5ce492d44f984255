//! Equal-width histograms and sample percentiles.
//!
//! [`Histogram`] follows the usual binning convention: `bins` equal-width
//! bins spanning `[min, max]`, every bin half-open except the last, which
//! also holds the maximum. A zero-width range is widened to
//! `[v - 0.5, v + 0.5]`. [`Histogram::pdf`] is the piecewise-constant
//! density that the normalised histogram describes (zero outside).

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `bins + 1` monotonically increasing edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    total: usize,
}

impl Histogram {
    pub fn new(data: &[f64], bins: usize) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::EmptyData("cannot histogram an empty sample".into()));
        }
        if bins == 0 {
            return Err(Error::InvalidArgument("histogram needs at least one bin".into()));
        }

        let (mut lo, mut hi) = data
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if !lo.is_finite() || !hi.is_finite() {
            return Err(Error::Numeric("histogram range is not finite".into()));
        }
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bins as f64;
        let mut edges: Vec<f64> = (0..=bins).map(|i| lo + i as f64 * width).collect();
        edges[bins] = hi;

        let mut hist = Histogram {
            edges,
            counts: vec![0; bins],
            total: 0,
        };
        for &v in data {
            if let Some(i) = hist.bin_index(v) {
                hist.counts[i] += 1;
                hist.total += 1;
            }
        }
        Ok(hist)
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    /// Bin holding `x`, or `None` outside `[first edge, last edge]`.
    pub fn bin_index(&self, x: f64) -> Option<usize> {
        let lo = self.edges[0];
        let hi = *self.edges.last()?;
        if !(x >= lo && x <= hi) {
            return None;
        }
        if x == hi {
            return Some(self.bins() - 1);
        }
        // First edge strictly greater than x, minus one.
        let upper = self.edges.partition_point(|&e| e <= x);
        Some(upper.saturating_sub(1).min(self.bins() - 1))
    }

    /// Bin centres, useful as x coordinates when drawing.
    pub fn centers(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    pub fn widths(&self) -> Vec<f64> {
        self.edges.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Counts normalised so the histogram integrates to one.
    pub fn densities(&self) -> Vec<f64> {
        self.counts
            .iter()
            .zip(self.widths())
            .map(|(&c, w)| c as f64 / (self.total as f64 * w))
            .collect()
    }

    /// Probability density of the histogram distribution at `x`.
    ///
    /// The support is half-open, `[first edge, last edge)`: interior edges
    /// belong to the bin on their right and the density at the last edge is
    /// zero, even though that edge is counted into the last bin.
    pub fn pdf(&self, x: f64) -> f64 {
        if self.edges.last().is_some_and(|&hi| x >= hi) {
            return 0.0;
        }
        match self.bin_index(x) {
            Some(i) => {
                let w = self.edges[i + 1] - self.edges[i];
                self.counts[i] as f64 / (self.total as f64 * w)
            }
            None => 0.0,
        }
    }
}

/// `q`-th percentile (`q` in `[0, 100]`) with linear interpolation between
/// order statistics.
pub fn percentile(data: &[f64], q: f64) -> Result<f64> {
    if data.is_empty() {
        return Err(Error::EmptyData("cannot take a percentile of an empty sample".into()));
    }
    if !(0.0..=100.0).contains(&q) {
        return Err(Error::InvalidArgument(format!("percentile must be in [0, 100], got {q}")));
    }

    let mut sorted = data.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let rank = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_interpolates() {
        let data = [4.0, 1.0, 3.0, 2.0, 5.0];
        assert_eq!(percentile(&data, 50.0).unwrap(), 3.0);
        assert_eq!(percentile(&data, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&data, 100.0).unwrap(), 5.0);
        assert!((percentile(&data, 95.0).unwrap() - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_rejects_bad_input() {
        assert!(matches!(percentile(&[], 50.0), Err(Error::EmptyData(_))));
        assert!(matches!(percentile(&[1.0], 101.0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_histogram_last_bin_is_closed() {
        let data = [0.0, 0.5, 1.0, 1.5, 2.0];
        let hist = Histogram::new(&data, 2).unwrap();
        assert_eq!(hist.edges, vec![0.0, 1.0, 2.0]);
        assert_eq!(hist.counts, vec![2, 3]);
    }

    #[test]
    fn test_density_integrates_to_one() {
        let data: Vec<f64> = (0..1000).map(|i| (i as f64 * 0.37).sin()).collect();
        let hist = Histogram::new(&data, 50).unwrap();
        let integral: f64 = hist.densities().iter().zip(hist.widths()).map(|(d, w)| d * w).sum();
        assert!((integral - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_pdf_of_constant_sample() {
        let hist = Histogram::new(&[2.0; 10], 100).unwrap();
        assert_eq!(hist.edges[0], 1.5);
        assert_eq!(*hist.edges.last().unwrap(), 2.5);
        assert!((hist.pdf(2.0) - 100.0).abs() < 1e-9);
        assert_eq!(hist.pdf(3.0), 0.0);
    }

    #[test]
    fn test_pdf_support_is_half_open() {
        let data = [0.0, 0.5, 1.0, 1.5, 2.0];
        let hist = Histogram::new(&data, 2).unwrap();
        assert_eq!(hist.pdf(0.0), 0.4);
        assert_eq!(hist.pdf(1.0), 0.6);
        assert_eq!(hist.pdf(2.0), 0.0);
        assert_eq!(hist.pdf(-0.1), 0.0);
    }
}
