//! Mixed linear / logarithmic frequency grids for low-rank spectral models.
//!
//! The grid follows van Haasteren & Vallisneri, MNRAS 446 (2015): the
//! lowest frequencies are covered with log-spaced bins down to `f_min`, the
//! rest with the usual `k / T` linear modes.

use crate::error::{Error, Result};

/// Frequencies and their quadrature weights, log part first.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyBins {
    pub freqs: Vec<f64>,
    pub weights: Vec<f64>,
}

impl FrequencyBins {
    pub fn len(&self) -> usize {
        self.freqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freqs.is_empty()
    }
}

/// Build the frequency grid.
///
/// * `t` – observation span (seconds)
/// * `logmode` – linear mode index at which the log spacing hands over
/// * `f_min` – lowest log-spaced frequency
/// * `nlin`, `nlog` – number of linear / logarithmic frequencies
pub fn lin_binning(t: f64, logmode: i64, f_min: f64, nlin: usize, nlog: usize) -> Result<FrequencyBins> {
    if logmode < 0 {
        return Err(Error::InvalidArgument(
            "cannot do log-spacing when all frequencies are linearly sampled".into(),
        ));
    }
    if !(t > 0.0) {
        return Err(Error::InvalidArgument(format!("observation span must be positive, got {t}")));
    }

    let df_lin = 1.0 / t;
    let f_min_lin = (1.0 + logmode as f64) / t;
    let f_lin: Vec<f64> = (0..nlin).map(|k| f_min_lin + k as f64 * df_lin).collect();
    let w_lin = vec![df_lin.sqrt(); nlin];

    if nlog == 0 {
        return Ok(FrequencyBins {
            freqs: f_lin,
            weights: w_lin,
        });
    }

    if !(f_min > 0.0) {
        return Err(Error::InvalidArgument(format!("f_min must be positive, got {f_min}")));
    }

    let f_min_log = f_min.ln();
    let f_max_log = ((logmode as f64 + 0.5) / t).ln();
    let df_log = (f_max_log - f_min_log) / nlog as f64;

    let f_log = linspace(f_min_log + 0.5 * df_log, f_max_log - 0.5 * df_log, nlog)
        .into_iter()
        .map(f64::exp)
        .collect::<Vec<_>>();
    let w_log = f_log.iter().map(|&f| (df_log * f).sqrt()).collect::<Vec<_>>();

    log::debug!(
        "lin_binning: {nlog} log bins in [{:.3e}, {:.3e}] Hz, {nlin} linear bins from {:.3e} Hz",
        f_min,
        f_max_log.exp(),
        f_min_lin
    );

    let mut freqs = f_log;
    freqs.extend(f_lin);
    let mut weights = w_log;
    weights.extend(w_lin);
    Ok(FrequencyBins { freqs, weights })
}

/// `n` evenly spaced points from `start` to `stop` inclusive.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + i as f64 * step).collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: f64 = 10.0 * 365.25 * 86400.0;

    #[test]
    fn test_linear_only_grid() {
        let bins = lin_binning(T, 0, 1e-10, 30, 0).unwrap();
        assert_eq!(bins.len(), 30);
        for (k, (&f, &w)) in bins.freqs.iter().zip(&bins.weights).enumerate() {
            let expected = (k + 1) as f64 / T;
            assert!((f - expected).abs() / expected < 1e-12, "f[{k}] = {f}");
            assert!((w - (1.0 / T).sqrt()).abs() < 1e-18);
        }
    }

    #[test]
    fn test_negative_logmode_rejected() {
        assert!(matches!(
            lin_binning(T, -1, 1e-10, 10, 5),
            Err(Error::InvalidArgument(_))
        ));
        assert!(lin_binning(1.0, -1, 1.0, 0, 0).is_err());
    }

    #[test]
    fn test_log_part_precedes_linear_part() {
        let bins = lin_binning(T, 2, 1e-10, 20, 8).unwrap();
        assert_eq!(bins.freqs.len(), 28);
        assert_eq!(bins.weights.len(), 28);

        let (log_part, lin_part) = bins.freqs.split_at(8);
        assert!(log_part.windows(2).all(|w| w[0] < w[1]));
        assert!(lin_part.windows(2).all(|w| w[0] < w[1]));
        assert!(log_part[0] > 1e-10);
        assert!(*log_part.last().unwrap() < 2.5 / T);
        assert!((lin_part[0] - 3.0 / T).abs() / lin_part[0] < 1e-12);
        assert!(bins.weights.iter().all(|&w| w > 0.0));
    }

    #[test]
    fn test_linspace_endpoints() {
        let xs = linspace(0.01, 0.1, 100);
        assert_eq!(xs.len(), 100);
        assert!((xs[0] - 0.01).abs() < 1e-15);
        assert!((xs[99] - 0.1).abs() < 1e-15);
        assert!(linspace(1.0, 2.0, 0).is_empty());
        assert_eq!(linspace(3.0, 5.0, 1), vec![3.0]);
    }
}
