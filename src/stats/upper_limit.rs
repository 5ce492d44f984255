use crate::error::{Error, Result};

use super::autocorr::AutocorrTime;
use super::histogram::{percentile, Histogram};

/// Number of bins of the amplitude histogram used for the density at the
/// upper limit.
pub const UL_HISTOGRAM_BINS: usize = 100;

/// Default upper-limit percentile.
pub const DEFAULT_UL_PERCENTILE: f64 = 95.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpperLimit {
    /// Amplitude upper limit, `10^percentile(log10 A, q)`.
    pub value: f64,
    /// One-sigma uncertainty on `value`.
    pub error: f64,
}

/// Upper limit on an amplitude from `log10 A` samples and its uncertainty.
///
/// The uncertainty is the standard error of a sample quantile,
/// `sqrt(p (1 - p) / n_eff) / pdf(A_ul)`, with `n_eff = N / tau` and the
/// density read off a 100-bin histogram of `10^chain`. The density vanishes
/// at the largest sample, so `q = 100` fails with [`Error::Numeric`].
pub fn ul<A: AutocorrTime + ?Sized>(chain: &[f64], q: f64, acor: &A) -> Result<UpperLimit> {
    if chain.is_empty() {
        return Err(Error::EmptyData("upper limit needs at least one sample".into()));
    }

    let amplitudes: Vec<f64> = chain.iter().map(|&x| 10f64.powf(x)).collect();
    let hist = Histogram::new(&amplitudes, UL_HISTOGRAM_BINS)?;

    let value = 10f64.powf(percentile(chain, q)?);
    let density = hist.pdf(value);
    if !(density > 0.0) {
        return Err(Error::Numeric(format!(
            "histogram density at the {q}th percentile ({value:.4e}) is zero"
        )));
    }

    let tau = acor.integrated_time(chain);
    let n_eff = chain.len() as f64 / tau;
    let p = q / 100.0;
    let error = (p * (1.0 - p) / n_eff).sqrt() / density;

    log::debug!(
        "ul: q = {q}, A_ul = {value:.4e}, pdf = {density:.4e}, tau = {tau:.2}, n_eff = {n_eff:.1}"
    );

    Ok(UpperLimit { value, error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn unit_tau(_: &[f64]) -> f64 {
        1.0
    }

    #[test]
    fn test_constant_chain_gives_exact_limit() {
        let chain = vec![-14.5; 1000];
        for q in [50.0, 90.0, 95.0, 99.0] {
            let res = ul(&chain, q, &unit_tau).unwrap();
            assert_eq!(res.value, 10f64.powf(-14.5));
            assert!(res.error.is_finite());
        }
    }

    #[test]
    fn test_uniform_log_amplitude() {
        // log10 A ~ U(-18, -14): A_ul at q = 95 is 10^-14.2.
        let mut rng = StdRng::seed_from_u64(3);
        let chain: Vec<f64> = (0..50_000).map(|_| rng.random_range(-18.0..-14.0)).collect();
        let res = ul(&chain, 95.0, &unit_tau).unwrap();
        let expected = 10f64.powf(-14.2);
        assert!((res.value - expected).abs() / expected < 0.02, "A_ul = {:e}", res.value);
        assert!(res.error > 0.0 && res.error < res.value);
    }

    #[test]
    fn test_error_scales_with_tau() {
        let mut rng = StdRng::seed_from_u64(5);
        let chain: Vec<f64> = (0..10_000).map(|_| rng.random_range(-16.0..-14.0)).collect();
        let one = ul(&chain, 95.0, &unit_tau).unwrap();
        let four = ul(&chain, 95.0, &|_: &[f64]| 4.0).unwrap();
        assert_eq!(one.value, four.value);
        assert!((four.error / one.error - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_percentile_at_sample_edges() {
        let chain: Vec<f64> = (0..200).map(|i| -16.0 + i as f64 * 0.01).collect();
        let low = ul(&chain, 0.0, &unit_tau).unwrap();
        assert_eq!(low.value, 10f64.powf(-16.0));
        assert!(low.error.is_finite());
        assert!(matches!(ul(&chain, 100.0, &unit_tau), Err(Error::Numeric(_))));
    }

    #[test]
    fn test_empty_chain_is_an_error() {
        assert!(matches!(ul(&[], 95.0, &unit_tau), Err(Error::EmptyData(_))));
    }
}
