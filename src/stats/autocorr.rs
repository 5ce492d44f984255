//! Integrated autocorrelation time of a 1D chain.
//!
//! The estimators that need an effective sample size take the estimator as
//! an [`AutocorrTime`] value, so callers can plug in their own (or a
//! deterministic closure in tests). [`IntegratedTime`] is the default:
//! normalised ACF, cumulative `tau = 1 + 2 sum rho(k)`, truncated with
//! Sokal's automatic window (first lag `M` with `M >= c * tau(M)`).

/// Anything that turns a sample sequence into an integrated
/// autocorrelation time.
pub trait AutocorrTime {
    fn integrated_time(&self, samples: &[f64]) -> f64;
}

impl<F> AutocorrTime for F
where
    F: Fn(&[f64]) -> f64,
{
    fn integrated_time(&self, samples: &[f64]) -> f64 {
        self(samples)
    }
}

/// Default window constant.
pub const DEFAULT_WINDOW_C: f64 = 5.0;

/// Chains shorter than this many autocorrelation times give unreliable
/// estimates.
const RELIABLE_TAU_MULTIPLE: f64 = 50.0;

/// Sokal-windowed integrated autocorrelation time.
#[derive(Debug, Clone, Copy)]
pub struct IntegratedTime {
    pub window_c: f64,
}

impl Default for IntegratedTime {
    fn default() -> Self {
        Self {
            window_c: DEFAULT_WINDOW_C,
        }
    }
}

impl AutocorrTime for IntegratedTime {
    fn integrated_time(&self, samples: &[f64]) -> f64 {
        let n = samples.len();
        if n < 2 {
            return 1.0;
        }

        let mean = samples.iter().sum::<f64>() / n as f64;
        let centered: Vec<f64> = samples.iter().map(|x| x - mean).collect();
        let c0 = autocovariance(&centered, 0);
        if c0 < 1e-300 {
            log::warn!("integrated_time: chain of {n} samples has zero variance, using tau = 1");
            return 1.0;
        }

        let mut rho_sum = 0.0;
        let mut tau = 1.0;
        for lag in 1..n {
            rho_sum += autocovariance(&centered, lag) / c0;
            tau = 1.0 + 2.0 * rho_sum;
            if (lag as f64) >= self.window_c * tau {
                break;
            }
        }

        if (n as f64) < RELIABLE_TAU_MULTIPLE * tau {
            log::warn!(
                "integrated_time: chain of {n} samples is shorter than {RELIABLE_TAU_MULTIPLE} * tau (tau = {tau:.1})"
            );
        }
        tau
    }
}

/// Biased (1/n) autocovariance of an already centred series.
fn autocovariance(centered: &[f64], lag: usize) -> f64 {
    let n = centered.len();
    if lag >= n {
        return 0.0;
    }
    centered
        .iter()
        .take(n - lag)
        .zip(centered.iter().skip(lag))
        .map(|(a, b)| a * b)
        .sum::<f64>()
        / n as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use rand_distr::StandardNormal;

    #[test]
    fn test_white_noise_tau_near_one() {
        let mut rng = StdRng::seed_from_u64(7);
        let xs: Vec<f64> = (0..20_000).map(|_| rng.sample(StandardNormal)).collect();
        let tau = IntegratedTime::default().integrated_time(&xs);
        assert!((tau - 1.0).abs() < 0.3, "tau = {tau}");
    }

    #[test]
    fn test_ar1_tau_matches_theory() {
        // AR(1) with coefficient phi has tau = (1 + phi) / (1 - phi).
        let phi: f64 = 0.8;
        let mut rng = StdRng::seed_from_u64(11);
        let mut x = 0.0;
        let xs: Vec<f64> = (0..100_000)
            .map(|_| {
                let e: f64 = rng.sample(StandardNormal);
                x = phi * x + e;
                x
            })
            .collect();
        let tau = IntegratedTime::default().integrated_time(&xs);
        let expected = (1.0 + phi) / (1.0 - phi);
        assert!((tau - expected).abs() / expected < 0.2, "tau = {tau}, expected {expected}");
    }

    #[test]
    fn test_constant_chain_falls_back_to_one() {
        let xs = vec![3.0; 500];
        assert_eq!(IntegratedTime::default().integrated_time(&xs), 1.0);
    }

    #[test]
    fn test_closure_is_an_estimator() {
        let stub = |_: &[f64]| 4.0;
        assert_eq!(stub.integrated_time(&[1.0, 2.0]), 4.0);
    }
}
