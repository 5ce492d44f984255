//! Model-comparison estimators on MCMC output: Savage–Dickey Bayes factors
//! for a log-amplitude parameter and product-space odds ratios from a
//! model-index chain.

use rand::Rng;

use crate::error::{Error, Result};

use super::autocorr::AutocorrTime;
use super::binning::linspace;

/// Number of candidate bin widths scanned by [`bayes_fac`].
const N_DELTAS: usize = 100;
const DELTA_MIN: f64 = 0.01;
const DELTA_MAX: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesFactorOptions {
    /// Minimum number of samples a bin needs to contribute.
    pub ntol: usize,
    /// Lower prior bound on `log10 A`; the density is evaluated here.
    pub log_a_min: f64,
    pub log_a_max: f64,
}

impl Default for BayesFactorOptions {
    fn default() -> Self {
        Self {
            ntol: 200,
            log_a_min: -18.0,
            log_a_max: -14.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BayesFactor {
    pub mean: f64,
    pub std: f64,
}

/// Savage–Dickey Bayes factor of the signal model against the null model
/// nested at `log_a_min`, under a uniform prior on `[log_a_min, log_a_max]`.
///
/// The posterior density at the prior edge is estimated from the fraction of
/// samples below `log_a_min + delta` for 100 widths in `[0.01, 0.1]`; only
/// widths holding more than `ntol` samples are averaged. Fails with
/// [`Error::EmptySelection`] when no width qualifies.
pub fn bayes_fac(samples: &[f64], opts: &BayesFactorOptions) -> Result<BayesFactor> {
    if samples.is_empty() {
        return Err(Error::EmptyData("Bayes factor needs at least one sample".into()));
    }
    if !(opts.log_a_max > opts.log_a_min) {
        return Err(Error::InvalidArgument(format!(
            "prior bounds must satisfy log_a_min < log_a_max, got [{}, {}]",
            opts.log_a_min, opts.log_a_max
        )));
    }

    let prior = 1.0 / (opts.log_a_max - opts.log_a_min);
    let total = samples.len() as f64;

    let mut kept = Vec::with_capacity(N_DELTAS);
    for delta in linspace(DELTA_MIN, DELTA_MAX, N_DELTAS) {
        let n = samples.iter().filter(|&&s| s <= opts.log_a_min + delta).count();
        if n <= opts.ntol {
            continue;
        }
        let post = n as f64 / total / delta;
        let bf = prior / post;
        log::trace!("bayes_fac: delta = {delta:.4}, n = {n}, bf = {bf:.3} +/- {:.3}", bf / (n as f64).sqrt());
        kept.push(bf);
    }

    if kept.is_empty() {
        return Err(Error::EmptySelection(format!(
            "no bin near log_a_min = {} holds more than {} samples",
            opts.log_a_min, opts.ntol
        )));
    }

    let mean = kept.iter().sum::<f64>() / kept.len() as f64;
    let var = kept.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / kept.len() as f64;
    log::debug!("bayes_fac: {} of {N_DELTAS} widths kept, bf = {mean:.3} +/- {:.3}", kept.len(), var.sqrt());

    Ok(BayesFactor {
        mean,
        std: var.sqrt(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRatioOptions {
    /// Model indices compared; the larger one is the numerator.
    pub models: (i64, i64),
    pub uncertainty: bool,
    /// Resample the chain down to its effective sample size first.
    pub thin: bool,
}

impl Default for OddsRatioOptions {
    fn default() -> Self {
        Self {
            models: (0, 1),
            uncertainty: true,
            thin: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsRatio {
    pub bf: f64,
    /// Present when the uncertainty was requested.
    pub sigma: Option<f64>,
}

/// Odds ratio between two models from a chain of (continuous) model-index
/// samples, each rounded to the nearest integer (halves to even).
///
/// If one model is never visited the ratio degrades to `top` or `1 / bot`.
/// The uncertainty counts transitions out of each model. A chain that
/// visits neither model fails with [`Error::DivisionByZero`].
pub fn odds_ratio<A, R>(chain: &[f64], opts: &OddsRatioOptions, acor: &A, rng: &mut R) -> Result<OddsRatio>
where
    A: AutocorrTime + ?Sized,
    R: Rng + ?Sized,
{
    let thinned;
    let samples: &[f64] = if opts.thin {
        let tau = acor.integrated_time(chain);
        // An empty chain or a non-finite tau rounds down to zero draws.
        let indep = (chain.len() as f64 / tau).round_ties_even() as usize;
        log::debug!("odds_ratio: thinning {} samples to {indep} (tau = {tau:.2})", chain.len());
        thinned = (0..indep)
            .map(|_| chain[rng.random_range(0..chain.len())])
            .collect::<Vec<_>>();
        &thinned
    } else {
        chain
    };

    let (lo, hi) = (opts.models.0.min(opts.models.1), opts.models.0.max(opts.models.1));
    let mask_top: Vec<bool> = samples.iter().map(|s| s.round_ties_even() == hi as f64).collect();
    let mask_bot: Vec<bool> = samples.iter().map(|s| s.round_ties_even() == lo as f64).collect();

    let top = mask_top.iter().filter(|&&m| m).count() as f64;
    let bot = mask_bot.iter().filter(|&&m| m).count() as f64;

    let bf = if top == 0.0 && bot != 0.0 {
        1.0 / bot
    } else if bot == 0.0 && top != 0.0 {
        top
    } else if bot == 0.0 {
        return Err(Error::DivisionByZero(format!(
            "chain never visits model {lo} or model {hi}"
        )));
    } else {
        top / bot
    };

    if !opts.uncertainty {
        return Ok(OddsRatio { bf, sigma: None });
    }

    if top == 0.0 || bot == 0.0 {
        return Ok(OddsRatio { bf, sigma: Some(0.0) });
    }

    let ct_tb = transitions_out(&mask_top) as f64;
    let ct_bt = transitions_out(&mask_bot) as f64;
    if ct_tb == 0.0 || ct_bt == 0.0 {
        log::warn!("odds_ratio: no transitions between models {lo} and {hi}, uncertainty set to 0");
        return Ok(OddsRatio { bf, sigma: Some(0.0) });
    }

    let radicand = (top - ct_tb) / (top * ct_tb) + (bot - ct_bt) / (bot * ct_bt);
    if !(radicand >= 0.0) || !radicand.is_finite() {
        return Err(Error::Numeric(format!("odds-ratio variance is {radicand}")));
    }

    Ok(OddsRatio {
        bf,
        sigma: Some(bf * radicand.sqrt()),
    })
}

/// Number of positions where the mask switches from `true` to `false`.
fn transitions_out(mask: &[bool]) -> usize {
    mask.windows(2).filter(|w| w[0] && !w[1]).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn unit_tau(_: &[f64]) -> f64 {
        1.0
    }

    fn no_uncertainty() -> OddsRatioOptions {
        OddsRatioOptions {
            uncertainty: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_odds_ratio_single_model_edges() {
        let mut rng = StdRng::seed_from_u64(0);

        let only_bot = [0.1, -0.2, 0.3, 0.0, 0.4];
        let res = odds_ratio(&only_bot, &no_uncertainty(), &unit_tau, &mut rng).unwrap();
        assert!((res.bf - 0.2).abs() < 1e-15);
        assert_eq!(res.sigma, None);

        let only_top = [0.9, 1.2, 1.0, 1.4, 0.6];
        let res = odds_ratio(&only_top, &no_uncertainty(), &unit_tau, &mut rng).unwrap();
        assert_eq!(res.bf, 5.0);

        let res = odds_ratio(&only_top, &OddsRatioOptions::default(), &unit_tau, &mut rng).unwrap();
        assert_eq!(res.sigma, Some(0.0));
    }

    #[test]
    fn test_odds_ratio_neither_model_visited() {
        let mut rng = StdRng::seed_from_u64(0);
        let chain = [3.0, 3.1, 2.9];
        assert!(matches!(
            odds_ratio(&chain, &no_uncertainty(), &unit_tau, &mut rng),
            Err(Error::DivisionByZero(_))
        ));
    }

    #[test]
    fn test_odds_ratio_with_transitions() {
        let mut rng = StdRng::seed_from_u64(0);
        // top: 6 samples, 2 transitions out; bot: 3 samples, 2 transitions out.
        let chain = [1.0, 1.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let res = odds_ratio(&chain, &OddsRatioOptions::default(), &unit_tau, &mut rng).unwrap();
        assert_eq!(res.bf, 2.0);
        let expected = 2.0 * ((6.0 - 2.0) / 12.0 + (3.0 - 2.0) / 6.0_f64).sqrt();
        assert!((res.sigma.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_odds_ratio_model_order_irrelevant() {
        let mut rng = StdRng::seed_from_u64(0);
        let chain = [1.0, 0.0, 1.0, 1.0];
        let a = odds_ratio(&chain, &no_uncertainty(), &unit_tau, &mut rng).unwrap();
        let opts = OddsRatioOptions {
            models: (1, 0),
            ..no_uncertainty()
        };
        let b = odds_ratio(&chain, &opts, &unit_tau, &mut rng).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_thinning_draws_effective_sample_count() {
        let mut rng = StdRng::seed_from_u64(9);
        let chain: Vec<f64> = (0..1000).map(|i| (i % 2) as f64).collect();
        let opts = OddsRatioOptions {
            thin: true,
            ..no_uncertainty()
        };
        // tau = 10 leaves 100 draws; the ratio stays near one.
        let res = odds_ratio(&chain, &opts, &|_: &[f64]| 10.0, &mut rng).unwrap();
        assert!(res.bf > 0.5 && res.bf < 2.0, "bf = {}", res.bf);
    }

    #[test]
    fn test_half_model_index_rounds_to_even() {
        let mut rng = StdRng::seed_from_u64(0);
        // 0.5 belongs to model 0 and 1.5 to model 2, never to model 1.
        let res = odds_ratio(&[0.5, 0.5, 0.5, 1.0], &no_uncertainty(), &unit_tau, &mut rng).unwrap();
        assert!((res.bf - 1.0 / 3.0).abs() < 1e-15, "bf = {}", res.bf);

        let res = odds_ratio(&[1.5, 1.0, 0.0, 0.0], &no_uncertainty(), &unit_tau, &mut rng).unwrap();
        assert_eq!(res.bf, 0.5);
    }

    #[test]
    fn test_thinning_count_rounds_half_to_even() {
        let mut rng = StdRng::seed_from_u64(1);
        // 1000 / 400 = 2.5 draws round to 2, all from model 1.
        let chain = vec![1.0; 1000];
        let opts = OddsRatioOptions {
            thin: true,
            ..no_uncertainty()
        };
        let res = odds_ratio(&chain, &opts, &|_: &[f64]| 400.0, &mut rng).unwrap();
        assert_eq!(res.bf, 2.0);

        // 7 / 2 = 3.5 draws round to 4.
        let res = odds_ratio(&chain[..7], &opts, &|_: &[f64]| 2.0, &mut rng).unwrap();
        assert_eq!(res.bf, 4.0);
    }

    #[test]
    fn test_bayes_fac_uniform_posterior_is_one() {
        // Posterior equal to the prior: density ratio of one at every width.
        let n = 100_000;
        let samples: Vec<f64> = (0..n).map(|i| -18.0 + 4.0 * (i as f64 + 0.5) / n as f64).collect();
        let res = bayes_fac(&samples, &BayesFactorOptions::default()).unwrap();
        assert!((res.mean - 1.0).abs() < 0.02, "bf = {}", res.mean);
        assert!(res.std < 0.05);
    }

    #[test]
    fn test_bayes_fac_without_support_fails() {
        let samples = vec![-15.0; 5000];
        assert!(matches!(
            bayes_fac(&samples, &BayesFactorOptions::default()),
            Err(Error::EmptySelection(_))
        ));
    }
}
