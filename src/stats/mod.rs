/// Numerical routines over frequency grids and MCMC samples.
///
/// ```text
///   chain column (log10 A) ──► ul / bayes_fac
///   model-index column      ──► odds_ratio
///   full chain + aux cols   ──► bic
///                   ▲
///                   │ AutocorrTime (injected)
/// ```

pub mod autocorr;
pub mod bayes;
pub mod bic;
pub mod binning;
pub mod histogram;
pub mod upper_limit;

pub use autocorr::{AutocorrTime, IntegratedTime};
pub use bayes::{bayes_fac, odds_ratio, BayesFactor, BayesFactorOptions, OddsRatio, OddsRatioOptions};
pub use bic::{bic, bic_with_evidence, Bic, AUX_COLUMNS};
pub use binning::{lin_binning, FrequencyBins};
pub use histogram::{percentile, Histogram};
pub use upper_limit::{ul, UpperLimit, DEFAULT_UL_PERCENTILE};
