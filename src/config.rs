//! Analysis settings read from a TOML file.
//!
//! Lookup order: the path in `PTA_PANDA_CONFIG`, then `pta-panda.toml` in
//! the working directory; with neither present the defaults apply. Every
//! section and key is optional.
//!
//! ```toml
//! [chain]
//! burn_fraction = 0.25
//!
//! [histogram]
//! bins = 50
//! density = true
//!
//! [upper_limit]
//! percentile = 95.0
//!
//! [bayes_factor]
//! ntol = 200
//! log_a_min = -18.0
//! log_a_max = -14.0
//!
//! [odds_ratio]
//! models = [0, 1]
//! uncertainty = true
//! thin = false
//!
//! [bic]
//! nobs = 1000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::chain::DEFAULT_BURN_FRACTION;
use crate::postprocess::HistOptions;
use crate::stats::{BayesFactorOptions, OddsRatioOptions, DEFAULT_UL_PERCENTILE};

pub const CONFIG_ENV_VAR: &str = "PTA_PANDA_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "pta-panda.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub chain: ChainSettings,
    #[serde(default)]
    pub histogram: HistogramSettings,
    #[serde(default)]
    pub upper_limit: UpperLimitSettings,
    #[serde(default)]
    pub bayes_factor: BayesFactorSettings,
    #[serde(default)]
    pub odds_ratio: OddsRatioSettings,
    #[serde(default)]
    pub bic: BicSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSettings {
    #[serde(default = "default_burn_fraction")]
    pub burn_fraction: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSettings {
    #[serde(default = "default_bins")]
    pub bins: usize,
    #[serde(default = "default_true")]
    pub density: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpperLimitSettings {
    #[serde(default = "default_percentile")]
    pub percentile: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BayesFactorSettings {
    #[serde(default = "default_ntol")]
    pub ntol: usize,
    #[serde(default = "default_log_a_min")]
    pub log_a_min: f64,
    #[serde(default = "default_log_a_max")]
    pub log_a_max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsRatioSettings {
    #[serde(default = "default_models")]
    pub models: [i64; 2],
    #[serde(default = "default_true")]
    pub uncertainty: bool,
    #[serde(default)]
    pub thin: bool,
}

/// `nobs = None` hides the BIC until the observation count is known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BicSettings {
    #[serde(default)]
    pub nobs: Option<usize>,
}

fn default_burn_fraction() -> f64 {
    DEFAULT_BURN_FRACTION
}

fn default_bins() -> usize {
    HistOptions::default().bins
}

fn default_true() -> bool {
    true
}

fn default_percentile() -> f64 {
    DEFAULT_UL_PERCENTILE
}

fn default_ntol() -> usize {
    BayesFactorOptions::default().ntol
}

fn default_log_a_min() -> f64 {
    BayesFactorOptions::default().log_a_min
}

fn default_log_a_max() -> f64 {
    BayesFactorOptions::default().log_a_max
}

fn default_models() -> [i64; 2] {
    let (a, b) = OddsRatioOptions::default().models;
    [a, b]
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            burn_fraction: default_burn_fraction(),
        }
    }
}

impl Default for HistogramSettings {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            density: true,
        }
    }
}

impl Default for UpperLimitSettings {
    fn default() -> Self {
        Self {
            percentile: default_percentile(),
        }
    }
}

impl Default for BayesFactorSettings {
    fn default() -> Self {
        Self {
            ntol: default_ntol(),
            log_a_min: default_log_a_min(),
            log_a_max: default_log_a_max(),
        }
    }
}

impl Default for OddsRatioSettings {
    fn default() -> Self {
        Self {
            models: default_models(),
            uncertainty: true,
            thin: false,
        }
    }
}

impl AnalysisConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Config from `PTA_PANDA_CONFIG` or `./pta-panda.toml`, else defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| {
                let local = PathBuf::from(DEFAULT_CONFIG_FILE);
                local.is_file().then_some(local)
            });

        match path {
            Some(path) => {
                log::info!("Reading analysis config from {}", path.display());
                Self::from_file(path)
            }
            None => {
                log::debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn hist_options(&self) -> HistOptions {
        HistOptions {
            bins: self.histogram.bins,
            density: self.histogram.density,
            ..Default::default()
        }
    }

    pub fn bayes_factor_options(&self) -> BayesFactorOptions {
        BayesFactorOptions {
            ntol: self.bayes_factor.ntol,
            log_a_min: self.bayes_factor.log_a_min,
            log_a_max: self.bayes_factor.log_a_max,
        }
    }

    pub fn odds_ratio_options(&self) -> OddsRatioOptions {
        OddsRatioOptions {
            models: (self.odds_ratio.models[0], self.odds_ratio.models[1]),
            uncertainty: self.odds_ratio.uncertainty,
            thin: self.odds_ratio.thin,
        }
    }
}
