use nalgebra::DMatrix;

use crate::error::{Error, Result};
use crate::stats::AUX_COLUMNS;

/// Default fraction of draws discarded as burn-in.
pub const DEFAULT_BURN_FRACTION: f64 = 0.25;

/// MCMC samples, one row per draw. The leading columns are named model
/// parameters; sampler output usually appends [`AUX_COLUMNS`] metadata
/// columns (log-likelihood first).
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub samples: DMatrix<f64>,
    pub params: Vec<String>,
}

impl Chain {
    pub fn new(samples: DMatrix<f64>, params: Vec<String>) -> Result<Self> {
        if params.len() > samples.ncols() {
            return Err(Error::shape("parameter names", samples.ncols(), params.len()));
        }
        Ok(Self { samples, params })
    }

    /// Chain with placeholder names `p0, p1, ...` for every non-aux column.
    pub fn unnamed(samples: DMatrix<f64>) -> Self {
        let nparams = samples.ncols().saturating_sub(AUX_COLUMNS);
        let params = (0..nparams).map(|i| format!("p{i}")).collect();
        Self { samples, params }
    }

    pub fn nsamples(&self) -> usize {
        self.samples.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.samples.ncols()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p == name)
    }

    /// Copy of one column as a plain vector.
    pub fn column(&self, idx: usize) -> Result<Vec<f64>> {
        if idx >= self.ncols() {
            return Err(Error::IndexOutOfRange {
                index: idx,
                len: self.ncols(),
            });
        }
        Ok(self.samples.column(idx).iter().copied().collect())
    }

    pub fn param(&self, name: &str) -> Result<Vec<f64>> {
        let idx = self
            .param_index(name)
            .ok_or_else(|| Error::InvalidArgument(format!("no parameter named '{name}'")))?;
        self.column(idx)
    }

    /// Drop the first `floor(fraction * nsamples)` draws.
    pub fn burn(&self, fraction: f64) -> Result<Chain> {
        if !(0.0..1.0).contains(&fraction) {
            return Err(Error::InvalidArgument(format!(
                "burn fraction must be in [0, 1), got {fraction}"
            )));
        }
        let burn = (fraction * self.nsamples() as f64).floor() as usize;
        let kept = self.nsamples() - burn;
        log::debug!("burning {burn} of {} samples", self.nsamples());
        Ok(Chain {
            samples: self.samples.rows(burn, kept).into_owned(),
            params: self.params.clone(),
        })
    }
}
