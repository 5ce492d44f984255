use nalgebra::DMatrix;

use crate::error::{Error, Result};

/// Trailing auxiliary columns of a sampler chain; the first of them holds
/// the log-likelihood.
pub const AUX_COLUMNS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bic {
    pub bic: f64,
    /// Crude evidence approximation, `-bic / 2`.
    pub log_evidence: f64,
}

/// Bayesian Information Criterion of a chain whose last four columns are
/// sampler metadata, given the number of observations in the data.
pub fn bic(chain: &DMatrix<f64>, nobs: usize) -> Result<f64> {
    bic_with_evidence(chain, nobs).map(|b| b.bic)
}

pub fn bic_with_evidence(chain: &DMatrix<f64>, nobs: usize) -> Result<Bic> {
    if chain.ncols() < AUX_COLUMNS {
        return Err(Error::shape("chain columns (parameters + aux)", AUX_COLUMNS, chain.ncols()));
    }
    if chain.nrows() == 0 {
        return Err(Error::EmptyData("BIC needs at least one sample".into()));
    }
    if nobs == 0 {
        return Err(Error::InvalidArgument("number of observations must be positive".into()));
    }

    let nparams = chain.ncols() - AUX_COLUMNS;
    let maxlnlike = chain.column(chain.ncols() - AUX_COLUMNS).max();
    let bic = (nobs as f64).ln() * nparams as f64 - 2.0 * maxlnlike;

    log::debug!("bic: {nparams} parameters, max lnL = {maxlnlike:.3}, nobs = {nobs}, bic = {bic:.3}");

    Ok(Bic {
        bic,
        log_evidence: -0.5 * bic,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// `rows` samples of `p` parameters plus aux columns, with the
    /// log-likelihood column peaking at `peak`.
    fn chain(rows: usize, p: usize, peak: f64) -> DMatrix<f64> {
        DMatrix::from_fn(rows, p + AUX_COLUMNS, |r, c| {
            if c == p {
                peak - r as f64
            } else {
                (r * 31 + c * 7) as f64 * 0.01
            }
        })
    }

    #[test]
    fn test_bic_formula() {
        let b = bic_with_evidence(&chain(50, 3, 120.0), 1000).unwrap();
        let expected = 1000f64.ln() * 3.0 - 240.0;
        assert!((b.bic - expected).abs() < 1e-9);
        assert!((b.log_evidence + 0.5 * expected).abs() < 1e-9);
    }

    #[test]
    fn test_bic_increases_with_nobs() {
        let c = chain(20, 2, -10.0);
        let values: Vec<f64> = [10, 100, 1000, 10_000].iter().map(|&n| bic(&c, n).unwrap()).collect();
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_bic_ignores_other_columns() {
        let mut a = chain(30, 2, 5.0);
        let b = a.clone();
        a[(7, 0)] = 1e6;
        a[(3, 5)] = -42.0;
        assert_eq!(bic(&a, 64).unwrap(), bic(&b, 64).unwrap());
    }

    #[test]
    fn test_bic_needs_aux_columns() {
        let c = DMatrix::<f64>::zeros(10, 3);
        assert!(matches!(bic(&c, 10), Err(Error::ShapeMismatch { .. })));
    }
}
