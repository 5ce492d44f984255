use std::collections::BTreeMap;

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Seconds per day; cadence windows are given in days.
pub const SECONDS_PER_DAY: f64 = 86400.0;

// ---------------------------------------------------------------------------
// Selection – which observations to keep
// ---------------------------------------------------------------------------

/// Observation selector, either a boolean mask over all TOAs or an explicit
/// list of indices (order and repetition are honoured).
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Mask(Vec<bool>),
    Indices(Vec<usize>),
}

impl Selection {
    /// Resolve to concrete indices into a dataset of `n` observations.
    pub fn resolve(&self, n: usize) -> Result<Vec<usize>> {
        match self {
            Selection::Mask(mask) => {
                if mask.len() != n {
                    return Err(Error::shape("boolean mask length", n, mask.len()));
                }
                Ok(mask
                    .iter()
                    .enumerate()
                    .filter(|(_, &keep)| keep)
                    .map(|(i, _)| i)
                    .collect())
            }
            Selection::Indices(idx) => {
                if let Some(&bad) = idx.iter().find(|&&i| i >= n) {
                    return Err(Error::IndexOutOfRange { index: bad, len: n });
                }
                Ok(idx.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pulsar – one pulsar's timing dataset
// ---------------------------------------------------------------------------

/// A pulsar timing dataset. Every per-observation field has one entry per
/// TOA; [`Pulsar::select`] and [`Pulsar::sort_data`] keep them in lockstep.
#[derive(Debug, Clone, PartialEq)]
pub struct Pulsar {
    pub name: String,
    /// Times of arrival (seconds).
    pub toas: Vec<f64>,
    /// TOA uncertainties (seconds).
    pub toaerrs: Vec<f64>,
    /// Timing residuals (seconds).
    pub residuals: Vec<f64>,
    /// Barycentric observing frequencies (Hz).
    pub ssbfreqs: Vec<f64>,
    /// Timing-model design matrix, observations × basis functions.
    pub designmatrix: DMatrix<f64>,
    /// Flag name → per-observation value.
    pub flags: BTreeMap<String, Vec<String>>,
    /// Optional planet positions at each TOA (planets × 6 per observation).
    pub planetssb: Option<Vec<DMatrix<f64>>>,
}

impl Pulsar {
    pub fn len(&self) -> usize {
        self.toas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toas.is_empty()
    }

    /// Check that every per-observation field has the same length.
    pub fn validate(&self) -> Result<()> {
        let n = self.len();
        let check = |what: &str, len: usize| {
            if len == n {
                Ok(())
            } else {
                Err(Error::shape(format!("{} of pulsar {}", what, self.name), n, len))
            }
        };
        check("toaerrs", self.toaerrs.len())?;
        check("residuals", self.residuals.len())?;
        check("ssbfreqs", self.ssbfreqs.len())?;
        check("design matrix rows", self.designmatrix.nrows())?;
        for (flag, values) in &self.flags {
            check(&format!("flag '{flag}'"), values.len())?;
        }
        if let Some(planets) = &self.planetssb {
            check("planetssb", planets.len())?;
        }
        Ok(())
    }

    /// Earliest and latest TOA, or `None` for an empty dataset.
    pub fn toa_range(&self) -> Option<(f64, f64)> {
        if self.toas.is_empty() {
            return None;
        }
        Some(
            self.toas
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t))),
        )
    }

    /// New dataset holding only the selected observations.
    ///
    /// Design-matrix columns left entirely zero by the row selection are
    /// dropped, since their basis function has no remaining support.
    pub fn select(&self, selection: &Selection) -> Result<Pulsar> {
        self.validate()?;
        let idx = selection.resolve(self.len())?;

        let rows = self.designmatrix.select_rows(idx.iter());
        let live_cols: Vec<usize> = (0..rows.ncols())
            .filter(|&c| rows.column(c).iter().any(|&v| v != 0.0))
            .collect();
        if live_cols.len() < rows.ncols() {
            log::debug!(
                "{}: dropping {} all-zero design matrix columns",
                self.name,
                rows.ncols() - live_cols.len()
            );
        }
        let designmatrix = rows.select_columns(live_cols.iter());

        Ok(Pulsar {
            name: self.name.clone(),
            toas: take(&self.toas, &idx),
            toaerrs: take(&self.toaerrs, &idx),
            residuals: take(&self.residuals, &idx),
            ssbfreqs: take(&self.ssbfreqs, &idx),
            designmatrix,
            flags: self
                .flags
                .iter()
                .map(|(k, v)| (k.clone(), take(v, &idx)))
                .collect(),
            planetssb: self.planetssb.as_ref().map(|p| take(p, &idx)),
        })
    }

    /// Reorder every per-observation field by ascending TOA. The sort is
    /// stable, so equal TOAs keep their relative order.
    pub fn sort_data(&mut self) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.toas[a].total_cmp(&self.toas[b]));
        if order.iter().enumerate().all(|(i, &j)| i == j) {
            return;
        }

        self.toas = take(&self.toas, &order);
        self.toaerrs = take(&self.toaerrs, &order);
        self.residuals = take(&self.residuals, &order);
        self.ssbfreqs = take(&self.ssbfreqs, &order);
        self.designmatrix = self.designmatrix.select_rows(order.iter());
        for values in self.flags.values_mut() {
            *values = take(values, &order);
        }
        if let Some(planets) = &mut self.planetssb {
            *planets = take(planets, &order);
        }
    }
}

fn take<T: Clone>(values: &[T], idx: &[usize]) -> Vec<T> {
    idx.iter().map(|&i| values[i].clone()).collect()
}

// ---------------------------------------------------------------------------
// On-disk record
// ---------------------------------------------------------------------------

/// JSON form of a [`Pulsar`]: matrices are stored as nested row arrays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulsarRecord {
    pub name: String,
    pub toas: Vec<f64>,
    pub toaerrs: Vec<f64>,
    pub residuals: Vec<f64>,
    #[serde(alias = "freqs")]
    pub ssbfreqs: Vec<f64>,
    pub designmatrix: Vec<Vec<f64>>,
    #[serde(default)]
    pub flags: BTreeMap<String, Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planetssb: Option<Vec<Vec<Vec<f64>>>>,
}

impl TryFrom<PulsarRecord> for Pulsar {
    type Error = Error;

    fn try_from(rec: PulsarRecord) -> Result<Self> {
        let designmatrix = rows_to_matrix(&rec.designmatrix, rec.toas.len(), "design matrix")?;
        let planetssb = rec
            .planetssb
            .map(|per_toa| {
                per_toa
                    .iter()
                    .map(|planets| rows_to_matrix(planets, planets.len(), "planetssb"))
                    .collect::<Result<Vec<_>>>()
            })
            .transpose()?;

        let psr = Pulsar {
            name: rec.name,
            toas: rec.toas,
            toaerrs: rec.toaerrs,
            residuals: rec.residuals,
            ssbfreqs: rec.ssbfreqs,
            designmatrix,
            flags: rec.flags,
            planetssb,
        };
        psr.validate()?;
        Ok(psr)
    }
}

impl From<&Pulsar> for PulsarRecord {
    fn from(psr: &Pulsar) -> Self {
        PulsarRecord {
            name: psr.name.clone(),
            toas: psr.toas.clone(),
            toaerrs: psr.toaerrs.clone(),
            residuals: psr.residuals.clone(),
            ssbfreqs: psr.ssbfreqs.clone(),
            designmatrix: matrix_to_rows(&psr.designmatrix),
            flags: psr.flags.clone(),
            planetssb: psr
                .planetssb
                .as_ref()
                .map(|p| p.iter().map(matrix_to_rows).collect()),
        }
    }
}

/// Build a matrix from row vectors. An empty row list gives `nrows × 0`.
fn rows_to_matrix(rows: &[Vec<f64>], nrows: usize, what: &str) -> Result<DMatrix<f64>> {
    if rows.len() != nrows {
        return Err(Error::shape(format!("{what} rows"), nrows, rows.len()));
    }
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(Error::shape(format!("{what} row length"), ncols, bad.len()));
    }
    Ok(DMatrix::from_fn(nrows, ncols, |r, c| rows[r][c]))
}

fn matrix_to_rows(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pulsar() -> Pulsar {
        Pulsar {
            name: "J0000+0000".into(),
            toas: vec![30.0, 10.0, 20.0, 40.0],
            toaerrs: vec![3.0, 1.0, 2.0, 4.0],
            residuals: vec![0.3, 0.1, 0.2, 0.4],
            ssbfreqs: vec![1400.0, 800.0, 1400.0, 800.0],
            designmatrix: DMatrix::from_row_slice(4, 3, &[
                1.0, 30.0, 0.0, //
                1.0, 10.0, 1.0, //
                1.0, 20.0, 0.0, //
                1.0, 40.0, 0.0,
            ]),
            flags: BTreeMap::from([(
                "be".to_string(),
                vec!["c".into(), "a".into(), "b".into(), "d".into()],
            )]),
            planetssb: Some(
                (0..4)
                    .map(|i| DMatrix::from_element(9, 6, i as f64))
                    .collect(),
            ),
        }
    }

    #[test]
    fn test_sort_data_moves_all_fields() {
        let mut psr = pulsar();
        psr.sort_data();
        assert_eq!(psr.toas, vec![10.0, 20.0, 30.0, 40.0]);
        assert_eq!(psr.toaerrs, vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(psr.residuals, vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(psr.flags["be"], vec!["a", "b", "c", "d"]);
        assert_eq!(psr.designmatrix[(0, 1)], 10.0);
        assert_eq!(psr.designmatrix[(0, 2)], 1.0);
        let planets = psr.planetssb.unwrap();
        assert_eq!(planets[0][(0, 0)], 1.0);
        assert_eq!(planets[3][(8, 5)], 3.0);
    }

    #[test]
    fn test_select_drops_unsupported_columns() {
        let psr = pulsar();
        let out = psr.select(&Selection::Mask(vec![true, false, true, true])).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.designmatrix.shape(), (3, 2));
        assert_eq!(out.flags["be"], vec!["c", "b", "d"]);
        assert_eq!(out.planetssb.as_ref().map(Vec::len), Some(3));
        out.validate().unwrap();
    }

    #[test]
    fn test_select_checks_mask_and_indices() {
        let psr = pulsar();
        assert!(matches!(
            psr.select(&Selection::Mask(vec![true; 3])),
            Err(Error::ShapeMismatch { .. })
        ));
        assert!(matches!(
            psr.select(&Selection::Indices(vec![0, 4])),
            Err(Error::IndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_select_repeats_indices() {
        let out = pulsar().select(&Selection::Indices(vec![1, 1, 0])).unwrap();
        assert_eq!(out.toas, vec![10.0, 10.0, 30.0]);
        assert_eq!(out.designmatrix.nrows(), 3);
    }

    #[test]
    fn test_record_round_trip_preserves_shapes() {
        let psr = pulsar();
        let rec = PulsarRecord::from(&psr);
        assert_eq!(rec.designmatrix.len(), 4);
        assert_eq!(rec.designmatrix[1], vec![1.0, 10.0, 1.0]);
        let back = Pulsar::try_from(rec).unwrap();
        assert_eq!(back, psr);
    }

    #[test]
    fn test_record_rejects_ragged_arrays() {
        let mut rec = PulsarRecord::from(&pulsar());
        rec.residuals.pop();
        assert!(matches!(Pulsar::try_from(rec), Err(Error::ShapeMismatch { .. })));
    }
}
