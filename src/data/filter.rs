use std::collections::BTreeSet;

use crate::error::{Error, Result};

use super::pulsar::{Pulsar, Selection, SECONDS_PER_DAY};

// ---------------------------------------------------------------------------
// Cadence thinning
// ---------------------------------------------------------------------------

/// Window and target cadence for [`cadence_filter`], all in days (MJD-like
/// units, i.e. TOA seconds / 86400). Leaving all three unset keeps every
/// observation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CadenceOptions {
    pub start_time: Option<f64>,
    pub end_time: Option<f64>,
    pub cadence: Option<f64>,
}

impl CadenceOptions {
    pub fn new(start_time: f64, end_time: f64, cadence: f64) -> Self {
        Self {
            start_time: Some(start_time),
            end_time: Some(end_time),
            cadence: Some(cadence),
        }
    }

    pub fn is_unset(&self) -> bool {
        self.start_time.is_none() && self.end_time.is_none() && self.cadence.is_none()
    }
}

/// Return the observations to keep when thinning `toas` (seconds) to a
/// coarser cadence inside `[start_time, end_time]`.
///
/// Everything before and after the window survives untouched. Inside it,
/// for each target `1, 1 + cadence, 1 + 2 cadence, ...` (days since the
/// window start, below the window span) the observation whose cumulative
/// spacing is closest to the target is kept.
pub fn cadence_mask(toas: &[f64], opts: &CadenceOptions) -> Result<Selection> {
    if opts.is_unset() {
        return Ok(Selection::Mask(vec![true; toas.len()]));
    }
    let (Some(start_time), Some(end_time), Some(cadence)) = (opts.start_time, opts.end_time, opts.cadence) else {
        return Err(Error::InvalidArgument(
            "cadence filtering needs start_time, end_time and cadence together".into(),
        ));
    };
    if !(cadence > 0.0) {
        return Err(Error::InvalidArgument(format!("cadence must be positive, got {cadence}")));
    }

    let days: Vec<f64> = toas.iter().map(|t| t / SECONDS_PER_DAY).collect();
    let start_idx = nearest_index(&days, start_time)?;
    let end_idx = nearest_index(&days, end_time)?;

    let window = days.get(start_idx..=end_idx).unwrap_or(&[]);
    if window.is_empty() {
        return Err(Error::EmptyData(format!(
            "cadence window [{start_time}, {end_time}] selects no observations"
        )));
    }

    let cumsum: Vec<f64> = window
        .windows(2)
        .scan(0.0, |acc, w| {
            *acc += w[1] - w[0];
            Some(*acc)
        })
        .collect();
    let (lo, hi) = window
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &t| (lo.min(t), hi.max(t)));
    let tspan = hi - lo;

    let mut keep: BTreeSet<usize> = (0..start_idx).collect();
    let mut target = 1.0;
    let mut k = 0usize;
    while target < tspan {
        keep.insert(nearest_index(&cumsum, target)? + start_idx);
        k += 1;
        target = 1.0 + k as f64 * cadence;
    }
    keep.extend(end_idx..toas.len());

    log::debug!(
        "cadence_mask: window [{start_idx}, {end_idx}] of {} TOAs, {k} cadence targets, {} kept",
        toas.len(),
        keep.len()
    );

    Ok(Selection::Indices(keep.into_iter().collect()))
}

/// Index of the value closest to `target` (first one on ties).
fn nearest_index(values: &[f64], target: f64) -> Result<usize> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i, (v - target).abs()))
        .reduce(|best, cur| if cur.1 < best.1 { cur } else { best })
        .map(|(i, _)| i)
        .ok_or_else(|| Error::EmptyData("nearest-index lookup on an empty array".into()))
}

// ---------------------------------------------------------------------------
// In-place filters
// ---------------------------------------------------------------------------

/// Thin a pulsar to a coarser cadence in place (see [`cadence_mask`]).
pub fn cadence_filter(psr: &mut Pulsar, opts: &CadenceOptions) -> Result<()> {
    let selection = cadence_mask(&psr.toas, opts)?;
    mask_filter(psr, &selection)
}

/// Keep only the selected observations of `psr`, dropping design-matrix
/// columns left without support, then restore time order.
pub fn mask_filter(psr: &mut Pulsar, selection: &Selection) -> Result<()> {
    let before = psr.len();
    *psr = psr.select(selection)?;
    psr.sort_data();
    log::debug!("{}: kept {} of {before} TOAs", psr.name, psr.len());
    Ok(())
}

// ---------------------------------------------------------------------------
// Array-wide helpers
// ---------------------------------------------------------------------------

/// Total time span (seconds) covered by a set of pulsars. Every pulsar must
/// hold at least one TOA.
pub fn get_tspan(psrs: &[Pulsar]) -> Result<f64> {
    if psrs.is_empty() {
        return Err(Error::EmptyData("no pulsars to span".into()));
    }
    let (lo, hi) = psrs.iter().try_fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), psr| {
        let (l, h) = psr
            .toa_range()
            .ok_or_else(|| Error::EmptyData(format!("pulsar {} has no TOAs", psr.name)))?;
        Ok::<_, Error>((lo.min(l), hi.max(h)))
    })?;
    Ok(hi - lo)
}
