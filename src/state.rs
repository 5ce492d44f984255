use std::collections::BTreeSet;

use crate::config::AnalysisConfig;
use crate::data::chain::Chain;
use crate::error::Result;
use crate::postprocess::PostProcessing;
use crate::stats::{
    bayes_fac, bic_with_evidence, odds_ratio, ul, BayesFactor, Bic, IntegratedTime, OddsRatio, UpperLimit,
};

// ---------------------------------------------------------------------------
// Estimator summary
// ---------------------------------------------------------------------------

/// Estimator results for the chosen amplitude / model-index parameters.
/// Each entry keeps its own error so one failure does not hide the rest.
#[derive(Debug, Clone)]
pub struct StatsSummary {
    pub amplitude_param: String,
    pub upper_limit: Result<UpperLimit>,
    pub bayes_factor: Result<BayesFactor>,
    pub odds_ratio: Option<(String, Result<OddsRatio>)>,
    pub bic: Option<Result<Bic>>,
}

/// Evaluate the estimators on an already burned-in chain.
pub fn compute_stats(
    chain: &Chain,
    amplitude_idx: usize,
    model_idx: Option<usize>,
    config: &AnalysisConfig,
) -> Result<StatsSummary> {
    let acor = IntegratedTime::default();
    let log10_a = chain.column(amplitude_idx)?;
    let amplitude_param = chain
        .params
        .get(amplitude_idx)
        .cloned()
        .unwrap_or_else(|| format!("column {amplitude_idx}"));

    let odds = match model_idx {
        Some(idx) => {
            let nmodel = chain.column(idx)?;
            let name = chain.params.get(idx).cloned().unwrap_or_else(|| format!("column {idx}"));
            let mut rng = rand::rng();
            Some((name, odds_ratio(&nmodel, &config.odds_ratio_options(), &acor, &mut rng)))
        }
        None => None,
    };

    Ok(StatsSummary {
        amplitude_param,
        upper_limit: ul(&log10_a, config.upper_limit.percentile, &acor),
        bayes_factor: bayes_fac(&log10_a, &config.bayes_factor_options()),
        odds_ratio: odds,
        bic: config.bic.nobs.map(|nobs| bic_with_evidence(&chain.samples, nobs)),
    })
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Trace,
    Histogram,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AnalysisConfig,

    /// Loaded chain before burn-in (None until user loads a file).
    pub chain: Option<Chain>,

    /// Burned-in chain restricted to the selected parameters.
    pub post: Option<PostProcessing>,

    /// Parameter indices shown in the plot grid.
    pub selected: BTreeSet<usize>,

    pub view: ViewMode,

    /// Parameter holding `log10 A` for the upper limit and Bayes factor.
    pub amplitude_param: Option<usize>,

    /// Parameter holding the model index for the odds ratio.
    pub model_param: Option<usize>,

    pub stats: Option<StatsSummary>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config,
            chain: None,
            post: None,
            selected: BTreeSet::new(),
            view: ViewMode::Trace,
            amplitude_param: None,
            model_param: None,
            stats: None,
            status_message: None,
        }
    }

    /// Ingest a newly loaded chain: select every parameter, guess the
    /// amplitude and model-index columns by name.
    pub fn set_chain(&mut self, chain: Chain) {
        self.selected = (0..chain.params.len()).collect();
        self.amplitude_param = chain
            .params
            .iter()
            .position(|p| p.ends_with("log10_A"))
            .or_else(|| (!chain.params.is_empty()).then_some(0));
        self.model_param = chain.params.iter().position(|p| p == "nmodel");
        self.chain = Some(chain);
        self.stats = None;
        self.status_message = None;
        self.rebuild();
    }

    /// Recompute the burned-in view after a selection or burn-in change.
    pub fn rebuild(&mut self) {
        let Some(chain) = &self.chain else {
            self.post = None;
            return;
        };

        let cols: Vec<usize> = self.selected.iter().copied().collect();
        let samples = chain.samples.select_columns(cols.iter());
        let names = cols.iter().map(|&i| chain.params[i].clone()).collect();
        let post = PostProcessing::new(samples, names, self.config.chain.burn_fraction)
            .and_then(|post| post.with_color_keys(cols));
        match post {
            Ok(post) => self.post = Some(post),
            Err(e) => {
                log::error!("Failed to prepare chain: {e}");
                self.status_message = Some(format!("Error: {e}"));
                self.post = None;
            }
        }
    }

    pub fn toggle_param(&mut self, idx: usize) {
        if !self.selected.remove(&idx) {
            self.selected.insert(idx);
        }
        self.rebuild();
    }

    pub fn select_all(&mut self) {
        if let Some(chain) = &self.chain {
            self.selected = (0..chain.params.len()).collect();
            self.rebuild();
        }
    }

    pub fn select_none(&mut self) {
        self.selected.clear();
        self.rebuild();
    }

    pub fn set_burn_fraction(&mut self, fraction: f64) {
        self.config.chain.burn_fraction = fraction;
        self.stats = None;
        self.rebuild();
    }

    /// Run the estimators on the full burned-in chain.
    pub fn refresh_stats(&mut self) {
        let (Some(chain), Some(amp)) = (&self.chain, self.amplitude_param) else {
            return;
        };
        let result = chain
            .burn(self.config.chain.burn_fraction)
            .and_then(|burned| compute_stats(&burned, amp, self.model_param, &self.config));
        match result {
            Ok(stats) => {
                log::info!("Computed estimators for {}", stats.amplitude_param);
                self.stats = Some(stats);
            }
            Err(e) => {
                log::error!("Failed to compute estimators: {e}");
                self.status_message = Some(format!("Error: {e}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::DMatrix;

    fn chain() -> Chain {
        // gw_log10_A uniform in [-18, -14], nmodel alternating, 4 aux columns.
        let n = 4000;
        let samples = DMatrix::from_fn(n, 6, |r, c| match c {
            0 => -18.0 + 4.0 * ((r * 7919) % n) as f64 / n as f64,
            1 => (r / 10 % 2) as f64,
            2 => -100.0 + (r % 13) as f64,
            _ => 0.0,
        });
        Chain::new(samples, vec!["gw_log10_A".into(), "nmodel".into()]).unwrap()
    }

    #[test]
    fn test_set_chain_guesses_columns() {
        let mut state = AppState::new(AnalysisConfig::default());
        state.set_chain(chain());
        assert_eq!(state.amplitude_param, Some(0));
        assert_eq!(state.model_param, Some(1));
        assert_eq!(state.post.as_ref().unwrap().ndim(), 2);
        assert_eq!(state.post.as_ref().unwrap().chain().nsamples(), 3000);
    }

    #[test]
    fn test_selection_rebuilds_view() {
        let mut state = AppState::new(AnalysisConfig::default());
        state.set_chain(chain());
        state.toggle_param(0);
        assert_eq!(state.post.as_ref().unwrap().pars().to_vec(), vec!["nmodel".to_string()]);
        // The remaining trace keeps the colour of its side-panel label.
        assert_eq!(state.post.as_ref().unwrap().color(0), crate::color::param_color(1));
        state.select_none();
        assert_eq!(state.post.as_ref().unwrap().ndim(), 0);
        state.select_all();
        assert_eq!(state.post.as_ref().unwrap().ndim(), 2);
    }

    #[test]
    fn test_refresh_stats() {
        let mut config = AnalysisConfig::default();
        config.bic.nobs = Some(500);
        let mut state = AppState::new(config);
        state.set_chain(chain());
        state.refresh_stats();

        let stats = state.stats.as_ref().unwrap();
        assert_eq!(stats.amplitude_param, "gw_log10_A");
        // ~10 samples per 0.01 in log10 A never reach the 200-sample tolerance.
        assert!(matches!(stats.bayes_factor, Err(crate::Error::EmptySelection(_))));
        let ul = stats.upper_limit.as_ref().unwrap();
        assert!(ul.value > 1e-15 && ul.value < 1e-14);
        let (name, odds) = stats.odds_ratio.as_ref().unwrap();
        assert_eq!(name, "nmodel");
        assert!((odds.as_ref().unwrap().bf - 1.0).abs() < 0.05);
        let bic = stats.bic.as_ref().unwrap().as_ref().unwrap();
        assert!((bic.bic - (500f64.ln() * 2.0 + 2.0 * 88.0)).abs() < 1e-9);
    }
}
