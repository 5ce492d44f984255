use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::param_color;
use crate::state::{AppState, StatsSummary, ViewMode};

// ---------------------------------------------------------------------------
// Left side panel – parameter selection
// ---------------------------------------------------------------------------

/// Render the left parameter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Parameters");
    ui.separator();

    let params = match &state.chain {
        Some(chain) => chain.params.clone(),
        None => {
            ui.label("No chain loaded.");
            return;
        }
    };

    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all();
        }
        if ui.small_button("None").clicked() {
            state.select_none();
        }
    });

    ScrollArea::vertical()
        .id_salt("param_list")
        .max_height(ui.available_height() * 0.5)
        .auto_shrink([false, true])
        .show(ui, |ui: &mut Ui| {
            for (idx, name) in params.iter().enumerate() {
                let mut checked = state.selected.contains(&idx);
                let text = RichText::new(name).color(param_color(idx));
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_param(idx);
                }
            }
        });

    ui.separator();
    estimator_panel(ui, state, &params);
}

// ---------------------------------------------------------------------------
// Estimators
// ---------------------------------------------------------------------------

fn estimator_panel(ui: &mut Ui, state: &mut AppState, params: &[String]) {
    ui.strong("Estimators");

    let amp_label = state
        .amplitude_param
        .and_then(|i| params.get(i).cloned())
        .unwrap_or_default();
    egui::ComboBox::from_id_salt("amplitude_param")
        .selected_text(&amp_label)
        .show_ui(ui, |ui: &mut Ui| {
            for (idx, name) in params.iter().enumerate() {
                if ui
                    .selectable_label(state.amplitude_param == Some(idx), name)
                    .clicked()
                {
                    state.amplitude_param = Some(idx);
                    state.stats = None;
                }
            }
        });

    let model_label = state
        .model_param
        .and_then(|i| params.get(i).cloned())
        .unwrap_or_else(|| "<no model index>".to_string());
    egui::ComboBox::from_id_salt("model_param")
        .selected_text(&model_label)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(state.model_param.is_none(), "<no model index>").clicked() {
                state.model_param = None;
                state.stats = None;
            }
            for (idx, name) in params.iter().enumerate() {
                if ui.selectable_label(state.model_param == Some(idx), name).clicked() {
                    state.model_param = Some(idx);
                    state.stats = None;
                }
            }
        });

    ui.horizontal(|ui: &mut Ui| {
        ui.label("UL percentile");
        ui.add(egui::DragValue::new(&mut state.config.upper_limit.percentile).range(0.0..=100.0));
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("BF ntol");
        ui.add(egui::DragValue::new(&mut state.config.bayes_factor.ntol));
    });

    if ui.button("Compute").clicked() {
        state.refresh_stats();
    }

    if let Some(stats) = &state.stats {
        ui.add_space(4.0);
        stats_table(ui, stats);
    }
}

/// Label / value rows shown in the estimator table.
pub fn stats_rows(stats: &StatsSummary) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    let p = &stats.amplitude_param;

    rows.push((
        format!("UL ({p})"),
        match &stats.upper_limit {
            Ok(ul) => format!("{:.3e} ± {:.2e}", ul.value, ul.error),
            Err(e) => e.to_string(),
        },
    ));
    rows.push((
        format!("Bayes factor ({p})"),
        match &stats.bayes_factor {
            Ok(bf) => format!("{:.3} ± {:.3}", bf.mean, bf.std),
            Err(e) => e.to_string(),
        },
    ));
    if let Some((name, odds)) = &stats.odds_ratio {
        rows.push((
            format!("Odds ratio ({name})"),
            match odds {
                Ok(o) => match o.sigma {
                    Some(sigma) => format!("{:.3} ± {:.3}", o.bf, sigma),
                    None => format!("{:.3}", o.bf),
                },
                Err(e) => e.to_string(),
            },
        ));
    }
    if let Some(bic) = &stats.bic {
        rows.push((
            "BIC / ln Z".to_string(),
            match bic {
                Ok(b) => format!("{:.2} / {:.2}", b.bic, b.log_evidence),
                Err(e) => e.to_string(),
            },
        ));
    }
    rows
}

fn stats_table(ui: &mut Ui, stats: &StatsSummary) {
    let rows = stats_rows(stats);
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("Estimator");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (label, value) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(label);
                    });
                    row.col(|ui| {
                        ui.label(value);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        ui.selectable_value(&mut state.view, ViewMode::Trace, "Trace");
        ui.selectable_value(&mut state.view, ViewMode::Histogram, "Histogram");

        ui.separator();

        let mut burn = state.config.chain.burn_fraction;
        let slider = egui::Slider::new(&mut burn, 0.0..=0.9).text("burn-in");
        if ui.add(slider).changed() {
            state.set_burn_fraction(burn);
        }

        if let (Some(chain), Some(post)) = (&state.chain, &state.post) {
            ui.separator();
            ui.label(format!(
                "{} samples, {} after burn-in",
                chain.nsamples(),
                post.chain().nsamples()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open MCMC chain")
        .add_filter("Supported files", &["txt", "dat", "csv", "json", "parquet", "pq"])
        .add_filter("Text", &["txt", "dat"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        match crate::data::loader::load_chain(&path) {
            Ok(chain) => {
                log::info!("Parameters: {:?}", chain.params);
                state.set_chain(chain);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::stats::{Bic, OddsRatio, UpperLimit};

    #[test]
    fn test_stats_rows_show_errors_inline() {
        let stats = StatsSummary {
            amplitude_param: "gw_log10_A".into(),
            upper_limit: Ok(UpperLimit {
                value: 1.5e-15,
                error: 2.0e-17,
            }),
            bayes_factor: Err(Error::EmptySelection("no bin".into())),
            odds_ratio: Some((
                "nmodel".into(),
                Ok(OddsRatio {
                    bf: 3.0,
                    sigma: None,
                }),
            )),
            bic: Some(Ok(Bic {
                bic: 10.0,
                log_evidence: -5.0,
            })),
        };
        let rows = stats_rows(&stats);
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].0, "UL (gw_log10_A)");
        assert!(rows[0].1.starts_with("1.500e-15"));
        assert!(rows[1].1.contains("empty selection"));
        assert_eq!(rows[2].1, "3.000");
        assert_eq!(rows[3].1, "10.00 / -5.00");
    }
}
