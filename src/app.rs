use eframe::egui;

use crate::config::AnalysisConfig;
use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct PtaPandaApp {
    pub state: AppState,
}

impl PtaPandaApp {
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for PtaPandaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: parameters and estimators ----
        egui::SidePanel::left("param_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: trace / histogram grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::chain_plot(ui, &self.state);
        });
    }
}
