use eframe::egui::Ui;

use crate::state::{AppState, ViewMode};

// ---------------------------------------------------------------------------
// Chain plots (central panel)
// ---------------------------------------------------------------------------

/// Render the trace or histogram grid of the burned-in chain.
pub fn chain_plot(ui: &mut Ui, state: &AppState) {
    let post = match &state.post {
        Some(post) => post,
        None => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a chain to view traces  (File → Open…)");
            });
            return;
        }
    };

    if post.ndim() == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No parameters selected.");
        });
        return;
    }

    match state.view {
        ViewMode::Trace => post.plot_trace(ui, &Default::default()),
        ViewMode::Histogram => post.plot_hist(ui, &state.config.hist_options()),
    }
}
