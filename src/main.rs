use std::path::PathBuf;

use eframe::egui;
use pta_panda::app::PtaPandaApp;
use pta_panda::config::AnalysisConfig;
use pta_panda::data::loader::load_chain;

fn main() -> eframe::Result {
    env_logger::init();

    let config = AnalysisConfig::load().unwrap_or_else(|e| {
        log::error!("{e:#}; falling back to default settings");
        AnalysisConfig::default()
    });

    let mut app = PtaPandaApp::new(config);

    // Optional chain path on the command line.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        match load_chain(&path) {
            Ok(chain) => app.state.set_chain(chain),
            Err(e) => {
                log::error!("Failed to load {}: {e:#}", path.display());
                app.state.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "PTA Panda – Chain Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
