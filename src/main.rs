mod app;
mod color;
mod config;
mod data;
mod export;
mod source;
mod state;
mod ui;

use app::FaultViewerApp;
use config::AppConfig;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fault Viewer",
        options,
        Box::new(move |cc| Ok(Box::new(FaultViewerApp::new(&cc.egui_ctx, &config)))),
    )
}
