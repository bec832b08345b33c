use eframe::egui;

use crate::config::AppConfig;
use crate::source::{DataSource, Poller};
use crate::state::AppState;
use crate::ui::{panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct FaultViewerApp {
    pub state: AppState,
    /// `None` when the data source could not be set up.
    poller: Option<Poller>,
}

impl FaultViewerApp {
    /// Build the app and start polling the fault sheet.
    pub fn new(ctx: &egui::Context, config: &AppConfig) -> Self {
        let mut state = AppState::new(config.date_granularity);

        let poller = match DataSource::from_config(config) {
            Ok(source) => {
                let repaint = ctx.clone();
                Some(Poller::start(source, config.poll_interval(), move || {
                    repaint.request_repaint()
                }))
            }
            Err(e) => {
                log::error!("Cannot set up data source: {e}");
                state.alert = Some(format!("Failed to fetch data: {e}"));
                None
            }
        };

        Self { state, poller }
    }

    fn drain_fetches(&mut self) {
        let Some(poller) = &self.poller else {
            return;
        };
        while let Some(outcome) = poller.try_recv() {
            self.state.apply_outcome(outcome);
        }
    }
}

impl eframe::App for FaultViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_fetches();

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            if panels::top_bar(ui, &mut self.state) {
                let sent = self.poller.as_ref().is_some_and(Poller::refresh);
                if !sent {
                    self.state.refresh_unavailable();
                }
            }
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: fault table ----
        egui::CentralPanel::default().show(ctx, |ui| {
            table::fault_table(ui, &mut self.state);
        });

        panels::record_window(ctx, &mut self.state);
        panels::alert_window(ctx, &mut self.state);
    }
}
