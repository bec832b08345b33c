use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::DatePickerButton;

use crate::config::DateGranularity;
use crate::export::{self, ExportFormat};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Search / Filter");
    ui.separator();

    ui.strong("Route name");
    let mut route = state.criteria.route.clone();
    if ui
        .add(egui::TextEdit::singleline(&mut route).hint_text("Search by route name"))
        .changed()
    {
        state.set_route_text(route);
    }
    ui.add_space(6.0);

    ui.strong("Status");
    let mut status = state.criteria.status.clone();
    if ui
        .add(
            egui::TextEdit::singleline(&mut status)
                .hint_text("e.g. carried forward / restored"),
        )
        .changed()
    {
        state.set_status_text(status);
    }
    ui.add_space(6.0);

    date_filter(ui, state);

    ui.add_space(10.0);
    if ui
        .add_enabled(!state.criteria.is_empty(), egui::Button::new("Clear filters"))
        .clicked()
    {
        state.clear_filters();
    }
}

fn date_filter(ui: &mut Ui, state: &mut AppState) {
    let mut draft = state.date_draft;

    ui.checkbox(&mut draft.enabled, RichText::new("Fault date").strong());
    ui.add_enabled_ui(draft.enabled, |ui: &mut Ui| {
        ui.horizontal(|ui: &mut Ui| {
            ui.radio_value(&mut draft.granularity, DateGranularity::Day, "Day");
            ui.radio_value(&mut draft.granularity, DateGranularity::Minute, "Day + time");
        });
        ui.add(DatePickerButton::new(&mut draft.day));
        if draft.granularity == DateGranularity::Minute {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::DragValue::new(&mut draft.hour).range(0..=23));
                ui.label(":");
                ui.add(egui::DragValue::new(&mut draft.minute).range(0..=59));
            });
        }
    });

    if let Some(c) = draft.constraint() {
        ui.label(RichText::new(format!("Matching \"{}…\"", c.prefix())).weak());
    }

    if draft != state.date_draft {
        state.set_date_draft(draft);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns `true` when a refresh was requested.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) -> bool {
    let mut refresh = false;

    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Export", |ui: &mut Ui| {
            for format in [ExportFormat::Html, ExportFormat::Csv] {
                if ui
                    .add_enabled(
                        !state.filtered.is_empty(),
                        egui::Button::new(format!("Filtered faults as {}…", format.label())),
                    )
                    .clicked()
                {
                    export_dialog(state, format);
                    ui.close_menu();
                }
            }
        });

        if ui
            .add_enabled(!state.refreshing, egui::Button::new("⟳ Refresh"))
            .clicked()
        {
            state.begin_refresh();
            refresh = true;
        }
        if state.refreshing {
            ui.add(egui::Spinner::new());
        }

        ui.separator();

        if state.dataset.is_some() {
            ui.label(format!(
                "{} faults loaded, {} shown",
                state.total_records(),
                state.filtered.record_count()
            ));
        }
        if let Some(at) = state.last_updated {
            ui.label(RichText::new(format!("updated {}", at.format("%H:%M:%S"))).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg);
        }
    });

    refresh
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

/// Fetch failure alert, shown until dismissed.
pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alert.clone() else {
        return;
    };
    egui::Window::new("Error")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui: &mut Ui| {
            ui.label(RichText::new(message).color(Color32::RED));
            ui.add_space(6.0);
            if ui.button("OK").clicked() {
                state.dismiss_alert();
            }
        });
}

/// Field-by-field view of the selected fault record.
pub fn record_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(row) = state.selected_record() else {
        return;
    };
    let Some(dataset) = &state.dataset else {
        return;
    };

    let mut open = true;
    egui::Window::new("Fault record")
        .open(&mut open)
        .default_width(360.0)
        .show(ctx, |ui: &mut Ui| {
            egui::Grid::new("record_fields")
                .num_columns(2)
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    for col in 0..dataset.column_count() {
                        ui.strong(dataset.column_name(col));
                        ui.label(row.cell(col).unwrap_or("—"));
                        ui.end_row();
                    }
                });
        });

    if !open {
        state.selected_record = None;
    }
}

// ---------------------------------------------------------------------------
// Export dialog
// ---------------------------------------------------------------------------

pub fn export_dialog(state: &mut AppState, format: ExportFormat) {
    let file = rfd::FileDialog::new()
        .set_title("Export filtered faults")
        .set_file_name(export::suggested_file_name(format))
        .add_filter(format.label(), &[format.extension()])
        .save_file();

    if let Some(path) = file {
        match export::export_to_path(&path, &state.filtered, format) {
            Ok(()) => {
                state.status_message = Some(format!(
                    "Exported {} faults to {}",
                    state.filtered.record_count(),
                    path.display()
                ));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}
