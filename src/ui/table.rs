use eframe::egui::{self, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Fault table (central panel)
// ---------------------------------------------------------------------------

/// Render the filtered faults. Clicking a row selects it for the detail window.
pub fn fault_table(ui: &mut Ui, state: &mut AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.alert.is_some() {
                ui.heading("No data – the fault sheet could not be fetched");
            } else {
                ui.heading("Loading faults…");
            }
        });
        return;
    }

    let filtered = &state.filtered;
    let n_cols = filtered.column_count();
    let n_rows = filtered.record_count();
    if n_rows == 0 {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("No faults match the current filters.");
        });
        return;
    }

    let status_col = filtered.layout.status;
    let colors = &state.status_colors;
    let mut clicked = None;

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .sense(Sense::click())
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0).clip(true), n_cols)
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for col in 0..n_cols {
                    header.col(|ui: &mut Ui| {
                        ui.strong(filtered.column_name(col));
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, n_rows, |mut row| {
                    // +1 skips the header row of the filtered dataset
                    let idx = row.index() + 1;
                    let record = &filtered.rows[idx];
                    row.set_selected(state.is_selected(idx));
                    for col in 0..n_cols {
                        row.col(|ui: &mut Ui| {
                            let text = record.cell(col).unwrap_or("");
                            let mut rich = RichText::new(text);
                            if col == status_col {
                                if let Some(c) = colors.color_for(text) {
                                    rich = rich.color(c).strong();
                                }
                            }
                            ui.label(rich);
                        });
                    }
                    if row.response().clicked() {
                        clicked = Some(idx);
                    }
                });
            });
    });

    if let Some(idx) = clicked {
        state.select_filtered(idx);
    }
}
