use std::collections::{BTreeMap, BTreeSet};

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::Dataset;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Status colours
// ---------------------------------------------------------------------------

/// Maps each distinct status of the full dataset to a colour, so a status
/// keeps its colour while filters change.
#[derive(Debug, Clone, Default)]
pub struct StatusColors {
    mapping: BTreeMap<String, Color32>,
}

impl StatusColors {
    /// Statuses are keyed case-insensitively and trimmed.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let status_col = dataset.layout.status;
        let statuses: BTreeSet<String> = dataset
            .data_rows()
            .iter()
            .filter_map(|row| row.cell(status_col))
            .map(status_key)
            .filter(|s| !s.is_empty())
            .collect();

        let palette = generate_palette(statuses.len());
        Self {
            mapping: statuses.into_iter().zip(palette).collect(),
        }
    }

    /// Colour for a status cell, `None` for unknown or blank statuses.
    pub fn color_for(&self, status: &str) -> Option<Color32> {
        self.mapping.get(&status_key(status)).copied()
    }

    pub fn len(&self) -> usize {
        self.mapping.len()
    }
}

fn status_key(s: &str) -> String {
    s.trim().to_lowercase()
}
