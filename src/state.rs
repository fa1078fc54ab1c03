use std::path::Path;

use anyhow::{Context, Result};

use pepcover::data::writer::write_table;
use pepcover::render::save_heatmap_png;
use pepcover::{RingTrial, Table};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct AppState {
    /// Pipeline results shown in the heatmap.
    pub trial: RingTrial,

    /// Selected (percent, n_pep_min) cell.
    pub selected: Option<(u32, u32)>,

    /// Protein rows retained at the selected cell (cached).
    pub selected_rows: Option<Table>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(trial: RingTrial) -> Self {
        Self {
            trial,
            selected: None,
            selected_rows: None,
            status_message: None,
        }
    }

    /// Select a heatmap cell and recompute the retained rows.
    pub fn select(&mut self, percent: u32, n_pep_min: u32) {
        if self.selected == Some((percent, n_pep_min)) {
            return;
        }
        match self.trial.filtered(percent, n_pep_min) {
            Ok(rows) => {
                log::debug!("Selected {percent}% / n_pep_min {n_pep_min}: {} rows", rows.n_rows());
                self.selected = Some((percent, n_pep_min));
                self.selected_rows = Some(rows);
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to filter: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Report the outcome of an export in the status line.
    pub fn record_export(&mut self, what: &str, result: Result<()>) {
        match result {
            Ok(()) => {
                log::info!("Exported {what}");
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to export {what}: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    pub fn export_png(&self, path: &Path) -> Result<()> {
        save_heatmap_png(&self.trial.matrix, path)
    }

    pub fn export_json(&self, path: &Path) -> Result<()> {
        self.trial.write_matrix_json(path)
    }

    /// Write the rows retained at the selected cell.
    pub fn export_selection(&self, path: &Path) -> Result<()> {
        let rows = self
            .selected_rows
            .as_ref()
            .context("no heatmap cell selected")?;
        write_table(path, rows)
    }
}
