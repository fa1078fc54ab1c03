use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use pepcover::data::counts::PEPTIDE_COUNT_PREFIX;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Right side panel – retained protein groups
// ---------------------------------------------------------------------------

/// Render the selection panel: pipeline summary plus the rows retained at
/// the selected heatmap cell.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    let trial = &state.trial;
    let columns = &trial.config.columns;

    ui.heading("Ring trial");
    ui.separator();
    ui.label(format!("Identifier: {}", columns.id));
    ui.label(format!("Sample marker: {}", columns.marker));
    ui.label(format!(
        "{} identifiers counted, {} protein groups",
        trial.counts.n_rows(),
        trial.joined.n_rows()
    ));
    ui.separator();

    let (Some((percent, n_pep_min)), Some(rows)) = (state.selected, &state.selected_rows) else {
        ui.label("Click a heatmap cell to list its protein groups.");
        return;
    };

    ui.strong(format!(
        "≥ {n_pep_min} peptides in ≥ {percent}% of samples: {} groups",
        rows.n_rows()
    ));

    let Ok(ids) = rows.column(&columns.id) else {
        ui.label(RichText::new(format!("'{}' column missing", columns.id)).color(Color32::RED));
        return;
    };
    let peptide_columns: Vec<_> = rows
        .columns()
        .iter()
        .filter(|c| c.name.contains(PEPTIDE_COUNT_PREFIX))
        .collect();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(TableColumn::auto().at_least(120.0))
        .columns(TableColumn::auto(), peptide_columns.len())
        .header(20.0, |mut header| {
            header.col(|ui: &mut Ui| {
                ui.strong(&columns.id);
            });
            for col in &peptide_columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(&col.name);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.n_rows(), |mut row| {
                let i = row.index();
                row.col(|ui: &mut Ui| {
                    ui.label(ids.values[i].to_string());
                });
                for col in &peptide_columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(col.values[i].to_field());
                    });
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Export heatmap PNG…").clicked() {
                if let Some(path) = save_dialog("Export heatmap", "PNG", &["png"], "coverage_heatmap.png") {
                    let result = state.export_png(&path);
                    state.record_export("heatmap", result);
                }
                ui.close_menu();
            }
            if ui.button("Export matrix JSON…").clicked() {
                if let Some(path) = save_dialog("Export coverage matrix", "JSON", &["json"], "coverage_matrix.json") {
                    let result = state.export_json(&path);
                    state.record_export("coverage matrix", result);
                }
                ui.close_menu();
            }
            let has_selection = state.selected_rows.is_some();
            if ui
                .add_enabled(has_selection, egui::Button::new("Export selection TSV…"))
                .clicked()
            {
                if let Some(path) = save_dialog("Export protein groups", "TSV", &["tsv"], "filtered.tsv") {
                    let result = state.export_selection(&path);
                    state.record_export("selection", result);
                }
                ui.close_menu();
            }
        });

        ui.separator();

        let matrix = &state.trial.matrix;
        ui.label(format!(
            "{} percents × {} minimum counts, max {} groups",
            matrix.percents.len(),
            matrix.n_pep_mins.len(),
            matrix.max_count()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

fn save_dialog(title: &str, filter: &str, extensions: &[&str], file_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter(filter, extensions)
        .set_file_name(file_name)
        .save_file()
}
