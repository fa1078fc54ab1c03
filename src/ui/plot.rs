use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Polygon, Text};

use pepcover::color::ColorScale;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Coverage heatmap (central panel)
// ---------------------------------------------------------------------------

fn rgb([r, g, b]: [u8; 3]) -> Color32 {
    Color32::from_rgb(r, g, b)
}

/// Integer grid positions get an axis label; everything else stays blank.
fn axis_label(value: f64, labels: &[String]) -> String {
    if value.fract().abs() > 1e-6 || value < 0.0 {
        return String::new();
    }
    labels.get(value as usize).cloned().unwrap_or_default()
}

/// Render the coverage heatmap. Clicking a cell selects it.
///
/// Cell `(j, k)` is centred on plot coordinates `(j, k)`; row `k = 0` is the
/// lowest percent so the highest percent is drawn on top.
pub fn coverage_heatmap(ui: &mut Ui, state: &mut AppState) {
    let matrix = &state.trial.matrix;
    if matrix.percents.is_empty() || matrix.n_pep_mins.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Nothing to show: the sweep is empty");
        });
        return;
    }

    let mut rows = matrix.rows_descending();
    rows.reverse();
    let scale = ColorScale::new(matrix.max_count());
    let selected = state.selected;

    let x_labels: Vec<String> = matrix.n_pep_mins.iter().map(|n| n.to_string()).collect();
    let y_labels: Vec<String> = rows.iter().map(|(p, _)| format!("{p}%")).collect();
    let percents: Vec<u32> = rows.iter().map(|(p, _)| *p).collect();
    let n_pep_mins = matrix.n_pep_mins.clone();

    let response = Plot::new("coverage_heatmap")
        .x_axis_label("Min. peptides per sample")
        .y_axis_label("Samples meeting the minimum")
        .x_axis_formatter(move |mark, _range| axis_label(mark.value, &x_labels))
        .y_axis_formatter(move |mark, _range| axis_label(mark.value, &y_labels))
        .show_grid(false)
        .show_x(false)
        .show_y(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            for (k, (percent, counts)) in rows.iter().enumerate() {
                let y = k as f64;
                for (j, &count) in counts.iter().enumerate() {
                    let x = j as f64;
                    let is_selected = selected == Some((*percent, n_pep_mins[j]));
                    let stroke = if is_selected {
                        Stroke::new(3.0, Color32::BLACK)
                    } else {
                        Stroke::new(1.0, Color32::WHITE)
                    };

                    let corners = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    let cell = Polygon::new(PlotPoints::new(corners))
                        .fill_color(rgb(scale.rgb(count)))
                        .stroke(stroke);
                    plot_ui.polygon(cell);

                    let label = RichText::new(count.to_string()).color(rgb(scale.text_rgb(count)));
                    plot_ui.text(Text::new(PlotPoint::new(x, y), label));
                }
            }
            plot_ui.pointer_coordinate()
        });

    if response.response.clicked() {
        if let Some(point) = response.inner {
            let j = point.x.round();
            let k = point.y.round();
            if j >= 0.0 && k >= 0.0 {
                if let (Some(&percent), Some(&n_pep_min)) =
                    (percents.get(k as usize), n_pep_mins.get(j as usize))
                {
                    state.select(percent, n_pep_min);
                }
            }
        }
    }
}
