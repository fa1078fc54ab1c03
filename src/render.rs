//! Headless heatmap rendering to PNG.
//!
//! Layout: percent on the y-axis (descending from the top), n_pep_min on the
//! x-axis, each cell annotated with its retained row count, and a colour bar
//! on the right.

use std::path::Path;

use anyhow::{Context, Result};
use image::{Rgb, RgbImage};

use crate::color::ColorScale;
use crate::data::CoverageMatrix;

const CELL_W: u32 = 64;
const CELL_H: u32 = 40;
const MARGIN_LEFT: u32 = 72;
const MARGIN_TOP: u32 = 16;
const MARGIN_BOTTOM: u32 = 40;
const MARGIN_RIGHT: u32 = 64;
const BAR_W: u32 = 16;
const GLYPH_SCALE: u32 = 3;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS_TEXT: Rgb<u8> = Rgb([20, 20, 20]);

/// 3x5 bitmaps, one byte per row, high bit on the left.
fn glyph(c: char) -> Option<[u8; 5]> {
    let rows = match c {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        _ => return None,
    };
    Some(rows)
}

fn text_width(text: &str) -> u32 {
    let n = text.chars().count() as u32;
    (n * 4).saturating_sub(1) * GLYPH_SCALE
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, w: u32, h: u32, color: Rgb<u8>) {
    for py in y..(y + h).min(img.height()) {
        for px in x..(x + w).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

/// Draw `text` centred on `(cx, cy)`. Characters without a glyph are skipped.
fn draw_text(img: &mut RgbImage, cx: u32, cy: u32, text: &str, color: Rgb<u8>) {
    let x0 = cx.saturating_sub(text_width(text) / 2);
    let y0 = cy.saturating_sub(5 * GLYPH_SCALE / 2);
    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else { continue };
        let gx = x0 + i as u32 * 4 * GLYPH_SCALE;
        for (ry, bits) in rows.iter().enumerate() {
            for rx in 0..3u32 {
                if bits & (0b100 >> rx) != 0 {
                    fill_rect(
                        img,
                        gx + rx * GLYPH_SCALE,
                        y0 + ry as u32 * GLYPH_SCALE,
                        GLYPH_SCALE,
                        GLYPH_SCALE,
                        color,
                    );
                }
            }
        }
    }
}

/// Render the coverage matrix as an annotated heatmap image.
pub fn heatmap_image(matrix: &CoverageMatrix) -> RgbImage {
    let rows = matrix.rows_descending();
    let n_cols = matrix.n_pep_mins.len() as u32;
    let n_rows = rows.len() as u32;
    let grid_w = n_cols * CELL_W;
    let grid_h = n_rows * CELL_H;
    let mut img = RgbImage::from_pixel(
        MARGIN_LEFT + grid_w + MARGIN_RIGHT,
        MARGIN_TOP + grid_h + MARGIN_BOTTOM,
        BACKGROUND,
    );
    let scale = ColorScale::new(matrix.max_count());

    for (i, (percent, counts)) in rows.iter().enumerate() {
        let y = MARGIN_TOP + i as u32 * CELL_H;
        for (j, &count) in counts.iter().enumerate() {
            let x = MARGIN_LEFT + j as u32 * CELL_W;
            // one-pixel white gap between cells
            fill_rect(&mut img, x + 1, y + 1, CELL_W - 2, CELL_H - 2, Rgb(scale.rgb(count)));
            draw_text(
                &mut img,
                x + CELL_W / 2,
                y + CELL_H / 2,
                &count.to_string(),
                Rgb(scale.text_rgb(count)),
            );
        }
        draw_text(&mut img, MARGIN_LEFT / 2, y + CELL_H / 2, &format!("{percent}%"), AXIS_TEXT);
    }

    for (j, n_pep_min) in matrix.n_pep_mins.iter().enumerate() {
        let x = MARGIN_LEFT + j as u32 * CELL_W + CELL_W / 2;
        draw_text(&mut img, x, MARGIN_TOP + grid_h + MARGIN_BOTTOM / 2, &n_pep_min.to_string(), AXIS_TEXT);
    }

    // Colour bar, maximum at the top.
    let bar_x = MARGIN_LEFT + grid_w + (MARGIN_RIGHT - BAR_W) / 2;
    if grid_h > 0 {
        let max = matrix.max_count();
        for py in 0..grid_h {
            let value = ((grid_h - 1 - py) as f64 / (grid_h.max(2) - 1) as f64 * max as f64).round();
            fill_rect(&mut img, bar_x, MARGIN_TOP + py, BAR_W, 1, Rgb(scale.rgb(value as usize)));
        }
    }

    img
}

/// Render the heatmap and write it as PNG.
pub fn save_heatmap_png(matrix: &CoverageMatrix, path: &Path) -> Result<()> {
    heatmap_image(matrix)
        .save(path)
        .with_context(|| format!("writing heatmap to {}", path.display()))
}
