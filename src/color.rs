use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Sequential colour scale for the coverage heatmap
// ---------------------------------------------------------------------------

/// Hue of the scale (a warm red, dark for large counts).
const HUE: f32 = 350.0;
const LIGHTNESS_LOW: f32 = 0.95;
const LIGHTNESS_HIGH: f32 = 0.22;

/// Maps counts in `0..=max` onto a light-to-dark ramp of a single hue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    max: f32,
}

impl ColorScale {
    pub fn new(max: usize) -> Self {
        ColorScale {
            max: max.max(1) as f32,
        }
    }

    /// Position of `value` on the ramp, clamped to `0.0..=1.0`.
    pub fn fraction(&self, value: usize) -> f32 {
        (value as f32 / self.max).clamp(0.0, 1.0)
    }

    /// sRGB colour for a count.
    pub fn rgb(&self, value: usize) -> [u8; 3] {
        let t = self.fraction(value);
        let lightness = LIGHTNESS_LOW + (LIGHTNESS_HIGH - LIGHTNESS_LOW) * t;
        let saturation = 0.35 + 0.45 * t;
        let rgb: Srgb = Hsl::new(HUE, saturation, lightness).into_color();
        [
            (rgb.red * 255.0).round() as u8,
            (rgb.green * 255.0).round() as u8,
            (rgb.blue * 255.0).round() as u8,
        ]
    }

    /// Dark text on light cells, light text on dark cells.
    pub fn text_rgb(&self, value: usize) -> [u8; 3] {
        if self.fraction(value) > 0.5 {
            [255, 255, 255]
        } else {
            [20, 20, 20]
        }
    }
}
