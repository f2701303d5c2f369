use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Sequential scale for magnitudes: pale yellow at `t = 0`, deep red at `t = 1`.
pub fn value_ramp(t: f64) -> Color32 {
    let t = t.clamp(0.0, 1.0) as f32;
    let low = Hsl::new(55.0, 0.90, 0.75);
    let high = Hsl::new(0.0, 0.80, 0.35);
    to_color32(low.mix(high, t))
}

/// Lighter variant of a base colour for the outer sunburst ring.
/// `t` in `[0, 1]` selects how far towards white the colour moves.
pub fn lighten(base: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let base: Srgb = Srgb::new(base.r(), base.g(), base.b()).into_format();
    let white = Srgb::new(1.0, 1.0, 1.0);
    let mixed: Srgb<u8> = base.mix(white, t).into_format();
    Color32::from_rgb(mixed.red, mixed.green, mixed.blue)
}

// ---------------------------------------------------------------------------
// Color mapping: category name → Color32
// ---------------------------------------------------------------------------

/// Maps the distinct values of a category column to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<String, Color32>,
    order: Vec<String>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given column, preserving `values` order.
    pub fn new(column: &str, values: &[&str]) -> Self {
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<String, Color32> = values
            .iter()
            .zip(palette)
            .map(|(v, c)| (v.to_string(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            order: values.iter().map(|v| v.to_string()).collect(),
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|v| (v.clone(), self.color_for(v)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_distinct_colors() {
        let colors = generate_palette(6);
        assert_eq!(colors.len(), 6);
        for (i, a) in colors.iter().enumerate() {
            assert!(colors[i + 1..].iter().all(|b| a != b));
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_value_falls_back_to_gray() {
        let cm = ColorMap::new("Continent", &["Asia", "Europe"]);
        assert_eq!(cm.color_for("Atlantis"), Color32::GRAY);
        let legend: Vec<String> = cm.legend_entries().into_iter().map(|(v, _)| v).collect();
        assert_eq!(legend, vec!["Asia", "Europe"]);
    }

    #[test]
    fn lighten_moves_towards_white() {
        let base = Color32::from_rgb(100, 0, 200);
        assert_eq!(lighten(base, 0.0), base);
        assert_eq!(lighten(base, 1.0), Color32::WHITE);
        assert_eq!(lighten(base, 0.2), Color32::from_rgb(131, 51, 211));
    }
}
