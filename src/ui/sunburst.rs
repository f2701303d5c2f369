use std::f32::consts::TAU;

use eframe::egui::{self, Color32, Pos2, RichText, Sense, Shape, Stroke, Ui, Vec2};

use crate::color::{ColorMap, lighten};
use crate::data::chart::HierarchyChart;

/// Radii as fractions of the available radius.
const HOLE: f32 = 0.15;
const INNER: f32 = 0.55;
const OUTER: f32 = 1.0;

/// Polygon resolution along an arc, per full turn.
const STEPS_PER_TURN: f32 = 180.0;

// ---------------------------------------------------------------------------
// Layout: angular extent of every ring segment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub label: String,
    /// Continent of the segment (the segment itself on the inner ring).
    pub continent: String,
    pub value: f64,
    /// Share of the grand total, in `[0, 1]`.
    pub share: f64,
    pub start: f32,
    pub end: f32,
    /// 0 = continents, 1 = countries.
    pub ring: usize,
}

/// Split the full turn proportionally to value: continents on the inner
/// ring, their countries on the outer ring inside the parent's extent.
pub fn layout(chart: &HierarchyChart) -> Vec<Segment> {
    let total = chart.total();
    if !(total > 0.0) {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut angle = 0.0_f32;

    for continent in &chart.continents {
        let sweep = (continent.value / total) as f32 * TAU;
        segments.push(Segment {
            label: continent.name.clone(),
            continent: continent.name.clone(),
            value: continent.value,
            share: continent.value / total,
            start: angle,
            end: angle + sweep,
            ring: 0,
        });

        let mut child_angle = angle;
        for country in &continent.countries {
            let child_sweep = if continent.value > 0.0 {
                (country.value / continent.value) as f32 * sweep
            } else {
                0.0
            };
            segments.push(Segment {
                label: country.name.clone(),
                continent: continent.name.clone(),
                value: country.value,
                share: country.value / total,
                start: child_angle,
                end: child_angle + child_sweep,
                ring: 1,
            });
            child_angle += child_sweep;
        }
        angle += sweep;
    }
    segments
}

fn ring_radii(ring: usize) -> (f32, f32) {
    match ring {
        0 => (HOLE, INNER),
        _ => (INNER, OUTER),
    }
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    // Start at 12 o'clock, clockwise.
    let a = angle - TAU / 4.0;
    center + Vec2::new(a.cos(), a.sin()) * radius
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Paint the hierarchy as a two-ring sunburst; hovering shows the segment.
pub fn sunburst(ui: &mut Ui, chart: &HierarchyChart, colors: &ColorMap, height: f32) {
    ui.label(RichText::new(&chart.title).strong());

    let size = Vec2::new(ui.available_width(), height);
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let center = rect.center();
    let radius = 0.5 * rect.width().min(rect.height()) - 4.0;

    let segments = layout(chart);
    if segments.is_empty() || radius <= 0.0 {
        painter.text(
            center,
            egui::Align2::CENTER_CENTER,
            "No emissions to show",
            egui::FontId::proportional(14.0),
            ui.visuals().weak_text_color(),
        );
        return;
    }

    let stroke = Stroke::new(1.0, ui.visuals().panel_fill);

    for seg in &segments {
        let base = colors.color_for(&seg.continent);
        let fill = if seg.ring == 0 { base } else { lighten(base, 0.35) };
        let (r0, r1) = ring_radii(seg.ring);
        paint_segment(&painter, center, r0 * radius, r1 * radius, seg.start, seg.end, fill);

        // Separator lines between neighbouring segments.
        painter.line_segment(
            [
                polar(center, r0 * radius, seg.start),
                polar(center, r1 * radius, seg.start),
            ],
            stroke,
        );
    }

    if let Some(pos) = response.hover_pos() {
        if let Some(seg) = hit_test(&segments, center, radius, pos) {
            let text = format!(
                "{}\nCo2_Emission: {:.1}\n{:.1}% of total",
                seg.label,
                seg.value,
                seg.share * 100.0
            );
            response.on_hover_text_at_pointer(text);
        }
    }
}

/// Annular sectors are not convex, so paint each as a strip of small quads.
fn paint_segment(
    painter: &egui::Painter,
    center: Pos2,
    r0: f32,
    r1: f32,
    start: f32,
    end: f32,
    fill: Color32,
) {
    let sweep = end - start;
    if sweep <= 0.0 {
        return;
    }
    let steps = ((sweep / TAU) * STEPS_PER_TURN).ceil().max(1.0) as usize;
    let step = sweep / steps as f32;

    for i in 0..steps {
        let a0 = start + step * i as f32;
        let a1 = a0 + step;
        let quad = vec![
            polar(center, r0, a0),
            polar(center, r1, a0),
            polar(center, r1, a1),
            polar(center, r0, a1),
        ];
        painter.add(Shape::convex_polygon(quad, fill, Stroke::NONE));
    }
}

fn hit_test<'a>(segments: &'a [Segment], center: Pos2, radius: f32, pos: Pos2) -> Option<&'a Segment> {
    let d = pos - center;
    let dist = d.length() / radius;
    if !(HOLE..=OUTER).contains(&dist) {
        return None;
    }
    let ring = if dist < INNER { 0 } else { 1 };
    let angle = (d.y.atan2(d.x) + TAU / 4.0).rem_euclid(TAU);

    segments
        .iter()
        .find(|s| s.ring == ring && angle >= s.start && angle < s.end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{ContinentShare, CountryShare};

    fn chart() -> HierarchyChart {
        let continent = |name: &str, countries: &[(&str, f64)]| ContinentShare {
            name: name.into(),
            value: countries.iter().map(|c| c.1).sum(),
            countries: countries
                .iter()
                .map(|&(n, v)| CountryShare { name: n.into(), value: v })
                .collect(),
        };
        HierarchyChart {
            title: "t".into(),
            continents: vec![
                continent("Asia", &[("China", 30.0), ("Japan", 10.0)]),
                continent("Europe", &[("France", 10.0)]),
            ],
        }
    }

    #[test]
    fn rings_cover_a_full_turn() {
        let segs = layout(&chart());
        for ring in 0..2 {
            let sweep: f32 = segs.iter().filter(|s| s.ring == ring).map(|s| s.end - s.start).sum();
            assert!((sweep - TAU).abs() < 1e-4, "ring {ring}: {sweep}");
        }
        assert!((segs[0].share - 0.8).abs() < 1e-12);
    }

    #[test]
    fn children_stay_inside_parent() {
        let segs = layout(&chart());
        let asia = &segs[0];
        let children: Vec<&Segment> = segs.iter().filter(|s| s.ring == 1 && s.continent == "Asia").collect();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].start, asia.start);
        assert!((children[1].end - asia.end).abs() < 1e-5);
    }

    #[test]
    fn empty_hierarchy_has_no_segments() {
        let chart = HierarchyChart { title: "t".into(), continents: Vec::new() };
        assert!(layout(&chart).is_empty());
    }

    #[test]
    fn hit_test_finds_country_on_outer_ring() {
        let segs = layout(&chart());
        let center = Pos2::new(0.0, 0.0);
        // Just right of 12 o'clock on the outer ring: first country (China).
        let pos = polar(center, 80.0, 0.1);
        let seg = hit_test(&segs, center, 100.0, pos).unwrap();
        assert_eq!(seg.label, "China");
        // Inside the hole.
        assert!(hit_test(&segs, center, 100.0, Pos2::new(1.0, 1.0)).is_none());
    }
}
