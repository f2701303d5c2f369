use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::color::value_ramp;
use crate::data::chart::{LineChart, RankingChart};

// ---------------------------------------------------------------------------
// Line chart: one aggregate series over the years
// ---------------------------------------------------------------------------

/// Render a year/value line chart. An empty series renders empty axes.
pub fn line_chart(ui: &mut Ui, id: &str, chart: &LineChart, color: Color32, height: f32) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label(RichText::new(&chart.title).strong());
        match chart.series.points().last() {
            Some(last) if last.value.is_finite() => {
                ui.weak(format!("{}: {:.2}", last.year, last.value));
            }
            Some(_) => {}
            None => {
                ui.weak("no data for this selection");
            }
        }
    });

    let points: PlotPoints = chart.series.finite_xy().into();

    Plot::new(id)
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label(chart.y_label)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if chart.series.is_empty() {
                return;
            }
            let line = Line::new(points)
                .name(chart.y_label)
                .color(color)
                .width(2.0);
            plot_ui.line(line);
        });
}

// ---------------------------------------------------------------------------
// Horizontal ranking bars
// ---------------------------------------------------------------------------

/// Render the top-emitter ranking as horizontal bars, country names on the
/// y axis.
pub fn ranking_chart(ui: &mut Ui, chart: &RankingChart, height: f32) {
    ui.label(RichText::new(&chart.title).strong());

    let max = chart
        .bars
        .iter()
        .map(|b| b.mean_emission)
        .fold(0.0_f64, f64::max);

    let bars: Vec<Bar> = chart
        .bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let t = if max > 0.0 { b.mean_emission / max } else { 0.0 };
            Bar::new(i as f64, b.mean_emission)
                .name(&b.country)
                .width(0.7)
                .fill(value_ramp(t))
        })
        .collect();

    let labels: Vec<String> = chart.bars.iter().map(|b| b.country.clone()).collect();

    Plot::new("top_emitters")
        .height(height)
        .x_axis_label("Co2_Emission")
        .y_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .y_axis_min_width(90.0)
        .allow_drag(false)
        .allow_scroll(false)
        .allow_zoom(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}
