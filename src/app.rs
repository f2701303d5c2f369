use eframe::egui::{self, Color32, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot, sunburst};

const EMISSIONS_COLOR: Color32 = Color32::from_rgb(0x63, 0x6e, 0xfa);
const TEMPERATURE_COLOR: Color32 = Color32::from_rgb(0xef, 0x55, 0x3b);

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: selectors ----
        egui::SidePanel::left("selector_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: 2×2 chart grid ----
        egui::CentralPanel::default().show(ctx, |ui| {
            let state = &self.state;
            let row_height = (ui.available_height() / 2.0 - 40.0).max(160.0);

            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                ui.columns(2, |cols| {
                    plot::line_chart(
                        &mut cols[0],
                        "co2_emission",
                        &state.emissions_chart,
                        EMISSIONS_COLOR,
                        row_height,
                    );
                    plot::line_chart(
                        &mut cols[1],
                        "temperature",
                        &state.temperature_chart,
                        TEMPERATURE_COLOR,
                        row_height,
                    );
                });
                ui.add_space(12.0);
                ui.columns(2, |cols| {
                    plot::ranking_chart(
                        &mut cols[0],
                        state.context.top_emitters_chart(),
                        row_height,
                    );
                    sunburst::sunburst(
                        &mut cols[1],
                        state.context.hierarchy_chart(),
                        &state.continent_colors,
                        row_height,
                    );
                });
            });
        });
    }
}
