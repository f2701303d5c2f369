use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::selection::NO_SELECTION;
use crate::state::AppState;

const HEADER_COLOR: Color32 = Color32::from_rgb(0x13, 0x0a, 0x7b);

// ---------------------------------------------------------------------------
// Left side panel – selectors
// ---------------------------------------------------------------------------

/// Render the left panel: region and country dropdowns, legend, ranking table.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading(RichText::new("Global Warming Insights").color(HEADER_COLOR));
        ui.label(RichText::new(state.context.year_span_label()).color(HEADER_COLOR));
    });
    ui.separator();

    // ---- Region selector ----
    ui.strong("Select Region:");
    let current_region = state.selection.region().map(str::to_string);
    let mut picked_region: Option<String> = None;
    egui::ComboBox::from_id_salt("region")
        .selected_text(current_region.as_deref().unwrap_or(""))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for region in state.context.region_options() {
                let selected = match current_region.as_deref() {
                    Some(r) => r == region.as_str(),
                    None => region == NO_SELECTION,
                };
                if ui.selectable_label(selected, region).clicked() {
                    picked_region = Some(region.clone());
                }
            }
        });
    if let Some(region) = picked_region {
        state.set_region(Some(&region));
    }

    ui.add_space(6.0);

    // ---- Country selector (depends on region) ----
    ui.strong("Select Country:");
    let current_country = state.selection.country().map(str::to_string);
    let mut picked_country: Option<Option<String>> = None;
    ui.add_enabled_ui(!state.country_options.is_empty(), |ui: &mut Ui| {
        egui::ComboBox::from_id_salt("country")
            .selected_text(current_country.as_deref().unwrap_or(""))
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                if ui
                    .selectable_label(current_country.is_none(), "(all)")
                    .clicked()
                {
                    picked_country = Some(None);
                }
                for country in &state.country_options {
                    let selected = current_country.as_deref() == Some(country.as_str());
                    if ui.selectable_label(selected, country).clicked() {
                        picked_country = Some(Some(country.clone()));
                    }
                }
            });
    });
    if let Some(country) = picked_country {
        state.set_country(country.as_deref());
    }

    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Continent legend ----
            egui::CollapsingHeader::new(RichText::new(&state.continent_colors.column).strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    for (name, color) in state.continent_colors.legend_entries() {
                        ui.label(RichText::new(format!("■ {name}")).color(color));
                    }
                });

            // ---- Ranking table ----
            egui::CollapsingHeader::new(RichText::new("Top emitters").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    ranking_table(ui, state);
                });
        });
}

fn ranking_table(ui: &mut Ui, state: &AppState) {
    let bars = &state.context.top_emitters_chart().bars;
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(24.0))
        .column(Column::remainder().at_least(80.0))
        .column(Column::auto())
        .header(18.0, |mut header| {
            header.col(|ui| {
                ui.strong("#");
            });
            header.col(|ui| {
                ui.strong("Country");
            });
            header.col(|ui| {
                ui.strong("Mean Co2");
            });
        })
        .body(|mut body| {
            // Bars are stored in display order (largest last).
            for (rank, entry) in bars.iter().rev().enumerate() {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(format!("{}", rank + 1));
                    });
                    row.col(|ui| {
                        ui.label(&entry.country);
                    });
                    row.col(|ui| {
                        ui.label(format!("{:.1}", entry.mean_emission));
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open emissions…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_data_file("Open emissions data") {
                    state.reload(Some(path), None);
                }
            }
            if ui.button("Open temperature…").clicked() {
                ui.close_menu();
                if let Some(path) = pick_data_file("Open temperature data") {
                    state.reload(None, Some(path));
                }
            }
            ui.separator();
            if ui.button("Export charts…").clicked() {
                ui.close_menu();
                export_charts(state);
            }
        });

        ui.separator();

        let ctx = &state.context;
        ui.label(format!(
            "{} emission rows, {} temperature rows",
            ctx.emissions().len(),
            ctx.temperatures().len()
        ));

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                ui.visuals().warn_fg_color
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

fn pick_data_file(title: &str) -> Option<std::path::PathBuf> {
    rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

/// Save the four chart payloads as JSON.
pub fn export_charts(state: &mut AppState) {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Export charts")
        .set_file_name("charts.json")
        .add_filter("JSON", &["json"])
        .save_file()
    else {
        return;
    };

    let result = state
        .chart_bundle()
        .to_json()
        .map_err(anyhow::Error::from)
        .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));

    match result {
        Ok(()) => {
            log::info!("Exported charts to {}", path.display());
            state.status_message = Some(format!("Exported charts to {}", path.display()));
        }
        Err(e) => {
            log::error!("Failed to export charts: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
