use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::config::AppConfig;
use crate::data::chart::{ChartBundle, LineChart};
use crate::data::context::DashboardContext;
use crate::data::selection::Selection;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Where the active datasets came from (used for reloads).
    pub config: AppConfig,

    /// Loaded datasets and startup aggregates.
    pub context: Arc<DashboardContext>,

    /// Current dropdown values.
    pub selection: Selection,

    /// Options of the dependent country dropdown (cached).
    pub country_options: Vec<String>,

    /// Line charts for the current selection (cached).
    pub emissions_chart: LineChart,
    pub temperature_chart: LineChart,

    /// Continent colours shared by the sunburst and its legend.
    pub continent_colors: ColorMap,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig, context: DashboardContext) -> Self {
        let context = Arc::new(context);
        let selection = Selection::new(None, None);
        let continent_colors = continent_color_map(&context);
        let emissions_chart = context.emissions_chart(&selection);
        let temperature_chart = context.temperature_chart(&selection);
        let status_message = skipped_rows_message(&context);

        Self {
            config,
            context,
            selection,
            country_options: Vec::new(),
            emissions_chart,
            temperature_chart,
            continent_colors,
            status_message,
        }
    }

    /// Recompute the selection-dependent charts.
    pub fn refresh(&mut self) {
        log::debug!(
            "Selection changed: region={:?} country={:?}",
            self.selection.region(),
            self.selection.country()
        );
        self.emissions_chart = self.context.emissions_chart(&self.selection);
        self.temperature_chart = self.context.temperature_chart(&self.selection);
        log::debug!(
            "Resolved {} emission points, {} temperature points",
            self.emissions_chart.series.len(),
            self.temperature_chart.series.len()
        );
    }

    /// Pick a region, refresh the country options and drop a country that
    /// does not belong to the new region.
    pub fn set_region(&mut self, region: Option<&str>) {
        self.selection.set_region(region);
        self.country_options = self.context.country_options(self.selection.region());
        self.selection.retain_country_in(&self.country_options);
        self.refresh();
    }

    pub fn set_country(&mut self, country: Option<&str>) {
        self.selection.set_country(country);
        self.refresh();
    }

    /// Replace one of the data files and rebuild the whole context.
    /// On failure the current context stays in place.
    pub fn reload(&mut self, emissions: Option<PathBuf>, temperature: Option<PathBuf>) {
        let mut config = self.config.clone();
        if let Some(path) = emissions {
            config.emissions_path = path;
        }
        if let Some(path) = temperature {
            config.temperature_path = path;
        }

        match DashboardContext::load(&config) {
            Ok(context) => {
                let region = self.selection.region().map(str::to_string);
                let country = self.selection.country().map(str::to_string);
                *self = AppState::new(config, context);
                if region.is_some() {
                    self.set_region(region.as_deref());
                }
                if country.as_deref().is_some_and(|c| self.country_options.iter().any(|o| o == c)) {
                    self.set_country(country.as_deref());
                }
            }
            Err(e) => {
                log::error!("Failed to reload data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// The four charts currently on screen.
    pub fn chart_bundle(&self) -> ChartBundle<'_> {
        ChartBundle {
            region: self.selection.region(),
            country: self.selection.country(),
            emissions: &self.emissions_chart,
            temperature: &self.temperature_chart,
            top_emitters: self.context.top_emitters_chart(),
            hierarchy: self.context.hierarchy_chart(),
        }
    }
}

fn continent_color_map(context: &DashboardContext) -> ColorMap {
    let names: Vec<&str> = context
        .hierarchy_chart()
        .continents
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    ColorMap::new("Continent", &names)
}

fn skipped_rows_message(context: &DashboardContext) -> Option<String> {
    (context.skipped_rows > 0)
        .then(|| format!("{} malformed rows skipped", context.skipped_rows))
}
