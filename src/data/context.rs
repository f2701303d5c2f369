use anyhow::Result;

use super::aggregate::{TemperatureTables, emission_hierarchy, top_emitters, yearly_mean};
use super::chart::{HierarchyChart, LineChart, RankingChart};
use super::loader::load_file;
use super::model::{EmissionRecord, TemperatureRecord};
use super::selection::{Scope, Selection, country_options, region_options};
use crate::config::AppConfig;
use crate::error::DataError;

const TOP_EMITTERS: usize = 10;

const EMISSIONS_LABEL: &str = "Co2_Emission";
const TEMPERATURE_LABEL: &str = "AvgTemperature";

// ---------------------------------------------------------------------------
// DashboardContext – immutable after construction
// ---------------------------------------------------------------------------

/// Both datasets plus every aggregate that does not depend on the selection.
///
/// Read-only once built; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct DashboardContext {
    emissions: Vec<EmissionRecord>,
    temperatures: Vec<TemperatureRecord>,
    temperature_tables: TemperatureTables,
    ranking: RankingChart,
    hierarchy: HierarchyChart,
    regions: Vec<String>,
    year_span: Option<(i32, i32)>,
    /// Malformed source rows dropped while loading.
    pub skipped_rows: usize,
}

impl DashboardContext {
    /// Load both files named by `config`. Any failure aborts the whole load.
    pub fn load(config: &AppConfig) -> Result<Self> {
        let emissions = load_file::<EmissionRecord>(&config.emissions_path)?;
        let temperatures = load_file::<TemperatureRecord>(&config.temperature_path)?;

        let skipped = emissions.skipped.len() + temperatures.skipped.len();
        let mut ctx = Self::new(emissions.records, temperatures.records)?;
        ctx.skipped_rows = skipped;
        Ok(ctx)
    }

    /// Run the startup aggregations over already validated records.
    pub fn new(
        emissions: Vec<EmissionRecord>,
        temperatures: Vec<TemperatureRecord>,
    ) -> Result<Self, DataError> {
        if emissions.is_empty() {
            return Err(DataError::Empty("emissions"));
        }
        if temperatures.is_empty() {
            return Err(DataError::Empty("temperature"));
        }

        let temperature_tables = TemperatureTables::build(&temperatures);

        // Largest last, so the horizontal bar chart draws it on top.
        let mut bars = top_emitters(&emissions, TOP_EMITTERS);
        bars.reverse();
        let ranking = RankingChart {
            title: "Ten Most Countries Emitting Co2".to_string(),
            bars,
        };

        let hierarchy = HierarchyChart {
            title: "Co2 Emissions Contribution of Countries and Regions".to_string(),
            continents: emission_hierarchy(&emissions),
        };

        let regions = region_options(&emissions);
        let year_span = emissions
            .iter()
            .map(|r| r.year)
            .min()
            .zip(emissions.iter().map(|r| r.year).max());

        log::debug!(
            "Context ready: {} regions, {} ranked countries, {} continents",
            regions.len() - 1,
            ranking.bars.len(),
            hierarchy.continents.len()
        );

        Ok(DashboardContext {
            emissions,
            temperatures,
            temperature_tables,
            ranking,
            hierarchy,
            regions,
            year_span,
            skipped_rows: 0,
        })
    }

    pub fn emissions(&self) -> &[EmissionRecord] {
        &self.emissions
    }

    pub fn temperatures(&self) -> &[TemperatureRecord] {
        &self.temperatures
    }

    /// First and last emission year, e.g. `"1995 - 2017"`.
    pub fn year_span_label(&self) -> String {
        match self.year_span {
            Some((first, last)) => format!("{first} - {last}"),
            None => String::new(),
        }
    }

    fn years_suffix(&self) -> String {
        match self.year_span {
            Some((first, last)) => format!(" over years ({first} : {last})"),
            None => String::new(),
        }
    }

    // -- Selector options --

    /// Region dropdown entries, ending with the clearing `"None"`.
    pub fn region_options(&self) -> &[String] {
        &self.regions
    }

    /// Country dropdown entries for the selected region.
    pub fn country_options(&self, region: Option<&str>) -> Vec<String> {
        country_options(&self.emissions, region)
    }

    // -- Charts --

    /// Emissions over time, aggregated from raw rows for the selection.
    pub fn emissions_chart(&self, selection: &Selection) -> LineChart {
        let scope = selection.scope();
        let series = yearly_mean(
            self.emissions
                .iter()
                .filter(|r| scope.matches(*r))
                .map(|r| (r.year, r.co2_emission)),
        );

        let years = self.years_suffix();
        let title = match scope {
            Scope::Global => format!("Global Co2_Emission mean{years}"),
            Scope::Region(region) => format!("Co2_Emission mean in {region}{years}"),
            Scope::Country(country) => format!("Co2_Emission in {country}{years}"),
        };

        LineChart {
            title,
            y_label: EMISSIONS_LABEL,
            series,
        }
    }

    /// Temperature over time, read from the precomputed tables.
    pub fn temperature_chart(&self, selection: &Selection) -> LineChart {
        let tables = &self.temperature_tables;
        let (title, series) = match selection.scope() {
            Scope::Global => ("Temperature globally".to_string(), Some(tables.global())),
            Scope::Region(region) => (format!("Temperature of {region}"), tables.region(region)),
            Scope::Country(country) => {
                (format!("Temperature of {country}"), tables.country(country))
            }
        };

        LineChart {
            title,
            y_label: TEMPERATURE_LABEL,
            series: series.cloned().unwrap_or_default(),
        }
    }

    pub fn top_emitters_chart(&self) -> &RankingChart {
        &self.ranking
    }

    pub fn hierarchy_chart(&self) -> &HierarchyChart {
        &self.hierarchy
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::chart::ChartBundle;
    use crate::data::model::AggregateSeries;

    /// Temperature series computed from raw rows instead of the tables.
    fn temperature_from_rows(ctx: &DashboardContext, selection: &Selection) -> AggregateSeries {
        let scope = selection.scope();
        yearly_mean(
            ctx.temperatures()
                .iter()
                .filter(|r| scope.matches(*r))
                .map(|r| (r.year, r.avg_temperature)),
        )
    }

    fn emission(country: &str, region: &str, continent: &str, year: i32, co2: f64) -> EmissionRecord {
        EmissionRecord {
            country: country.into(),
            region: region.into(),
            continent: continent.into(),
            year,
            co2_emission: co2,
        }
    }

    fn temperature(country: &str, region: &str, year: i32, t: f64) -> TemperatureRecord {
        TemperatureRecord {
            country: country.into(),
            region: region.into(),
            year,
            avg_temperature: t,
        }
    }

    fn context() -> DashboardContext {
        let emissions = vec![
            emission("A", "R1", "K1", 2000, 10.0),
            emission("A", "R1", "K1", 2001, 12.0),
            emission("B", "R1", "K1", 2000, 20.0),
            emission("B", "R1", "K1", 2001, 30.0),
            emission("C", "R2", "K2", 2000, 60.0),
            emission("C", "R2", "K2", 2001, f64::NAN),
        ];
        let temperatures = vec![
            temperature("A", "R1", 2000, 10.0),
            temperature("A", "R1", 2001, 11.0),
            temperature("B", "R1", 2000, 12.0),
            temperature("C", "R2", 2000, 25.0),
            temperature("C", "R2", 2001, f64::NAN),
        ];
        DashboardContext::new(emissions, temperatures).unwrap()
    }

    #[test]
    fn global_region_and_country_emissions() {
        let ctx = context();

        let global = ctx.emissions_chart(&Selection::default());
        assert_eq!(global.series.value_at(2000), Some(30.0));
        assert_eq!(global.series.value_at(2001), Some(21.0));
        assert_eq!(
            global.title,
            "Global Co2_Emission mean over years (2000 : 2001)"
        );

        let region = ctx.emissions_chart(&Selection::new(Some("R1"), None));
        assert_eq!(region.series.value_at(2000), Some(15.0));
        assert_eq!(region.title, "Co2_Emission mean in R1 over years (2000 : 2001)");

        let country = ctx.emissions_chart(&Selection::new(Some("R2"), Some("A")));
        assert_eq!(country.series.value_at(2001), Some(12.0));
        assert!(country.title.starts_with("Co2_Emission in A"));
    }

    #[test]
    fn unknown_selection_gives_empty_series() {
        let ctx = context();
        let sel = Selection::new(Some("Atlantis"), None);
        assert!(ctx.emissions_chart(&sel).series.is_empty());
        assert!(ctx.temperature_chart(&sel).series.is_empty());

        let sel = Selection::new(None, Some("Nowhere"));
        assert!(ctx.temperature_chart(&sel).series.is_empty());
    }

    #[test]
    fn clearing_country_returns_to_region_aggregate() {
        let ctx = context();
        let direct = Selection::new(Some("R1"), None);

        let mut sel = Selection::default();
        sel.set_region(Some("R1"));
        sel.set_country(Some("B"));
        assert_ne!(ctx.emissions_chart(&sel), ctx.emissions_chart(&direct));
        sel.set_country(None);

        assert_eq!(ctx.emissions_chart(&sel), ctx.emissions_chart(&direct));
        assert_eq!(ctx.temperature_chart(&sel), ctx.temperature_chart(&direct));
    }

    #[test]
    fn precomputed_temperature_equals_raw_filtering() {
        let ctx = context();
        let selections = [
            Selection::default(),
            Selection::new(Some("R1"), None),
            Selection::new(Some("R2"), None),
            Selection::new(None, Some("A")),
            Selection::new(Some("R1"), Some("B")),
        ];
        for sel in &selections {
            let table = ctx.temperature_chart(sel).series;
            let raw = temperature_from_rows(&ctx, sel);
            assert_eq!(table.len(), raw.len(), "{sel:?}");
            for (a, b) in table.points().iter().zip(raw.points()) {
                assert_eq!(a.year, b.year);
                assert!(a.value == b.value || (a.value.is_nan() && b.value.is_nan()));
            }
        }
    }

    #[test]
    fn ranking_is_reversed_for_display() {
        let ctx = context();
        let bars = &ctx.top_emitters_chart().bars;
        let names: Vec<&str> = bars.iter().map(|b| b.country.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(bars[2].mean_emission, 60.0);
    }

    #[test]
    fn options_and_span() {
        let ctx = context();
        assert_eq!(ctx.region_options(), ["R1", "R2", "None"]);
        assert_eq!(ctx.country_options(Some("R1")), vec!["A", "B"]);
        assert_eq!(ctx.year_span_label(), "2000 - 2001");
        assert_eq!(ctx.hierarchy_chart().total(), 132.0);
    }

    #[test]
    fn empty_dataset_is_rejected() {
        let err = DashboardContext::new(Vec::new(), vec![temperature("A", "R", 2000, 1.0)]);
        assert!(matches!(err, Err(DataError::Empty("emissions"))));
    }

    #[test]
    fn context_is_shareable_and_exports_json() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DashboardContext>();

        let ctx = Arc::new(context());
        let sel = Selection::new(Some("R1"), None);
        let emissions = ctx.emissions_chart(&sel);
        let temperature = ctx.temperature_chart(&sel);
        let bundle = ChartBundle {
            region: sel.region(),
            country: sel.country(),
            emissions: &emissions,
            temperature: &temperature,
            top_emitters: ctx.top_emitters_chart(),
            hierarchy: ctx.hierarchy_chart(),
        };
        let json = bundle.to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["region"], "R1");
        assert_eq!(value["emissions"]["series"][0]["year"], 2000);
        assert_eq!(value["top_emitters"]["bars"].as_array().unwrap().len(), 3);
    }
}
