use serde::Serialize;

use super::aggregate::{ContinentShare, RankedCountry};
use super::model::AggregateSeries;

// ---------------------------------------------------------------------------
// Chart payloads handed to the UI (and to the JSON export)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineChart {
    pub title: String,
    pub y_label: &'static str,
    pub series: AggregateSeries,
}

/// Horizontal bars in display order: the largest value comes last so it is
/// drawn at the top of the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingChart {
    pub title: String,
    pub bars: Vec<RankedCountry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyChart {
    pub title: String,
    pub continents: Vec<ContinentShare>,
}

impl HierarchyChart {
    pub fn total(&self) -> f64 {
        self.continents.iter().map(|c| c.value).sum()
    }
}

/// Everything the dashboard shows for one selection.
#[derive(Debug, Clone, Serialize)]
pub struct ChartBundle<'a> {
    pub region: Option<&'a str>,
    pub country: Option<&'a str>,
    pub emissions: &'a LineChart,
    pub temperature: &'a LineChart,
    pub top_emitters: &'a RankingChart,
    pub hierarchy: &'a HierarchyChart,
}

impl ChartBundle<'_> {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
