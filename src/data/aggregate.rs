use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use super::model::{AggregateSeries, EmissionRecord, TemperatureRecord, YearPoint};

// ---------------------------------------------------------------------------
// Group-by-year mean
// ---------------------------------------------------------------------------

/// Mean of the metric per year, ascending by year.
///
/// NaN values are skipped (the Pandas default). A year whose values are all
/// NaN still yields a point, with a NaN value.
pub fn yearly_mean<I>(values: I) -> AggregateSeries
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let mut acc: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (year, value) in values {
        let slot = acc.entry(year).or_insert((0.0, 0));
        if !value.is_nan() {
            slot.0 += value;
            slot.1 += 1;
        }
    }

    let points = acc
        .into_iter()
        .map(|(year, (sum, n))| YearPoint {
            year,
            value: if n == 0 { f64::NAN } else { sum / n as f64 },
        })
        .collect();
    AggregateSeries::from_sorted(points)
}

// ---------------------------------------------------------------------------
// Precomputed temperature tables
// ---------------------------------------------------------------------------

/// Mean temperature by (Year, Country), by (Year, Region) and by Year,
/// built once at startup.
#[derive(Debug, Clone, Default)]
pub struct TemperatureTables {
    by_country: HashMap<String, AggregateSeries>,
    by_region: HashMap<String, AggregateSeries>,
    global: AggregateSeries,
}

impl TemperatureTables {
    pub fn build(records: &[TemperatureRecord]) -> Self {
        let mut countries: HashMap<&str, Vec<(i32, f64)>> = HashMap::new();
        let mut regions: HashMap<&str, Vec<(i32, f64)>> = HashMap::new();

        for r in records {
            countries
                .entry(r.country.as_str())
                .or_default()
                .push((r.year, r.avg_temperature));
            regions
                .entry(r.region.as_str())
                .or_default()
                .push((r.year, r.avg_temperature));
        }

        TemperatureTables {
            by_country: mean_per_group(countries),
            by_region: mean_per_group(regions),
            global: yearly_mean(records.iter().map(|r| (r.year, r.avg_temperature))),
        }
    }

    pub fn global(&self) -> &AggregateSeries {
        &self.global
    }

    pub fn region(&self, region: &str) -> Option<&AggregateSeries> {
        self.by_region.get(region)
    }

    pub fn country(&self, country: &str) -> Option<&AggregateSeries> {
        self.by_country.get(country)
    }
}

fn mean_per_group(groups: HashMap<&str, Vec<(i32, f64)>>) -> HashMap<String, AggregateSeries> {
    groups
        .into_iter()
        .map(|(name, values)| (name.to_string(), yearly_mean(values)))
        .collect()
}

// ---------------------------------------------------------------------------
// Top emitters ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCountry {
    pub country: String,
    pub mean_emission: f64,
}

/// The `n` countries with the highest mean emission, largest first.
///
/// Ties are broken by country name. Countries without a single valid value
/// are left out.
pub fn top_emitters(records: &[EmissionRecord], n: usize) -> Vec<RankedCountry> {
    let mut acc: HashMap<&str, (f64, usize)> = HashMap::new();
    for r in records {
        let slot = acc.entry(r.country.as_str()).or_insert((0.0, 0));
        if !r.co2_emission.is_nan() {
            slot.0 += r.co2_emission;
            slot.1 += 1;
        }
    }

    let mut ranked: Vec<RankedCountry> = acc
        .into_iter()
        .filter(|&(_, (_, count))| count > 0)
        .map(|(country, (sum, count))| RankedCountry {
            country: country.to_string(),
            mean_emission: sum / count as f64,
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.mean_emission
            .partial_cmp(&a.mean_emission)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.country.cmp(&b.country))
    });
    ranked.truncate(n);
    ranked
}

// ---------------------------------------------------------------------------
// Continent → Country hierarchy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryShare {
    pub name: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContinentShare {
    pub name: String,
    /// Sum of `countries[..].value`.
    pub value: f64,
    pub countries: Vec<CountryShare>,
}

/// Sum emissions per (Continent, Country) path, continents and countries in
/// first-seen order.
pub fn emission_hierarchy(records: &[EmissionRecord]) -> Vec<ContinentShare> {
    let mut continents: Vec<ContinentShare> = Vec::new();
    let mut continent_idx: HashMap<&str, usize> = HashMap::new();
    let mut country_idx: HashMap<(&str, &str), usize> = HashMap::new();

    for r in records {
        let ci = *continent_idx.entry(r.continent.as_str()).or_insert_with(|| {
            continents.push(ContinentShare {
                name: r.continent.clone(),
                value: 0.0,
                countries: Vec::new(),
            });
            continents.len() - 1
        });
        let continent = &mut continents[ci];

        let li = *country_idx
            .entry((r.continent.as_str(), r.country.as_str()))
            .or_insert_with(|| {
                continent.countries.push(CountryShare {
                    name: r.country.clone(),
                    value: 0.0,
                });
                continent.countries.len() - 1
            });

        if !r.co2_emission.is_nan() {
            continent.countries[li].value += r.co2_emission;
        }
    }

    for continent in &mut continents {
        continent.value = continent.countries.iter().map(|c| c.value).sum();
    }
    continents
}
