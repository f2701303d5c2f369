use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes a Pandas export produces.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

/// One raw row of a source table: column_name → cell.
pub type Row = BTreeMap<String, CellValue>;

/// A record type that can be validated out of one raw row.
pub trait FromRow: Sized {
    /// Human-readable dataset name used in errors and logs.
    const DATASET: &'static str;
    /// Columns that must be present in the header / schema.
    const COLUMNS: &'static [&'static str];

    /// Build the record, or describe why the row is malformed.
    fn from_row(row: &Row) -> Result<Self, String>;
}

fn text_field(row: &Row, col: &str) -> Result<String, String> {
    match row.get(col) {
        Some(CellValue::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(CellValue::Integer(i)) => Ok(i.to_string()),
        Some(CellValue::String(_)) | Some(CellValue::Null) | None => {
            Err(format!("missing '{col}'"))
        }
        Some(other) => Err(format!("'{col}' is not text: {other}")),
    }
}

const YEAR_RANGE: std::ops::RangeInclusive<f64> = i32::MIN as f64..=i32::MAX as f64;

fn year_field(row: &Row, col: &str) -> Result<i32, String> {
    let year = match row.get(col) {
        Some(CellValue::Integer(i)) => i32::try_from(*i).ok(),
        Some(CellValue::Float(f)) if f.fract() == 0.0 && YEAR_RANGE.contains(f) => Some(*f as i32),
        Some(CellValue::String(s)) => s.trim().parse::<i32>().ok(),
        Some(CellValue::Null) | None => return Err(format!("missing '{col}'")),
        _ => None,
    };
    year.ok_or_else(|| format!("'{col}' is not a year: {}", row[col]))
}

/// An empty or null metric cell is kept as NaN and skipped by the
/// aggregations. A cell that is not there at all makes the row malformed.
fn metric_field(row: &Row, col: &str) -> Result<f64, String> {
    match row.get(col) {
        Some(CellValue::Float(f)) => Ok(*f),
        Some(CellValue::Integer(i)) => Ok(*i as f64),
        Some(CellValue::Null) => Ok(f64::NAN),
        None => Err(format!("missing '{col}'")),
        Some(CellValue::String(s)) if s.trim().is_empty() => Ok(f64::NAN),
        Some(CellValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("'{col}' is not a number: '{s}'")),
        Some(other) => Err(format!("'{col}' is not a number: {other}")),
    }
}

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

/// One row of the emissions-by-country-year table.
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    pub country: String,
    pub region: String,
    pub continent: String,
    pub year: i32,
    /// Tonnes of CO2, NaN when the source cell was empty.
    pub co2_emission: f64,
}

impl FromRow for EmissionRecord {
    const DATASET: &'static str = "emissions";
    const COLUMNS: &'static [&'static str] =
        &["Country", "Region", "Continent", "Year", "Co2_Emission"];

    fn from_row(row: &Row) -> Result<Self, String> {
        let co2_emission = metric_field(row, "Co2_Emission")?;
        if co2_emission < 0.0 {
            return Err(format!("negative 'Co2_Emission': {co2_emission}"));
        }
        Ok(EmissionRecord {
            country: text_field(row, "Country")?,
            region: text_field(row, "Region")?,
            continent: text_field(row, "Continent")?,
            year: year_field(row, "Year")?,
            co2_emission,
        })
    }
}

/// One row of the temperature-by-country-year table.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureRecord {
    pub country: String,
    pub region: String,
    pub year: i32,
    pub avg_temperature: f64,
}

impl FromRow for TemperatureRecord {
    const DATASET: &'static str = "temperature";
    const COLUMNS: &'static [&'static str] = &["Country", "Region", "Year", "AvgTemperature"];

    fn from_row(row: &Row) -> Result<Self, String> {
        Ok(TemperatureRecord {
            country: text_field(row, "Country")?,
            region: text_field(row, "Region")?,
            year: year_field(row, "Year")?,
            avg_temperature: metric_field(row, "AvgTemperature")?,
        })
    }
}

// ---------------------------------------------------------------------------
// AggregateSeries – year-indexed mean of a metric
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearPoint {
    pub year: i32,
    pub value: f64,
}

/// Points sorted ascending by year, one per year.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AggregateSeries {
    points: Vec<YearPoint>,
}

impl AggregateSeries {
    /// Callers guarantee `points` is sorted by year without duplicates.
    pub(crate) fn from_sorted(points: Vec<YearPoint>) -> Self {
        debug_assert!(points.windows(2).all(|w| w[0].year < w[1].year));
        AggregateSeries { points }
    }

    pub fn points(&self) -> &[YearPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn value_at(&self, year: i32) -> Option<f64> {
        self.points
            .binary_search_by_key(&year, |p| p.year)
            .ok()
            .map(|i| self.points[i].value)
    }

    /// `[year, value]` pairs ready for plotting, NaN gaps dropped.
    pub fn finite_xy(&self) -> Vec<[f64; 2]> {
        self.points
            .iter()
            .filter(|p| p.value.is_finite())
            .map(|p| [p.year as f64, p.value])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn emission_record_from_complete_row() {
        let r = row(&[
            ("Country", CellValue::String("France".into())),
            ("Region", CellValue::String("Western Europe".into())),
            ("Continent", CellValue::String("Europe".into())),
            ("Year", CellValue::Integer(2001)),
            ("Co2_Emission", CellValue::Float(5.5)),
        ]);
        let rec = EmissionRecord::from_row(&r).unwrap();
        assert_eq!(rec.country, "France");
        assert_eq!(rec.year, 2001);
        assert_eq!(rec.co2_emission, 5.5);
    }

    #[test]
    fn empty_metric_becomes_nan_but_missing_country_fails() {
        let r = row(&[
            ("Country", CellValue::String("Chad".into())),
            ("Region", CellValue::String("Middle Africa".into())),
            ("Year", CellValue::Float(1999.0)),
            ("AvgTemperature", CellValue::Null),
        ]);
        let rec = TemperatureRecord::from_row(&r).unwrap();
        assert!(rec.avg_temperature.is_nan());
        assert_eq!(rec.year, 1999);

        let mut bad = r.clone();
        bad.insert("Country".into(), CellValue::String("  ".into()));
        assert!(TemperatureRecord::from_row(&bad).is_err());
    }

    #[test]
    fn negative_emission_is_rejected() {
        let r = row(&[
            ("Country", CellValue::String("X".into())),
            ("Region", CellValue::String("R".into())),
            ("Continent", CellValue::String("C".into())),
            ("Year", CellValue::Integer(2000)),
            ("Co2_Emission", CellValue::Integer(-3)),
        ]);
        assert!(EmissionRecord::from_row(&r).is_err());
    }

    #[test]
    fn fractional_year_is_rejected() {
        let r = row(&[
            ("Country", CellValue::String("X".into())),
            ("Region", CellValue::String("R".into())),
            ("Year", CellValue::Float(2000.5)),
            ("AvgTemperature", CellValue::Float(10.0)),
        ]);
        let err = TemperatureRecord::from_row(&r).unwrap_err();
        assert!(err.contains("Year"));
    }

    #[test]
    fn out_of_range_float_year_is_rejected() {
        let r = row(&[
            ("Country", CellValue::String("X".into())),
            ("Region", CellValue::String("R".into())),
            ("Year", CellValue::Float(1e12)),
            ("AvgTemperature", CellValue::Float(10.0)),
        ]);
        let err = TemperatureRecord::from_row(&r).unwrap_err();
        assert!(err.contains("not a year"));
    }

    #[test]
    fn absent_metric_is_malformed_while_null_is_nan() {
        let mut r = row(&[
            ("Country", CellValue::String("Peru".into())),
            ("Region", CellValue::String("SA".into())),
            ("Year", CellValue::Integer(1995)),
        ]);
        let err = TemperatureRecord::from_row(&r).unwrap_err();
        assert_eq!(err, "missing 'AvgTemperature'");

        r.insert("AvgTemperature".into(), CellValue::String(String::new()));
        assert!(TemperatureRecord::from_row(&r).unwrap().avg_temperature.is_nan());
    }
}
