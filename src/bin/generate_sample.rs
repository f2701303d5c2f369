use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use serde::Serialize;

const FIRST_YEAR: i64 = 1995;
const LAST_YEAR: i64 = 2017;

/// (country, region, continent, base CO2 in Mt, base temperature in °F, yearly growth)
const COUNTRIES: &[(&str, &str, &str, f64, f64, f64)] = &[
    ("China", "Asia", "Asia", 3300.0, 58.0, 0.065),
    ("Japan", "Asia", "Asia", 1150.0, 60.0, 0.002),
    ("India", "Asia", "Asia", 850.0, 78.0, 0.055),
    ("Germany", "Europe", "Europe", 900.0, 49.0, -0.008),
    ("France", "Europe", "Europe", 360.0, 53.0, -0.006),
    ("Spain", "Europe", "Europe", 250.0, 60.0, 0.004),
    ("United States", "North America", "Americas", 5300.0, 55.0, 0.001),
    ("Canada", "North America", "Americas", 520.0, 42.0, 0.006),
    ("Brazil", "South America/Carribean", "Americas", 280.0, 76.0, 0.030),
    ("Peru", "South America/Carribean", "Americas", 25.0, 66.0, 0.040),
    ("Egypt", "Middle East", "Africa", 95.0, 72.0, 0.045),
    ("Nigeria", "Africa", "Africa", 75.0, 81.0, 0.020),
    ("South Africa", "Africa", "Africa", 370.0, 63.0, 0.012),
    ("Australia", "Australia/South Pacific", "Oceania", 320.0, 64.0, 0.010),
];

#[derive(Serialize)]
struct EmissionRow<'a> {
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Region")]
    region: &'a str,
    #[serde(rename = "Continent")]
    continent: &'a str,
    #[serde(rename = "Year")]
    year: i64,
    #[serde(rename = "Co2_Emission")]
    co2_emission: f64,
}

#[derive(Serialize)]
struct TemperatureRow<'a> {
    #[serde(rename = "Country")]
    country: &'a str,
    #[serde(rename = "Region")]
    region: &'a str,
    #[serde(rename = "Year")]
    year: i64,
    #[serde(rename = "AvgTemperature")]
    avg_temperature: f64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn write_parquet(path: &Path, rows: &[EmissionRow<'_>]) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("Country", DataType::Utf8, false),
        Field::new("Region", DataType::Utf8, false),
        Field::new("Continent", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("Co2_Emission", DataType::Float64, false),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(rows.iter().map(|r| r.country).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.region).collect::<Vec<_>>())),
            Arc::new(StringArray::from(rows.iter().map(|r| r.continent).collect::<Vec<_>>())),
            Arc::new(Int64Array::from(rows.iter().map(|r| r.year).collect::<Vec<_>>())),
            Arc::new(Float64Array::from(rows.iter().map(|r| r.co2_emission).collect::<Vec<_>>())),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let mut emissions = Vec::new();
    let mut temperatures = Vec::new();

    for &(country, region, continent, base_co2, base_temp, growth) in COUNTRIES {
        for year in FIRST_YEAR..=LAST_YEAR {
            let t = (year - FIRST_YEAR) as f64;
            let co2 = base_co2 * (1.0 + growth).powf(t) * (1.0 + rng.gauss(0.0, 0.03));
            emissions.push(EmissionRow {
                country,
                region,
                continent,
                year,
                co2_emission: co2.max(0.0),
            });

            // ~0.04 °F warming per year plus weather noise.
            let temp = base_temp + 0.04 * t + rng.gauss(0.0, 0.6);
            temperatures.push(TemperatureRow {
                country,
                region,
                year,
                avg_temperature: temp,
            });
        }
    }

    let out_dir = Path::new("data");
    std::fs::create_dir_all(out_dir).context("creating data directory")?;

    write_csv(&out_dir.join("co2_v2.csv"), &emissions)?;
    write_parquet(&out_dir.join("co2_v2.parquet"), &emissions)?;
    write_csv(&out_dir.join("Temperature.csv"), &temperatures)?;

    println!(
        "Wrote {} emission rows and {} temperature rows ({} countries, {FIRST_YEAR}-{LAST_YEAR}) to {}",
        emissions.len(),
        temperatures.len(),
        COUNTRIES.len(),
        out_dir.display()
    );
    Ok(())
}
