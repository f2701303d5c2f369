use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, BooleanArray, Float32Array, Float64Array, Int16Array, Int32Array,
    Int64Array, LargeStringArray, StringArray,
};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, FromRow, Row};
use crate::error::DataError;

/// How many skipped rows are spelled out in the log before summarising.
const LOGGED_ROW_ERRORS: usize = 5;

/// A source row that was dropped during validation.
#[derive(Debug, Clone)]
pub struct RowError {
    /// 1-based line (CSV) or record position (JSON / Parquet).
    pub line: usize,
    pub message: String,
}

/// Validated records plus what was dropped on the way.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub records: Vec<T>,
    pub skipped: Vec<RowError>,
    pub rows_read: usize,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load one dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row, one record per line
/// * `.json`    – `[{ "Country": ..., "Year": ..., ... }, ...]`
/// * `.parquet` – flat columns as written by `df.to_parquet()`
///
/// Malformed rows are skipped and reported; a missing column or a file with
/// no usable rows is an error.
pub fn load_file<T: FromRow>(path: &Path) -> Result<Loaded<T>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let loaded = match ext.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening CSV '{}'", path.display()))?;
            read_csv::<T, _>(file)
        }
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading JSON '{}'", path.display()))?;
            read_json::<T>(&text)
        }
        "parquet" | "pq" => load_parquet::<T>(path),
        other => return Err(DataError::UnsupportedFormat(other.to_string()).into()),
    }
    .with_context(|| format!("loading {} data from '{}'", T::DATASET, path.display()))?;

    if loaded.records.is_empty() {
        bail!(DataError::Empty(T::DATASET));
    }

    log::info!(
        "Loaded {} {} records from {} ({} rows read)",
        loaded.records.len(),
        T::DATASET,
        path.display(),
        loaded.rows_read
    );
    report_skipped::<T>(&loaded.skipped);

    Ok(loaded)
}

fn report_skipped<T: FromRow>(skipped: &[RowError]) {
    if skipped.is_empty() {
        return;
    }
    for err in skipped.iter().take(LOGGED_ROW_ERRORS) {
        log::warn!("Skipping {} row {}: {}", T::DATASET, err.line, err.message);
    }
    if skipped.len() > LOGGED_ROW_ERRORS {
        log::warn!(
            "... and {} more malformed {} rows",
            skipped.len() - LOGGED_ROW_ERRORS,
            T::DATASET
        );
    }
}

fn ensure_columns<T: FromRow, S: AsRef<str>>(columns: &[S]) -> Result<()> {
    for &required in T::COLUMNS {
        if !columns.iter().any(|c| c.as_ref() == required) {
            bail!(DataError::MissingColumn {
                dataset: T::DATASET,
                column: required,
            });
        }
    }
    Ok(())
}

fn validate<T: FromRow>(rows: impl IntoIterator<Item = (usize, Row)>) -> Loaded<T> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    let mut rows_read = 0;

    for (line, row) in rows {
        rows_read += 1;
        match T::from_row(&row) {
            Ok(rec) => records.push(rec),
            Err(message) => skipped.push(RowError { line, message }),
        }
    }

    Loaded {
        records,
        skipped,
        rows_read,
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, then one record per line.
/// Short or unreadable lines are reported as skipped rows.
pub fn read_csv<T: FromRow, R: Read>(input: R) -> Result<Loaded<T>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    ensure_columns::<T, _>(headers.as_slice())?;

    let mut rows = Vec::new();
    let mut broken = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let line = row_no + 2;
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                broken.push(RowError {
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        // A short line leaves its trailing columns out of the row entirely.
        let row: Row = headers
            .iter()
            .enumerate()
            .filter_map(|(col_idx, name)| {
                record
                    .get(col_idx)
                    .map(|raw| (name.clone(), guess_cell_type(raw)))
            })
            .collect();
        rows.push((line, row));
    }

    let mut loaded = validate::<T>(rows);
    loaded.rows_read += broken.len();
    loaded.skipped.extend(broken);
    loaded.skipped.sort_by_key(|e| e.line);
    Ok(loaded)
}

fn guess_cell_type(s: &str) -> CellValue {
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::Float(f);
    }
    if s == "true" || s == "false" {
        return CellValue::Bool(s == "true");
    }
    CellValue::String(s.to_string())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Country": "France", "Region": "Western Europe", "Year": 2001, ... },
///   ...
/// ]
/// ```
pub fn read_json<T: FromRow>(text: &str) -> Result<Loaded<T>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut columns = BTreeSet::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Record {i} is not a JSON object"))?;

        let row: Row = obj
            .iter()
            .map(|(key, val)| {
                columns.insert(key.as_str());
                (key.clone(), json_to_cell(val))
            })
            .collect();
        rows.push((i + 1, row));
    }

    if !rows.is_empty() {
        let columns: Vec<&str> = columns.into_iter().collect();
        ensure_columns::<T, _>(columns.as_slice())?;
    }

    Ok(validate(rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::String(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). String, integer and float columns are
/// accepted for every field; the record validation decides what fits.
/// Dictionary-encoded (categorical) and view string columns are decoded
/// to plain arrays first.
fn load_parquet<T: FromRow>(path: &Path) -> Result<Loaded<T>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;

    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    ensure_columns::<T, _>(names.as_slice())?;

    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();
    let mut offset = 0;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let columns = batch
            .columns()
            .iter()
            .zip(schema.fields().iter())
            .map(|(col, field)| {
                decode_column(col)
                    .with_context(|| format!("decoding parquet column '{}'", field.name()))
            })
            .collect::<Result<Vec<_>>>()?;

        for row_idx in 0..batch.num_rows() {
            let row: Row = schema
                .fields()
                .iter()
                .enumerate()
                .map(|(col_idx, field)| {
                    let value = extract_cell(&columns[col_idx], row_idx);
                    (field.name().clone(), value)
                })
                .collect();
            rows.push((offset + row_idx + 1, row));
        }
        offset += batch.num_rows();
    }

    Ok(validate(rows))
}

// -- Parquet / Arrow helpers --

/// Unpack dictionary and view encodings into the plain array types
/// `extract_cell` reads.
fn decode_column(col: &ArrayRef) -> Result<ArrayRef> {
    let target = match col.data_type() {
        DataType::Dictionary(_, values) => match values.as_ref() {
            DataType::Utf8View => DataType::Utf8,
            other => other.clone(),
        },
        DataType::Utf8View => DataType::Utf8,
        _ => return Ok(Arc::clone(col)),
    };
    Ok(cast(col, &target)?)
}

/// Extract a single cell from an Arrow column at a given row. Column types
/// with no cell equivalent read as null, which fails record validation.
fn extract_cell(col: &ArrayRef, row: usize) -> CellValue {
    if col.is_null(row) {
        return CellValue::Null;
    }
    let any = col.as_any();
    let cell = match col.data_type() {
        DataType::Utf8 => any
            .downcast_ref::<StringArray>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::LargeUtf8 => any
            .downcast_ref::<LargeStringArray>()
            .map(|a| CellValue::String(a.value(row).to_string())),
        DataType::Int16 => any
            .downcast_ref::<Int16Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int32 => any
            .downcast_ref::<Int32Array>()
            .map(|a| CellValue::Integer(a.value(row) as i64)),
        DataType::Int64 => any
            .downcast_ref::<Int64Array>()
            .map(|a| CellValue::Integer(a.value(row))),
        DataType::Float32 => any
            .downcast_ref::<Float32Array>()
            .map(|a| CellValue::Float(a.value(row) as f64)),
        DataType::Float64 => any
            .downcast_ref::<Float64Array>()
            .map(|a| CellValue::Float(a.value(row))),
        DataType::Boolean => any
            .downcast_ref::<BooleanArray>()
            .map(|a| CellValue::Bool(a.value(row))),
        _ => None,
    };
    cell.unwrap_or(CellValue::Null)
}
