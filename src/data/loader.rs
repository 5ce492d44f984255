use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Array, Float32Array, Float64Array, Int32Array, Int64Array};
use nalgebra::DMatrix;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::{Deserialize, Serialize};

use super::chain::Chain;
use super::pulsar::{Pulsar, PulsarRecord};

/// Parameter-name files looked up next to a plain-text chain.
const PARAM_NAME_FILES: [&str; 2] = ["pars.txt", "params.txt"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load an MCMC chain from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.txt` / `.dat` – whitespace-separated rows (sampler output such as
///   `chain_1.txt`); names come from a sibling `pars.txt` if present
/// * `.csv`     – header row of column names, one row per draw
/// * `.json`    – `{ "params": [...], "samples": [[...], ...] }`
/// * `.parquet` – one numeric column per chain column
pub fn load_chain(path: &Path) -> Result<Chain> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let chain = match ext.as_str() {
        "txt" | "dat" => load_text(path),
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }?;

    log::info!(
        "Loaded chain {} with {} samples x {} columns",
        path.display(),
        chain.nsamples(),
        chain.ncols()
    );
    Ok(chain)
}

/// Load a pulsar dataset from its JSON record.
pub fn load_pulsar(path: &Path) -> Result<Pulsar> {
    let text = std::fs::read_to_string(path).context("reading pulsar JSON")?;
    let record: PulsarRecord = serde_json::from_str(&text).context("parsing pulsar JSON")?;
    let name = record.name.clone();
    let psr = Pulsar::try_from(record).with_context(|| format!("pulsar {name}"))?;
    log::info!("Loaded pulsar {} with {} TOAs", psr.name, psr.len());
    Ok(psr)
}

pub fn save_pulsar(psr: &Pulsar, path: &Path) -> Result<()> {
    let text = serde_json::to_string(&PulsarRecord::from(psr)).context("serializing pulsar")?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

// ---------------------------------------------------------------------------
// Plain-text loader
// ---------------------------------------------------------------------------

fn load_text(path: &Path) -> Result<Chain> {
    let text = std::fs::read_to_string(path).context("reading chain file")?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let row = line
            .split_whitespace()
            .enumerate()
            .map(|(j, tok)| {
                tok.parse::<f64>()
                    .with_context(|| format!("Line {}, column {j}: '{tok}' is not a number", line_no + 1))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let samples = rows_to_samples(&rows)?;
    match find_param_names(path)? {
        Some(params) => Ok(Chain::new(samples, params)?),
        None => Ok(Chain::unnamed(samples)),
    }
}

/// Read parameter names (one per line) from a file beside the chain.
fn find_param_names(chain_path: &Path) -> Result<Option<Vec<String>>> {
    let Some(dir) = chain_path.parent() else {
        return Ok(None);
    };
    for name in PARAM_NAME_FILES {
        let candidate = dir.join(name);
        if candidate.is_file() {
            let text = std::fs::read_to_string(&candidate)
                .with_context(|| format!("reading {}", candidate.display()))?;
            let params = text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect();
            log::debug!("Parameter names from {}", candidate.display());
            return Ok(Some(params));
        }
    }
    Ok(None)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with one name per column, then one row per draw.
fn load_csv(path: &Path) -> Result<Chain> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(j, v)| {
                v.trim()
                    .parse::<f64>()
                    .with_context(|| format!("CSV row {row_no}, column '{}': '{v}' is not a number", headers[j]))
            })
            .collect::<Result<Vec<f64>>>()?;
        rows.push(row);
    }

    let samples = rows_to_samples(&rows)?;
    if samples.nrows() > 0 && samples.ncols() != headers.len() {
        bail!("CSV has {} headers but {} columns", headers.len(), samples.ncols());
    }
    Ok(Chain::new(samples, headers)?)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema:
///
/// ```json
/// {
///   "params": ["gw_log10_A", "gw_gamma"],
///   "samples": [[-14.9, 4.33, -210.1, -205.3, 0.4, 1.0], ...]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainRecord {
    #[serde(default)]
    pub params: Vec<String>,
    pub samples: Vec<Vec<f64>>,
}

fn load_json(path: &Path) -> Result<Chain> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let record: ChainRecord = serde_json::from_str(&text).context("parsing chain JSON")?;
    let samples = rows_to_samples(&record.samples)?;
    if record.params.is_empty() {
        Ok(Chain::unnamed(samples))
    } else {
        Ok(Chain::new(samples, record.params)?)
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one numeric column (Float64, Float32, Int64 or
/// Int32) per chain column; the column names become parameter names.
fn load_parquet(path: &Path) -> Result<Chain> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut columns: Vec<Vec<f64>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in columns.iter_mut().enumerate() {
            let values = extract_f64_column(batch.column(col_idx))
                .with_context(|| format!("column '{}'", names[col_idx]))?;
            column.extend(values);
        }
    }

    let nrows = columns.first().map_or(0, Vec::len);
    let samples = DMatrix::from_fn(nrows, columns.len(), |r, c| columns[c][r]);
    Ok(Chain::new(samples, names)?)
}

/// Convert a numeric Arrow column to `f64`, nulls become NaN.
fn extract_f64_column(col: &Arc<dyn Array>) -> Result<Vec<f64>> {
    let any = col.as_any();
    if let Some(arr) = any.downcast_ref::<Float64Array>() {
        Ok(arr.iter().map(|v| v.unwrap_or(f64::NAN)).collect())
    } else if let Some(arr) = any.downcast_ref::<Float32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int64Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, |i| i as f64)).collect())
    } else if let Some(arr) = any.downcast_ref::<Int32Array>() {
        Ok(arr.iter().map(|v| v.map_or(f64::NAN, f64::from)).collect())
    } else {
        bail!("Expected a numeric column, got {:?}", col.data_type())
    }
}

// -- helpers --

fn rows_to_samples(rows: &[Vec<f64>]) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != ncols) {
        bail!("Row {i}: expected {ncols} columns, found {}", row.len());
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |r, c| rows[r][c]))
}
