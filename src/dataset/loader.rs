//! Dataset loader for `<dataset>.csv` files.
//!
//! A file starts with a header naming the documented features in order followed
//! by a `target` column. Class targets may be written as indices (`0`) or names
//! (`class_0`).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::catalog::{DatasetId, TARGET_COLUMN, TargetKind};
use super::{Dataset, Target};
use crate::error::PipelineError;

#[derive(Debug, Error)]
enum DatasetLoadError {
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("header mismatch: expected [{expected}] but found [{found}]")]
    Header { expected: String, found: String },
    #[error("line {line}: column {column} has invalid value {value:?}")]
    Value {
        line: u64,
        column: String,
        value: String,
    },
    #[error("line {line}: unknown class {value:?}")]
    Class { line: u64, value: String },
    #[error("file contains no rows")]
    Empty,
    #[error(transparent)]
    Schema(#[from] PipelineError),
}

/// Load `id` from `<data_dir>/<id>.csv`.
pub fn load(id: DatasetId, data_dir: &Path) -> Result<Dataset, PipelineError> {
    let path = data_dir.join(id.file_name());
    tracing::info!("Loading dataset {id} from {}", path.display());
    let file = File::open(&path)
        .map_err(|source| DatasetLoadError::Io {
            path: path.display().to_string(),
            source,
        })
        .map_err(|err| unavailable(id, err))?;
    load_from_reader(id, file)
}

/// Parse a dataset file for `id` from any reader.
pub fn load_from_reader<R: Read>(id: DatasetId, reader: R) -> Result<Dataset, PipelineError> {
    let dataset = parse(id, reader).map_err(|err| unavailable(id, err))?;
    tracing::info!(
        "Loaded dataset {id}: {} rows x {} features",
        dataset.n_rows(),
        dataset.n_features()
    );
    Ok(dataset)
}

fn unavailable(id: DatasetId, err: DatasetLoadError) -> PipelineError {
    PipelineError::DataUnavailable {
        dataset: id.to_string(),
        reason: err.to_string(),
    }
}

fn parse<R: Read>(id: DatasetId, reader: R) -> Result<Dataset, DatasetLoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    check_header(id, csv_reader.headers()?)?;

    let features = id.feature_names();
    let mut records = Vec::new();
    let mut raw_target = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let line = record.position().map(|pos| pos.line()).unwrap_or(0);
        let mut row = Vec::with_capacity(features.len());
        for (column, field) in features.iter().zip(record.iter()) {
            row.push(parse_value(line, column, field)?);
        }
        let target_field = record.get(features.len()).unwrap_or_default();
        raw_target.push((line, target_field.to_string()));
        records.push(row);
    }
    if records.is_empty() {
        return Err(DatasetLoadError::Empty);
    }

    let target = match id.target_kind() {
        TargetKind::Classes(classes) => {
            let mut labels = Vec::with_capacity(raw_target.len());
            for (line, value) in &raw_target {
                labels.push(parse_class(*line, value, classes)?);
            }
            Target::Classes {
                labels,
                classes: classes.iter().map(|c| c.to_string()).collect(),
            }
        }
        TargetKind::Continuous(name) => {
            let mut values = Vec::with_capacity(raw_target.len());
            for (line, value) in &raw_target {
                values.push(parse_value(*line, TARGET_COLUMN, value)?);
            }
            Target::Continuous {
                name: name.to_string(),
                values,
            }
        }
    };

    let feature_names = features.iter().map(|f| f.to_string()).collect();
    Ok(Dataset::new(id.as_str(), feature_names, records, target)?)
}

fn check_header(id: DatasetId, header: &csv::StringRecord) -> Result<(), DatasetLoadError> {
    let expected: Vec<&str> = id
        .feature_names()
        .iter()
        .copied()
        .chain(std::iter::once(TARGET_COLUMN))
        .collect();
    let found: Vec<&str> = header.iter().collect();
    if found != expected {
        return Err(DatasetLoadError::Header {
            expected: expected.join(", "),
            found: found.join(", "),
        });
    }
    Ok(())
}

fn parse_value(line: u64, column: &str, field: &str) -> Result<f64, DatasetLoadError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| DatasetLoadError::Value {
            line,
            column: column.to_string(),
            value: field.to_string(),
        })
}

fn parse_class(line: u64, value: &str, classes: &[&str]) -> Result<usize, DatasetLoadError> {
    if let Some(idx) = classes.iter().position(|c| *c == value) {
        return Ok(idx);
    }
    value
        .parse::<usize>()
        .ok()
        .filter(|&idx| idx < classes.len())
        .ok_or_else(|| DatasetLoadError::Class {
            line,
            value: value.to_string(),
        })
}
