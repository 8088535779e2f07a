use std::fs;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, WriterBuilder};
use sbank_core::errors::{ErrorInfo, SbankError};
use sbank_core::SchemaVersion;
use serde::{Deserialize, Serialize};

use crate::bank::Bank;

/// Schema written into JSON bank files.
pub const BANK_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// On-disk encoding of a bank file, chosen from its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankFormat {
    /// `{schema, x1: [...], x2: [...]}` column layout.
    Json,
    /// Two columns with an `x1,x2` header.
    Csv,
}

impl BankFormat {
    /// Infers the format from a `.json` or `.csv` extension.
    pub fn from_path(path: &Path) -> Result<Self, SbankError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(BankFormat::Json),
            Some("csv") => Ok(BankFormat::Csv),
            _ => Err(SbankError::Config(
                ErrorInfo::new("bank-format", "unsupported bank file extension")
                    .with_context("path", path.display().to_string())
                    .with_hint("use a .json or .csv file"),
            )),
        }
    }
}

/// JSON payload of a bank file, one array per coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankFile {
    /// Schema the file was written with.
    #[serde(default)]
    pub schema: SchemaVersion,
    /// First coordinates in bank order.
    pub x1: Vec<f64>,
    /// Second coordinates in bank order.
    pub x2: Vec<f64>,
}

impl BankFile {
    /// Column layout of a list of points.
    pub fn from_coordinates(coordinates: &[[f64; 2]]) -> Self {
        Self {
            schema: BANK_SCHEMA,
            x1: coordinates.iter().map(|point| point[0]).collect(),
            x2: coordinates.iter().map(|point| point[1]).collect(),
        }
    }

    /// Snapshot of a bank, optionally dropping the seed templates.
    pub fn from_bank(bank: &Bank, exclude_seed: bool) -> Self {
        let coordinates: Vec<[f64; 2]> = bank
            .iter()
            .filter(|template| !(exclude_seed && template.is_seed_point()))
            .map(|template| template.params())
            .collect();
        Self::from_coordinates(&coordinates)
    }

    /// Points in file order.
    pub fn coordinates(&self) -> Vec<[f64; 2]> {
        self.x1
            .iter()
            .zip(&self.x2)
            .map(|(x1, x2)| [*x1, *x2])
            .collect()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.x1.len()
    }

    /// Returns `true` when the file holds no point.
    pub fn is_empty(&self) -> bool {
        self.x1.is_empty()
    }

    /// Writes the payload as pretty JSON.
    pub fn store(&self, path: &Path) -> Result<(), SbankError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("bank-serialize", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        fs::write(path, json).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("bank-write", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Loads and validates a JSON bank file.
    pub fn load(path: &Path) -> Result<Self, SbankError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("bank-read", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        let file: BankFile = serde_json::from_str(&contents).map_err(|err| {
            SbankError::Serde(
                ErrorInfo::new("bank-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })?;
        if !BANK_SCHEMA.accepts(&file.schema) {
            return Err(SbankError::Serde(
                ErrorInfo::new("bank-schema", "unsupported bank schema version")
                    .with_context("path", path.display().to_string())
                    .with_context(
                        "schema",
                        format!(
                            "{}.{}.{}",
                            file.schema.major, file.schema.minor, file.schema.patch
                        ),
                    ),
            ));
        }
        if file.x1.len() != file.x2.len() {
            return Err(SbankError::Serde(
                ErrorInfo::new("bank-shape", "x1 and x2 columns differ in length")
                    .with_context("path", path.display().to_string())
                    .with_context("x1", file.x1.len().to_string())
                    .with_context("x2", file.x2.len().to_string()),
            ));
        }
        Ok(file)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvPoint {
    x1: f64,
    x2: f64,
}

fn wrap_csv(code: &str, path: &Path, err: csv::Error) -> SbankError {
    SbankError::Serde(
        ErrorInfo::new(code, "CSV bank failure")
            .with_context("path", path.display().to_string())
            .with_hint(err.to_string()),
    )
}

fn read_csv(path: &Path) -> Result<Vec<[f64; 2]>, SbankError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| wrap_csv("bank-read", path, err))?;
    reader
        .deserialize::<CsvPoint>()
        .map(|row| {
            row.map(|point| [point.x1, point.x2])
                .map_err(|err| wrap_csv("bank-parse", path, err))
        })
        .collect()
}

fn write_csv(path: &Path, coordinates: &[[f64; 2]]) -> Result<(), SbankError> {
    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|err| wrap_csv("bank-write", path, err))?;
    for [x1, x2] in coordinates {
        writer
            .serialize(CsvPoint { x1: *x1, x2: *x2 })
            .map_err(|err| wrap_csv("bank-write", path, err))?;
    }
    writer
        .flush()
        .map_err(|err| wrap_csv("bank-flush", path, err.into()))
}

/// Reads the points of a bank file in either format.
pub fn read_coordinates(path: &Path) -> Result<Vec<[f64; 2]>, SbankError> {
    match BankFormat::from_path(path)? {
        BankFormat::Json => Ok(BankFile::load(path)?.coordinates()),
        BankFormat::Csv => read_csv(path),
    }
}

/// Writes points to a bank file in the format implied by its extension.
pub fn write_coordinates(path: &Path, coordinates: &[[f64; 2]]) -> Result<(), SbankError> {
    match BankFormat::from_path(path)? {
        BankFormat::Json => BankFile::from_coordinates(coordinates).store(path),
        BankFormat::Csv => write_csv(path, coordinates),
    }
}

/// Reads several seed files in order, concatenating their points.
pub fn read_seed_files(paths: &[PathBuf]) -> Result<Vec<[f64; 2]>, SbankError> {
    let mut coordinates = Vec::new();
    for path in paths {
        coordinates.extend(read_coordinates(path)?);
    }
    Ok(coordinates)
}

/// Rejects an output path that would overwrite one of the seed banks.
pub fn check_output_collision(seeds: &[PathBuf], output: &Path) -> Result<(), SbankError> {
    let resolved_output = fs::canonicalize(output).ok();
    for seed in seeds {
        let same_file = seed.as_path() == output
            || matches!(
                (fs::canonicalize(seed).ok(), &resolved_output),
                (Some(a), Some(b)) if &a == b
            );
        if same_file {
            return Err(SbankError::Config(
                ErrorInfo::new("seed-output-collision", "output bank would overwrite a seed bank")
                    .with_context("seed", seed.display().to_string())
                    .with_context("output", output.display().to_string())
                    .with_hint("choose a different output path"),
            ));
        }
    }
    Ok(())
}
