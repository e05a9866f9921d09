// src/export/mod.rs

mod csv;
mod model;
mod xlsx;

pub use model::{BatchRow, HEADERS};

use crate::errors::AppResult;
use clap::ValueEnum;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    /// File extension of the artifact.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }
}

/// Write a batch artifact in the requested format.
pub fn write_artifact(format: ExportFormat, rows: &[BatchRow], path: &Path) -> AppResult<()> {
    match format {
        ExportFormat::Csv => csv::write_csv(rows, path)?,
        ExportFormat::Xlsx => xlsx::write_xlsx(rows, path)?,
    }
    info!(
        "{} artifact written: {} ({} rows)",
        format.as_str().to_uppercase(),
        path.display(),
        rows.len()
    );
    Ok(())
}
