use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::store::Column;

/// Error type for dataset loading, selection validation, rendering, and export.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("dataset '{}' is unavailable: {reason}", path.display())]
    DataUnavailable { path: PathBuf, reason: String },
    #[error("optional column '{0}' is missing from the dataset")]
    MissingOptionalColumn(Column),
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("render failure: {0}")]
    Render(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
