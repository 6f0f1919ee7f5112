use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn one country's source into an [`OccupationTable`].
///
/// [`OccupationTable`]: crate::data::model::OccupationTable
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("data file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {file}")]
    Parse {
        file: String,
        #[source]
        source: anyhow::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unknown export format '{0}' (expected csv or excel)")]
    UnknownFormat(String),

    #[error("writing CSV")]
    Csv(#[from] csv::Error),

    #[error("writing Excel workbook")]
    Excel(#[from] rust_xlsxwriter::XlsxError),

    #[error("finishing CSV buffer")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read country registry {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid country registry {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("country registry {} is empty", .0.display())]
    Empty(PathBuf),
}
