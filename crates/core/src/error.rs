// crates/core/src/error.rs
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or writing a review table
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Dataset file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("Permission denied reading file: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("IO error accessing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed CSV in {path}: {message}")]
    MalformedCsv { path: PathBuf, message: String },

    #[error("Dataset {path} has no `{column}` column")]
    MissingColumn { path: PathBuf, column: String },
}

impl DatasetError {
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            _ => Self::Io { path, source },
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        let path = path.into();
        if let csv::ErrorKind::Io(_) = source.kind() {
            // csv::Error only exposes its inner io::Error by value
            return match source.into_kind() {
                csv::ErrorKind::Io(io) => Self::io(path, io),
                other => Self::MalformedCsv {
                    path,
                    message: format!("{other:?}"),
                },
            };
        }
        Self::MalformedCsv {
            path,
            message: source.to_string(),
        }
    }
}

/// Errors that abort the primary pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("Failed to render chart {path}: {message}")]
    Chart { path: PathBuf, message: String },

    #[error("IO error writing {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub fn output(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Output {
            path: path.into(),
            source,
        }
    }
}
