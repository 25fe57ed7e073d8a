// Error types for the pattern generator.
//
// Generation itself has exactly one failure mode (an unknown genre key);
// everything else in a request is clamped. The remaining enums cover the
// fallible edges around it: loading the genre catalogue and generator config
// from JSON, exporting MIDI, and writing datasets to disk.

use std::path::PathBuf;

/// Failure of `Generator::generate`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerateError {
    /// The requested genre key is not in the catalogue.
    #[error("unknown genre '{key}'")]
    UnknownGenre { key: String },
}

/// Failure while loading or validating a genre catalogue.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to parse genre catalogue: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate genre key '{0}'")]
    DuplicateKey(String),

    #[error("genre '{key}' is invalid: {reason}")]
    InvalidProfile { key: String, reason: String },

    #[error("genre catalogue is empty")]
    Empty,
}

/// Failure while loading or validating a `GeneratorConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Failure while writing a track as a Standard MIDI File.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode MIDI: {0}")]
    Encode(#[source] std::io::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure while generating a dataset directory.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to create dataset directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("failed to write dataset manifest: {0}")]
    Manifest(#[source] std::io::Error),

    #[error("failed to serialize dataset manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("no genres selected for dataset")]
    NoGenres,
}
