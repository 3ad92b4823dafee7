//! Error taxonomy for resource computations.
//!
//! Numeric edge cases (night, polar regions, NaN inputs) are clamped or
//! zeroed where they occur and never reach this type. Everything here is
//! structural and aborts the enclosing region/technology job.

use thiserror::Error;

use crate::hours::HourSpan;
use crate::technology::Technology;

/// Result type alias using ResourceError.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Primary error type for resource computations.
#[derive(Debug, Error)]
pub enum ResourceError {
    // === Geometry Errors ===
    #[error("invalid window: {0}")]
    InvalidWindow(String),

    // === Data Errors ===
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    // === Execution Errors ===
    #[error("{technology} failed to load region '{region}': {source}")]
    Region {
        technology: Technology,
        region: String,
        #[source]
        source: Box<ResourceError>,
    },

    #[error("worker failed for {technology} in region '{region}' (hours {hours}): {source}")]
    WorkerFailure {
        technology: Technology,
        region: String,
        hours: HourSpan,
        #[source]
        source: Box<ResourceError>,
    },

    // === Infrastructure Errors ===
    #[error("configuration error: {0}")]
    Config(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl ResourceError {
    /// Create an InvalidWindow error.
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }

    /// Create a MissingData error.
    pub fn missing_data(msg: impl Into<String>) -> Self {
        Self::MissingData(msg.into())
    }

    /// Create a NumericDegeneracy error.
    pub fn numeric_degeneracy(msg: impl Into<String>) -> Self {
        Self::NumericDegeneracy(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a Storage error.
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Wrap an error raised inside a worker with the job context.
    pub fn worker_failure(
        technology: Technology,
        region: impl Into<String>,
        hours: HourSpan,
        source: ResourceError,
    ) -> Self {
        Self::WorkerFailure {
            technology,
            region: region.into(),
            hours,
            source: Box::new(source),
        }
    }

    /// Wrap an error raised while preparing a region's inputs.
    pub fn region_failure(technology: Technology, region: impl Into<String>, source: ResourceError) -> Self {
        Self::Region {
            technology,
            region: region.into(),
            source: Box::new(source),
        }
    }

    /// Innermost error beneath any region or worker context.
    pub fn root_cause(&self) -> &ResourceError {
        match self {
            Self::Region { source, .. } | Self::WorkerFailure { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidWindow(_) => "invalid_window",
            Self::MissingData(_) => "missing_data",
            Self::NumericDegeneracy(_) => "numeric_degeneracy",
            Self::Region { .. } => "region",
            Self::WorkerFailure { .. } => "worker_failure",
            Self::Config(_) => "config",
            Self::Storage(_) => "storage",
        }
    }
}

impl From<std::io::Error> for ResourceError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ResourceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(format!("JSON error: {}", err))
    }
}
