use thiserror::Error;

/// Errors raised outside the per-event selection, which itself never fails.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The run cannot be normalized because no usable weight was accumulated.
    #[error("cannot normalize yields: sum of event weights is {sum_of_weights}")]
    ZeroSumOfWeights { sum_of_weights: f64 },

    /// The cross section handed to the normalizer is not a finite, non-negative number.
    #[error("invalid cross section: {0} pb")]
    InvalidCrossSection(f64),

    /// A configuration value is out of range.
    #[error("invalid configuration for `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("table error: {0}")]
    Table(#[from] polars::prelude::PolarsError),
}

impl AnalysisError {
    pub(crate) fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
