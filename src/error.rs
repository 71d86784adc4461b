//! Error types for bayes-record
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use std::fmt;

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Failure to resolve a single raw parameter descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    /// The `type` tag is not one of the known parameter variants
    #[error("Unknown parameter type '{0}'")]
    UnknownParameterType(String),

    /// The variant is recognized but cannot be represented
    #[error("Parameter type '{0}' is not implemented\nRemove the parameter or convert it to a categorical parameter")]
    NotImplemented(String),

    /// Continuous parameter with `lower >= upper` (or non-finite bounds)
    #[error("Invalid bounds: lower ({lower}) must be strictly less than upper ({upper})")]
    InvalidBounds {
        /// Lower bound as encoded
        lower: f64,
        /// Upper bound as encoded
        upper: f64,
    },

    /// Discrete or categorical parameter with no values
    #[error("Empty value set: a {0} parameter needs at least one value")]
    EmptyValueSet(String),

    /// A required field is missing or has the wrong shape
    #[error("Malformed parameter descriptor: {0}")]
    MalformedDescriptor(String),

    /// Another parameter of the record already uses this name
    #[error("Duplicate parameter name '{0}'")]
    DuplicateName(String),
}

/// One failing parameter inside an aggregated [`Error::ProjectionFailed`].
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterFailure {
    /// Position in the concatenated (discrete, then continuous) parameter list
    pub index: usize,
    /// Parameter name, when the descriptor carried one
    pub name: Option<String>,
    /// Why resolution failed
    pub error: ParameterError,
}

impl fmt::Display for ParameterFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "#{} '{}': {}", self.index, name, self.error),
            None => write!(f, "#{} <unnamed>: {}", self.index, self.error),
        }
    }
}

/// bayes-record error types
#[derive(Error, Debug)]
pub enum Error {
    /// A single parameter failed to resolve
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// A tabular blob could not be decoded
    #[error("Malformed table encoding: {0}")]
    MalformedTableEncoding(String),

    /// One or more parameters failed; no record was produced
    #[error("Projection failed: {} parameter(s) could not be resolved: {}", failures.len(), format_failures(failures))]
    ProjectionFailed {
        /// Every failing parameter, in declaration order
        failures: Vec<ParameterFailure>,
    },

    /// An executed step has no usable value for the objective target
    #[error("Missing target value: step {step} has no numeric value for '{target}'")]
    MissingTargetValue {
        /// 1-based step ordinal
        step: usize,
        /// Target column name
        target: String,
    },

    /// A non-parameter section of the raw record is missing or malformed
    #[error("Malformed record: field '{field}': {reason}")]
    MalformedRecord {
        /// Dotted path of the offending field
        field: String,
        /// What was wrong with it
        reason: String,
    },

    /// Recommender tree nests deeper than allowed
    #[error("Recommender nesting depth {depth} exceeds maximum {max}\nNested recommenders must not reference their ancestors")]
    RecommenderTooDeep {
        /// Depth reached
        depth: usize,
        /// Configured maximum
        max: usize,
    },

    /// Projector configuration rejected
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
}

fn format_failures(failures: &[ParameterFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Shorthand for [`Error::MalformedRecord`].
    pub(crate) fn malformed(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_failed_lists_every_name() {
        let error = Error::ProjectionFailed {
            failures: vec![
                ParameterFailure {
                    index: 0,
                    name: Some("solvent".to_string()),
                    error: ParameterError::NotImplemented("SubstanceParameter".to_string()),
                },
                ParameterFailure {
                    index: 2,
                    name: None,
                    error: ParameterError::UnknownParameterType("Mystery".to_string()),
                },
            ],
        };
        let msg = error.to_string();
        assert!(msg.contains("2 parameter(s)"));
        assert!(msg.contains("'solvent'"));
        assert!(msg.contains("<unnamed>"));
        assert!(msg.contains("Mystery"));
    }

    #[test]
    fn test_parameter_error_converts() {
        let error: Error = ParameterError::EmptyValueSet("categorical".to_string()).into();
        assert!(matches!(error, Error::Parameter(ParameterError::EmptyValueSet(_))));
    }
}
