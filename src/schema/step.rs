//! Step - one iteration of the optimization loop

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A single cell value decoded from a tabular blob.
///
/// Serializes as a plain JSON scalar. Missing cells (nulls, NaN) are
/// represented as [`Scalar::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Boolean cell
    Bool(bool),
    /// Integer cell
    Int(i64),
    /// Floating-point cell
    Float(f64),
    /// Text cell
    Text(String),
    /// Missing cell
    Null,
}

impl Scalar {
    /// Convert a JSON value into a scalar. Arrays and objects are not scalars.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Some(Self::Null),
            Value::Bool(b) => Some(Self::Bool(*b)),
            Value::Number(n) => n.as_i64().map(Self::Int).or_else(|| n.as_f64().map(Self::float)),
            Value::String(s) => Some(Self::Text(s.clone())),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Float cell, folding NaN into [`Scalar::Null`].
    #[must_use]
    pub fn float(value: f64) -> Self {
        if value.is_nan() {
            Self::Null
        } else {
            Self::Float(value)
        }
    }

    /// Numeric view of the cell, if it holds a number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            Self::Bool(_) | Self::Text(_) | Self::Null => None,
        }
    }

    /// Whether the cell is missing.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
            Self::Null => Ok(()),
        }
    }
}

/// One decoded table row: column name to cell, in column order.
pub type Row = IndexMap<String, Scalar>;

/// Step represents one iteration of the optimization loop.
///
/// A step is created with `values_recommended` when the engine proposes a
/// trial and carries `values_used` once the trial has been executed. Steps
/// decoded from executed measurements only carry `values_used`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Step {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values_used: Option<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    values_recommended: Option<Row>,
}

impl Step {
    /// Create a step for an executed trial.
    #[must_use]
    pub const fn executed(values: Row) -> Self {
        Self {
            values_used: Some(values),
            values_recommended: None,
        }
    }

    /// Create a step for a proposed, not yet executed trial.
    #[must_use]
    pub const fn recommended(values: Row) -> Self {
        Self {
            values_used: None,
            values_recommended: Some(values),
        }
    }

    /// Realized values, once the trial has been executed.
    #[must_use]
    pub const fn values_used(&self) -> Option<&Row> {
        self.values_used.as_ref()
    }

    /// Proposed values, if the engine recommended them.
    #[must_use]
    pub const fn values_recommended(&self) -> Option<&Row> {
        self.values_recommended.as_ref()
    }

    /// Whether this step is a recommendation that has not been executed yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.values_used.is_none() && self.values_recommended.is_some()
    }

    /// Values shown for this step: used, falling back to recommended.
    #[must_use]
    pub fn display_values(&self) -> Option<&Row> {
        self.values_used.as_ref().or(self.values_recommended.as_ref())
    }
}

/// Check the ordering invariant of a step history.
///
/// Every step except the last must carry `values_used`. Returns the
/// 1-based ordinal of the first offending step.
pub(crate) fn first_unexecuted_before_last(steps: &[Step]) -> Option<usize> {
    let before_last = steps.len().saturating_sub(1);
    steps[..before_last]
        .iter()
        .position(|step| step.values_used.is_none())
        .map(|idx| idx + 1)
}
