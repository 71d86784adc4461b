//! Parameter - one dimension of the search space
//!
//! Raw descriptors arrive as tag-labeled JSON objects. [`resolve`] turns
//! one descriptor into exactly one arm of the closed [`ParameterKind`]
//! union, or fails with a [`ParameterError`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ParameterError;

/// Closed interval bounds (`lower < upper` for continuous parameters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

impl Bounds {
    /// Create bounds, rejecting `lower >= upper` and non-finite values.
    ///
    /// # Errors
    ///
    /// Returns [`ParameterError::InvalidBounds`] for an empty or unbounded interval.
    pub fn new(lower: f64, upper: f64) -> Result<Self, ParameterError> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(ParameterError::InvalidBounds { lower, upper });
        }
        Ok(Self { lower, upper })
    }
}

/// Tag set understood by the resolver.
///
/// `Substance` is recognized so that it can be rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterTag {
    /// `NumericalContinuousParameter`
    Continuous,
    /// `NumericalDiscreteParameter`
    NumericalDiscrete,
    /// `CategoricalParameter`
    Categorical,
    /// `SubstanceParameter` (unsupported)
    Substance,
}

impl ParameterTag {
    /// Canonical tag as written by the optimization engine.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Continuous => "NumericalContinuousParameter",
            Self::NumericalDiscrete => "NumericalDiscreteParameter",
            Self::Categorical => "CategoricalParameter",
            Self::Substance => "SubstanceParameter",
        }
    }
}

impl FromStr for ParameterTag {
    type Err = ParameterError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag {
            "NumericalContinuousParameter" | "Continuous" => Ok(Self::Continuous),
            "NumericalDiscreteParameter" | "NumericalDiscrete" => Ok(Self::NumericalDiscrete),
            "CategoricalParameter" | "Categorical" => Ok(Self::Categorical),
            "SubstanceParameter" | "Substance" => Ok(Self::Substance),
            other => Err(ParameterError::UnknownParameterType(other.to_string())),
        }
    }
}

/// Variant-specific payload of a [`Parameter`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ParameterKind {
    /// Real-valued parameter within bounds
    #[serde(rename = "NumericalContinuousParameter")]
    Continuous {
        /// Search interval
        bounds: Bounds,
    },
    /// Numeric parameter restricted to listed values
    #[serde(rename = "NumericalDiscreteParameter")]
    NumericalDiscrete {
        /// Allowed values, in declared order
        values: Vec<f64>,
        /// Matching tolerance for measured values
        #[serde(skip_serializing_if = "Option::is_none")]
        tolerance: Option<f64>,
    },
    /// Label-valued parameter
    #[serde(rename = "CategoricalParameter")]
    Categorical {
        /// Allowed labels, in declared order
        values: Vec<String>,
        /// Encoding used by the engine (e.g. `OHE`)
        #[serde(skip_serializing_if = "Option::is_none")]
        encoding: Option<String>,
    },
}

impl ParameterKind {
    /// Tag of this variant.
    #[must_use]
    pub const fn tag(&self) -> ParameterTag {
        match self {
            Self::Continuous { .. } => ParameterTag::Continuous,
            Self::NumericalDiscrete { .. } => ParameterTag::NumericalDiscrete,
            Self::Categorical { .. } => ParameterTag::Categorical,
        }
    }

    fn validate(&self) -> Result<(), ParameterError> {
        match self {
            Self::Continuous { bounds } => Bounds::new(bounds.lower, bounds.upper).map(drop),
            Self::NumericalDiscrete { values, .. } if values.is_empty() => {
                Err(ParameterError::EmptyValueSet("numerical discrete".to_string()))
            }
            Self::Categorical { values, .. } if values.is_empty() => {
                Err(ParameterError::EmptyValueSet("categorical".to_string()))
            }
            Self::NumericalDiscrete { .. } | Self::Categorical { .. } => Ok(()),
        }
    }
}

/// Parameter represents one typed dimension of the search space.
///
/// Serializes back to the engine's descriptor shape; deserialization goes
/// through [`resolve`] so a persisted parameter is validated like a raw one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Parameter {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    definition: Option<String>,
    #[serde(flatten)]
    kind: ParameterKind,
}

impl Parameter {
    /// Create a validated parameter.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty, bounds are invalid, or a value
    /// set is empty.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Result<Self, ParameterError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ParameterError::MalformedDescriptor(
                "'name' must not be empty".to_string(),
            ));
        }
        kind.validate()?;
        Ok(Self {
            name,
            definition: None,
            kind,
        })
    }

    /// Attach a reference to the external quantity this parameter mirrors.
    #[must_use]
    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Get the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the external quantity reference, if any.
    #[must_use]
    pub fn definition(&self) -> Option<&str> {
        self.definition.as_deref()
    }

    /// Get the variant payload.
    #[must_use]
    pub const fn kind(&self) -> &ParameterKind {
        &self.kind
    }

    /// Get the variant tag.
    #[must_use]
    pub const fn tag(&self) -> ParameterTag {
        self.kind.tag()
    }
}

impl TryFrom<Value> for Parameter {
    type Error = ParameterError;

    fn try_from(raw: Value) -> Result<Self, Self::Error> {
        resolve(&raw)
    }
}

/// Resolve one raw parameter descriptor into a typed [`Parameter`].
///
/// Pure function of its input.
///
/// # Errors
///
/// - [`ParameterError::UnknownParameterType`] for an unrecognized tag
/// - [`ParameterError::NotImplemented`] for substance parameters
/// - [`ParameterError::InvalidBounds`] for continuous `lower >= upper`
/// - [`ParameterError::EmptyValueSet`] for empty discrete/categorical values
/// - [`ParameterError::MalformedDescriptor`] for missing or ill-typed fields
///
/// # Example
///
/// ```rust
/// use bayes_record::schema::{resolve, ParameterTag};
///
/// let raw = serde_json::json!({
///     "type": "NumericalContinuousParameter",
///     "name": "temperature",
///     "bounds": {"lower": 300.0, "upper": 600.0}
/// });
/// let parameter = resolve(&raw)?;
/// assert_eq!(parameter.tag(), ParameterTag::Continuous);
/// # Ok::<(), bayes_record::ParameterError>(())
/// ```
pub fn resolve(raw: &Value) -> Result<Parameter, ParameterError> {
    let fields = raw.as_object().ok_or_else(|| {
        ParameterError::MalformedDescriptor("descriptor must be an object".to_string())
    })?;

    let tag: ParameterTag = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| ParameterError::MalformedDescriptor("missing 'type' tag".to_string()))?
        .parse()?;

    let kind = match tag {
        ParameterTag::Continuous => ParameterKind::Continuous {
            bounds: parse_bounds(fields.get("bounds"))?,
        },
        ParameterTag::NumericalDiscrete => ParameterKind::NumericalDiscrete {
            values: parse_list(fields, "values", Value::as_f64, "a number")?,
            tolerance: optional(fields, "tolerance", Value::as_f64, "a number")?,
        },
        ParameterTag::Categorical => ParameterKind::Categorical {
            values: parse_list(fields, "values", |v| v.as_str().map(str::to_string), "a string")?,
            encoding: optional(fields, "encoding", |v| v.as_str().map(str::to_string), "a string")?,
        },
        ParameterTag::Substance => {
            return Err(ParameterError::NotImplemented(tag.as_str().to_string()));
        }
    };

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| ParameterError::MalformedDescriptor("missing 'name'".to_string()))?;
    let definition = optional(
        fields,
        "definition",
        |v| v.as_str().map(str::to_string),
        "a string",
    )?;

    let mut parameter = Parameter::new(name, kind)?;
    parameter.definition = definition;
    Ok(parameter)
}

/// Best-effort name lookup for error reporting.
pub(crate) fn descriptor_name(raw: &Value) -> Option<String> {
    raw.get("name").and_then(Value::as_str).map(str::to_string)
}

fn parse_bounds(raw: Option<&Value>) -> Result<Bounds, ParameterError> {
    let malformed = || {
        ParameterError::MalformedDescriptor(
            "'bounds' must be {lower, upper} or a two-element array".to_string(),
        )
    };

    let (lower, upper) = match raw {
        Some(Value::Object(b)) => (
            b.get("lower").and_then(Value::as_f64),
            b.get("upper").and_then(Value::as_f64),
        ),
        Some(Value::Array(b)) if b.len() == 2 => (b[0].as_f64(), b[1].as_f64()),
        _ => return Err(malformed()),
    };
    match (lower, upper) {
        (Some(lower), Some(upper)) => Bounds::new(lower, upper),
        _ => Err(malformed()),
    }
}

fn parse_list<T>(
    fields: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
    expected: &str,
) -> Result<Vec<T>, ParameterError> {
    let items = fields
        .get(key)
        .and_then(Value::as_array)
        .ok_or_else(|| ParameterError::MalformedDescriptor(format!("'{key}' must be an array")))?;

    items
        .iter()
        .map(|item| {
            convert(item).ok_or_else(|| {
                ParameterError::MalformedDescriptor(format!(
                    "every entry of '{key}' must be {expected}, got {item}"
                ))
            })
        })
        .collect()
}

fn optional<T>(
    fields: &Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
    expected: &str,
) -> Result<Option<T>, ParameterError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => convert(value).map(Some).ok_or_else(|| {
            ParameterError::MalformedDescriptor(format!("'{key}' must be {expected}"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_resolve_categorical() {
        let raw = json!({
            "type": "CategoricalParameter",
            "name": "substrate",
            "values": ["SiC", "Si", "GaN"],
            "encoding": "OHE"
        });
        let parameter = resolve(&raw).unwrap();
        assert_eq!(parameter.name(), "substrate");
        assert_eq!(
            parameter.kind(),
            &ParameterKind::Categorical {
                values: vec!["SiC".into(), "Si".into(), "GaN".into()],
                encoding: Some("OHE".into()),
            }
        );
    }

    #[test]
    fn test_resolve_continuous_array_bounds() {
        let raw = json!({"type": "Continuous", "name": "t", "bounds": [300, 600]});
        let parameter = resolve(&raw).unwrap();
        assert_eq!(
            parameter.kind(),
            &ParameterKind::Continuous {
                bounds: Bounds {
                    lower: 300.0,
                    upper: 600.0
                }
            }
        );
    }

    #[test]
    fn test_resolve_invalid_bounds() {
        let raw = json!({
            "type": "Continuous",
            "name": "t",
            "bounds": {"lower": 5.0, "upper": 5.0}
        });
        assert_eq!(
            resolve(&raw),
            Err(ParameterError::InvalidBounds {
                lower: 5.0,
                upper: 5.0
            })
        );
    }

    #[test]
    fn test_resolve_empty_values() {
        let raw = json!({"type": "NumericalDiscreteParameter", "name": "n", "values": []});
        assert!(matches!(resolve(&raw), Err(ParameterError::EmptyValueSet(_))));

        let raw = json!({"type": "CategoricalParameter", "name": "c", "values": []});
        assert!(matches!(resolve(&raw), Err(ParameterError::EmptyValueSet(_))));
    }

    #[test]
    fn test_resolve_substance_not_implemented() {
        let raw = json!({
            "type": "SubstanceParameter",
            "name": "solvent",
            "values": [{"name": "water", "smiles": "O"}]
        });
        assert_eq!(
            resolve(&raw),
            Err(ParameterError::NotImplemented("SubstanceParameter".to_string()))
        );
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let raw = json!({"type": "TaskParameter", "name": "x"});
        assert_eq!(
            resolve(&raw),
            Err(ParameterError::UnknownParameterType("TaskParameter".to_string()))
        );
    }

    #[test]
    fn test_resolve_missing_fields() {
        assert!(matches!(
            resolve(&json!({"name": "x"})),
            Err(ParameterError::MalformedDescriptor(_))
        ));
        assert!(matches!(
            resolve(&json!({"type": "Categorical", "values": ["a"]})),
            Err(ParameterError::MalformedDescriptor(_))
        ));
        assert!(matches!(
            resolve(&json!({"type": "NumericalDiscrete", "name": "n", "values": [1, "two"]})),
            Err(ParameterError::MalformedDescriptor(_))
        ));
        assert!(matches!(resolve(&json!([1, 2])), Err(ParameterError::MalformedDescriptor(_))));
    }

    #[test]
    fn test_round_trip_discrete_with_definition() {
        let raw = json!({
            "type": "NumericalDiscreteParameter",
            "name": "pressure",
            "definition": "#/data/pressure",
            "values": [1.0, 2.5, 4.0],
            "tolerance": 0.1
        });
        let parameter = resolve(&raw).unwrap();
        assert_eq!(parameter.definition(), Some("#/data/pressure"));
        assert_eq!(serde_json::to_value(&parameter).unwrap(), raw);
    }

    #[test]
    fn test_deserialize_validates() {
        let bad = json!({"type": "Continuous", "name": "t", "bounds": [2.0, 1.0]});
        assert!(serde_json::from_value::<Parameter>(bad).is_err());
    }

    #[test]
    fn test_bounds_reject_unbounded() {
        assert!(Bounds::new(0.2, 5.0).is_ok());
        assert!(Bounds::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_round_trip_continuous() {
        let raw = json!({
            "type": "NumericalContinuousParameter",
            "name": "temperature",
            "bounds": {"lower": 300.0, "upper": 600.0}
        });
        let parameter = resolve(&raw).unwrap();
        assert_eq!(serde_json::to_value(&parameter).unwrap(), raw);
    }

    #[test]
    fn test_round_trip_canonicalizes_alias_and_array_bounds() {
        let raw = json!({"type": "Continuous", "name": "temperature", "bounds": [300.0, 600.0]});
        let parameter = resolve(&raw).unwrap();
        assert_eq!(
            serde_json::to_value(&parameter).unwrap(),
            json!({
                "type": "NumericalContinuousParameter",
                "name": "temperature",
                "bounds": {"lower": 300.0, "upper": 600.0}
            })
        );
    }

    #[test]
    fn test_round_trip_categorical_with_encoding() {
        let raw = json!({
            "type": "CategoricalParameter",
            "name": "substrate",
            "definition": "#/data/substrate",
            "values": ["SiC", "Si", "GaN"],
            "encoding": "OHE"
        });
        let parameter = resolve(&raw).unwrap();
        assert_eq!(serde_json::to_value(&parameter).unwrap(), raw);
    }
}
