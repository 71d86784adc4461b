//! Objective - what the campaign optimizes

use serde::{Deserialize, Serialize};

use super::Bounds;

/// How the target value is optimized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetMode {
    /// Drive the value towards a window given by the target bounds.
    Match,
    /// Maximize the value.
    Max,
    /// Minimize the value.
    Min,
}

/// How raw objective values are reshaped before optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Transformation {
    /// Bell curve centered between the bounds
    Bell,
    /// Linear ramp between the bounds
    Linear,
    /// Triangle peaking between the bounds
    Triangular,
}

/// Target type tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    /// Scalar numerical target
    #[default]
    NumericalTarget,
}

/// Objective type tag. Only single-target objectives are modeled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectiveType {
    /// One target
    #[default]
    SingleTargetObjective,
}

/// The scalar quantity the campaign is trying to optimize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Target type tag
    #[serde(rename = "type", default)]
    pub kind: TargetType,
    /// Target column name in the measurements table
    pub name: String,
    /// Optimization mode
    pub mode: TargetMode,
    /// Value reshaping, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<Transformation>,
    /// Target window, required for `MATCH`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Bounds>,
}

/// Objective of the campaign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    /// Objective type tag
    #[serde(rename = "type", default)]
    pub kind: ObjectiveType,
    /// The single target
    pub target: Target,
}

impl Objective {
    /// Create a single-target objective.
    #[must_use]
    pub fn single(target: Target) -> Self {
        Self {
            kind: ObjectiveType::SingleTargetObjective,
            target,
        }
    }

    /// Name of the target column.
    #[must_use]
    pub fn target_name(&self) -> &str {
        &self.target.name
    }

    /// Check cross-field constraints serde cannot express.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.target.name.is_empty() {
            return Err("target name must not be empty".to_string());
        }
        match (self.target.mode, self.target.bounds) {
            (TargetMode::Match, None) => Err("MATCH targets require bounds".to_string()),
            (_, Some(b)) => Bounds::new(b.lower, b.upper)
                .map(drop)
                .map_err(|e| format!("target bounds: {e}")),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn refractive_index() -> serde_json::Value {
        json!({
            "type": "SingleTargetObjective",
            "target": {
                "type": "NumericalTarget",
                "name": "refractive_index",
                "mode": "MATCH",
                "bounds": {"lower": 2.4473, "upper": 2.8473},
                "transformation": "BELL"
            }
        })
    }

    #[test]
    fn test_objective_deserialize() {
        let objective: Objective = serde_json::from_value(refractive_index()).unwrap();
        assert_eq!(objective.target_name(), "refractive_index");
        assert_eq!(objective.target.mode, TargetMode::Match);
        assert_eq!(objective.target.transformation, Some(Transformation::Bell));
        assert!(objective.check().is_ok());
    }

    #[test]
    fn test_objective_round_trip() {
        let objective: Objective = serde_json::from_value(refractive_index()).unwrap();
        assert_eq!(serde_json::to_value(&objective).unwrap(), refractive_index());
    }

    #[test]
    fn test_match_without_bounds_rejected() {
        let objective = Objective::single(Target {
            kind: TargetType::NumericalTarget,
            name: "yield".to_string(),
            mode: TargetMode::Match,
            transformation: None,
            bounds: None,
        });
        assert!(objective.check().is_err());
    }

    #[test]
    fn test_target_bounds_checked() {
        let target = |lower: f64, upper: f64| {
            Objective::single(Target {
                kind: TargetType::NumericalTarget,
                name: "refractive_index".to_string(),
                mode: TargetMode::Max,
                transformation: None,
                bounds: Some(Bounds { lower, upper }),
            })
        };
        assert!(target(2.4, 2.8).check().is_ok());
        assert!(target(2.8, 2.4).check().is_err());
        assert!(target(2.4, 2.4).check().is_err());
        assert!(target(f64::NAN, 2.8).check().is_err());
        assert!(target(2.4, f64::INFINITY).check().is_err());
    }

    #[test]
    fn test_unknown_mode_rejected() {
        let raw = json!({"target": {"name": "y", "mode": "SIDEWAYS"}});
        assert!(serde_json::from_value::<Objective>(raw).is_err());
    }
}
