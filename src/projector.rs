//! Record projector - raw campaign to typed record
//!
//! ```text
//! raw campaign ─┬─ searchspace.discrete.parameters ──┐
//!               ├─ searchspace.continuous.parameters ─┴─> resolve (all-or-nothing)
//!               ├─ objective / recommender ──────────────> typed sections
//!               ├─ _measurements_exp ──────> decode ─┐
//!               └─ _cached_recommendation ─> decode ─┴──> build_steps ─> status
//! ```
//!
//! Toyota Way: Poka-Yoke. A campaign with any unresolvable parameter
//! yields no record at all, and every failing parameter is reported at
//! once.
//!
//! Projection is deterministic: the same raw campaign and signals always
//! produce an identical record.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::config::ProjectorConfig;
use crate::error::{ParameterError, ParameterFailure};
use crate::history::build_steps;
use crate::schema::{
    descriptor_name, resolve, BayesianOptimizationRecord, CampaignSignals, Objective, Parameter,
    Recommender,
};
use crate::{table, Error, Result};

/// Search space sections, in concatenation order.
const SEARCHSPACE_SECTIONS: [&str; 2] = ["discrete", "continuous"];

/// Projects raw campaign records into [`BayesianOptimizationRecord`]s.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    config: ProjectorConfig,
}

impl Projector {
    /// Create a projector with the given configuration.
    #[must_use]
    pub const fn new(config: ProjectorConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    #[must_use]
    pub const fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Project a raw campaign with no engine signals.
    ///
    /// # Errors
    ///
    /// See [`project_with`](Self::project_with).
    pub fn project(&self, raw: &Value) -> Result<BayesianOptimizationRecord> {
        self.project_with(raw, CampaignSignals::default())
    }

    /// Project a raw campaign.
    ///
    /// # Errors
    ///
    /// - [`Error::ProjectionFailed`] if any parameter fails to resolve
    /// - [`Error::MalformedTableEncoding`] if a table blob cannot be decoded
    /// - [`Error::MalformedRecord`] if a required section is missing or malformed
    /// - [`Error::RecommenderTooDeep`] if the recommender tree nests too deeply
    pub fn project_with(
        &self,
        raw: &Value,
        signals: CampaignSignals,
    ) -> Result<BayesianOptimizationRecord> {
        match self.try_project(raw, signals) {
            Ok(record) => {
                tracing::info!(
                    parameters = record.parameters().len(),
                    n_steps = record.n_steps(),
                    status = %record.status(),
                    "projected campaign record"
                );
                Ok(record)
            }
            Err(error) => {
                tracing::error!(%error, "campaign projection failed");
                Err(error)
            }
        }
    }

    fn try_project(
        &self,
        raw: &Value,
        signals: CampaignSignals,
    ) -> Result<BayesianOptimizationRecord> {
        let fields = raw
            .as_object()
            .ok_or_else(|| Error::malformed("$", "campaign must be a JSON object"))?;

        let parameters = resolve_parameters(fields)?;

        let objective: Objective = section(fields, "objective")?;
        objective
            .check()
            .map_err(|reason| Error::malformed("objective", reason))?;

        let recommender: Recommender = section(fields, "recommender")?;
        recommender.check(self.config.max_recommender_depth)?;

        let executed = table::decode(fields.get(&self.config.measurements_key))?;
        let pending = table::decode(fields.get(&self.config.recommendation_key))?;
        let steps = build_steps(executed.rows(), pending.rows());

        BayesianOptimizationRecord::builder(objective, recommender)
            .parameters(parameters)
            .steps(steps)
            .signals(signals)
            .campaign(raw.clone())
            .build()
    }
}

/// Project a raw campaign with the default configuration and no signals.
///
/// # Errors
///
/// See [`Projector::project_with`].
///
/// # Example
///
/// ```rust
/// use bayes_record::{project, OptimizationStatus};
///
/// let raw = serde_json::json!({
///     "searchspace": {
///         "discrete": {"parameters": []},
///         "continuous": {"parameters": [
///             {"type": "NumericalContinuousParameter", "name": "temperature",
///              "bounds": {"lower": 300.0, "upper": 600.0}}
///         ]}
///     },
///     "objective": {"type": "SingleTargetObjective", "target": {
///         "type": "NumericalTarget", "name": "refractive_index", "mode": "MAX"}},
///     "recommender": {"type": "RandomRecommender"}
/// });
/// let record = project(&raw)?;
/// assert_eq!(record.status(), OptimizationStatus::Initializing);
/// # Ok::<(), bayes_record::Error>(())
/// ```
pub fn project(raw: &Value) -> Result<BayesianOptimizationRecord> {
    Projector::default().project(raw)
}

/// Resolve discrete then continuous parameters, collecting every failure.
fn resolve_parameters(fields: &Map<String, Value>) -> Result<Vec<Parameter>> {
    let searchspace = fields
        .get("searchspace")
        .and_then(Value::as_object)
        .ok_or_else(|| Error::malformed("searchspace", "missing or not an object"))?;

    let mut descriptors: Vec<&Value> = Vec::new();
    for part in SEARCHSPACE_SECTIONS {
        let container = match searchspace.get(part) {
            None | Some(Value::Null) => continue,
            Some(Value::Object(container)) => container,
            Some(_) => {
                return Err(Error::malformed(
                    format!("searchspace.{part}"),
                    "must be an object",
                ))
            }
        };
        match container.get("parameters") {
            None | Some(Value::Null) => {}
            Some(Value::Array(items)) => descriptors.extend(items),
            Some(_) => {
                return Err(Error::malformed(
                    format!("searchspace.{part}.parameters"),
                    "must be an array",
                ))
            }
        }
    }

    let mut parameters = Vec::with_capacity(descriptors.len());
    let mut failures = Vec::new();
    for (index, descriptor) in descriptors.into_iter().enumerate() {
        match resolve(descriptor) {
            Ok(parameter) => {
                let duplicate = parameters
                    .iter()
                    .any(|p: &Parameter| p.name() == parameter.name());
                if duplicate {
                    failures.push(ParameterFailure {
                        index,
                        name: Some(parameter.name().to_string()),
                        error: ParameterError::DuplicateName(parameter.name().to_string()),
                    });
                } else {
                    tracing::debug!(
                        name = parameter.name(),
                        tag = parameter.tag().as_str(),
                        "resolved parameter"
                    );
                    parameters.push(parameter);
                }
            }
            Err(error) => failures.push(ParameterFailure {
                index,
                name: descriptor_name(descriptor),
                error,
            }),
        }
    }

    if failures.is_empty() {
        Ok(parameters)
    } else {
        Err(Error::ProjectionFailed { failures })
    }
}

fn section<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Result<T> {
    let value = fields
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| Error::malformed(key, "missing"))?;
    T::deserialize(value).map_err(|e| Error::malformed(key, e.to_string()))
}
