//! Bayesian Optimization Record - aggregate root of a projected campaign

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{
    step, Bounds, CampaignSignals, Objective, OptimizationStatus, Parameter, Recommender, Step,
    TargetMode, Transformation,
};

/// Bayesian Optimization Record represents one projected campaign.
///
/// The record owns its parameters and steps. `n_steps` and `status` are
/// a cached projection of `steps` (plus the engine's [`CampaignSignals`]):
/// they are recomputed on every construction and deserialization and are
/// never accepted as input. The raw campaign is kept verbatim for audit
/// and re-derivation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RecordRepr")]
pub struct BayesianOptimizationRecord {
    parameters: Vec<Parameter>,
    objective: Objective,
    recommender: Recommender,
    status: OptimizationStatus,
    finished: bool,
    failed: bool,
    n_steps: usize,
    steps: Vec<Step>,
    campaign: serde_json::Value,
}

impl BayesianOptimizationRecord {
    /// Create a builder with the required sections.
    #[must_use]
    pub fn builder(objective: Objective, recommender: Recommender) -> RecordBuilder {
        RecordBuilder::new(objective, recommender)
    }

    /// Get the parameters in declaration order (discrete first, then continuous).
    #[must_use]
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Look up a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name() == name)
    }

    /// Get the objective.
    #[must_use]
    pub const fn objective(&self) -> &Objective {
        &self.objective
    }

    /// Get the recommender tree.
    #[must_use]
    pub const fn recommender(&self) -> &Recommender {
        &self.recommender
    }

    /// Get the derived status.
    #[must_use]
    pub const fn status(&self) -> OptimizationStatus {
        self.status
    }

    /// Whether the engine marked the campaign as finished.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Engine signals the status was derived with.
    #[must_use]
    pub const fn signals(&self) -> CampaignSignals {
        CampaignSignals {
            finished: self.finished,
            failed: self.failed,
        }
    }

    /// Get the number of steps.
    #[must_use]
    pub const fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// Get the steps, oldest first.
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Get the pending recommendation, if the last step has not run yet.
    #[must_use]
    pub fn pending_step(&self) -> Option<&Step> {
        self.steps.last().filter(|step| step.is_pending())
    }

    /// Get the raw campaign this record was projected from.
    #[must_use]
    pub const fn campaign(&self) -> &serde_json::Value {
        &self.campaign
    }

    /// Flat, indexable view of the record for search.
    #[must_use]
    pub fn search_facets(&self) -> SearchFacets {
        SearchFacets::from(self)
    }
}

/// Builder for `BayesianOptimizationRecord`.
#[derive(Debug)]
pub struct RecordBuilder {
    parameters: Vec<Parameter>,
    objective: Objective,
    recommender: Recommender,
    signals: CampaignSignals,
    steps: Vec<Step>,
    campaign: serde_json::Value,
}

impl RecordBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub const fn new(objective: Objective, recommender: Recommender) -> Self {
        Self {
            parameters: Vec::new(),
            objective,
            recommender,
            signals: CampaignSignals {
                finished: false,
                failed: false,
            },
            steps: Vec::new(),
            campaign: serde_json::Value::Null,
        }
    }

    /// Set the parameters.
    #[must_use]
    pub fn parameters(mut self, parameters: Vec<Parameter>) -> Self {
        self.parameters = parameters;
        self
    }

    /// Set the step history, oldest first.
    #[must_use]
    pub fn steps(mut self, steps: Vec<Step>) -> Self {
        self.steps = steps;
        self
    }

    /// Set the engine's finished signal.
    #[must_use]
    pub const fn finished(mut self, finished: bool) -> Self {
        self.signals.finished = finished;
        self
    }

    /// Set all engine signals at once.
    #[must_use]
    pub const fn signals(mut self, signals: CampaignSignals) -> Self {
        self.signals = signals;
        self
    }

    /// Attach the raw campaign.
    #[must_use]
    pub fn campaign(mut self, campaign: serde_json::Value) -> Self {
        self.campaign = campaign;
        self
    }

    /// Build the record, deriving `n_steps` and `status`.
    ///
    /// # Errors
    ///
    /// Returns error if parameter names repeat or a step other than the
    /// last lacks executed values.
    pub fn build(self) -> crate::Result<BayesianOptimizationRecord> {
        let mut seen = HashSet::new();
        if let Some(dup) = self.parameters.iter().find(|p| !seen.insert(p.name())) {
            return Err(crate::ParameterError::DuplicateName(dup.name().to_string()).into());
        }
        if let Some(ordinal) = step::first_unexecuted_before_last(&self.steps) {
            return Err(crate::Error::malformed(
                "steps",
                format!("step {ordinal} has no executed values but is not the last step"),
            ));
        }

        Ok(BayesianOptimizationRecord {
            status: OptimizationStatus::derive(&self.steps, self.signals),
            n_steps: self.steps.len(),
            parameters: self.parameters,
            objective: self.objective,
            recommender: self.recommender,
            finished: self.signals.finished,
            failed: self.signals.failed,
            steps: self.steps,
            campaign: self.campaign,
        })
    }
}

/// Persisted shape. Stored `status`/`n_steps` are read and discarded.
#[derive(Deserialize)]
struct RecordRepr {
    #[serde(default)]
    parameters: Vec<Parameter>,
    objective: Objective,
    recommender: Recommender,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    failed: bool,
    #[serde(default)]
    steps: Vec<Step>,
    #[serde(default)]
    campaign: serde_json::Value,
    #[serde(default, rename = "status")]
    _status: Option<OptimizationStatus>,
    #[serde(default, rename = "n_steps")]
    _n_steps: Option<usize>,
}

impl TryFrom<RecordRepr> for BayesianOptimizationRecord {
    type Error = crate::Error;

    fn try_from(repr: RecordRepr) -> Result<Self, Self::Error> {
        RecordBuilder::new(repr.objective, repr.recommender)
            .parameters(repr.parameters)
            .steps(repr.steps)
            .signals(CampaignSignals {
                finished: repr.finished,
                failed: repr.failed,
            })
            .campaign(repr.campaign)
            .build()
    }
}

/// Indexable projection of a record for the host's search layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchFacets {
    /// Derived status
    pub status: OptimizationStatus,
    /// Number of steps
    pub n_steps: usize,
    /// Parameter names in declaration order
    pub parameter_names: Vec<String>,
    /// Target column name
    pub target_name: String,
    /// Target mode
    pub target_mode: TargetMode,
    /// Target transformation
    pub target_transformation: Option<Transformation>,
    /// Target bounds
    pub target_bounds: Option<Bounds>,
    /// Root recommender type
    pub recommender_type: super::RecommenderType,
    /// First surrogate model type in the tree
    pub surrogate_type: Option<String>,
    /// First acquisition function type in the tree
    pub acquisition_function_type: Option<String>,
    /// First hybrid sampler in the tree
    pub hybrid_sampler: Option<super::HybridSampler>,
    /// First sampling percentage in the tree
    pub sampling_percentage: Option<f64>,
}

impl From<&BayesianOptimizationRecord> for SearchFacets {
    fn from(record: &BayesianOptimizationRecord) -> Self {
        let recommender = record.recommender();
        let target = &record.objective().target;
        Self {
            status: record.status(),
            n_steps: record.n_steps(),
            parameter_names: record
                .parameters()
                .iter()
                .map(|p| p.name().to_string())
                .collect(),
            target_name: target.name.clone(),
            target_mode: target.mode,
            target_transformation: target.transformation,
            target_bounds: target.bounds,
            recommender_type: recommender.kind,
            surrogate_type: recommender.surrogate().map(|s| s.kind.clone()),
            acquisition_function_type: recommender.acquisition().map(|a| a.kind.clone()),
            hybrid_sampler: first_in_tree(recommender, |r| r.hybrid_sampler),
            sampling_percentage: first_in_tree(recommender, |r| r.sampling_percentage),
        }
    }
}

fn first_in_tree<T>(
    node: &Recommender,
    pick: impl Fn(&Recommender) -> Option<T> + Copy,
) -> Option<T> {
    pick(node).or_else(|| node.children().find_map(|child| first_in_tree(child, pick)))
}
