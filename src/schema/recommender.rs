//! Recommender - the engine's trial proposal strategy
//!
//! A recommender may wrap other recommenders (`initial_recommender`,
//! `recommender`), so the descriptor is an owned tree. Children are boxed;
//! no node can reference an ancestor.

use serde::{Deserialize, Serialize};

/// Supported recommendation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecommenderType {
    /// Switches from an initial recommender to a model-based one
    TwoPhaseMetaRecommender,
    /// Splits hybrid spaces into discrete and continuous sub-problems
    NaiveHybridSpaceRecommender,
    /// Uniform random sampling
    RandomRecommender,
    /// Greedy batch acquisition
    SequentialGreedyRecommender,
    /// Botorch-backed acquisition
    BotorchRecommender,
}

/// Sampler for hybrid search spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HybridSampler {
    /// Farthest point sampling
    Farthest,
    /// No hybrid sampling
    None,
}

/// Kernel factory of a surrogate model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KernelFactory {
    /// Factory type tag (e.g. `DefaultKernelFactory`)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Surrogate model fitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurrogateModel {
    /// Model type tag (e.g. `GaussianProcessSurrogate`)
    #[serde(rename = "type")]
    pub kind: String,
    /// Kernel configuration
    #[serde(
        default,
        alias = "kernel_factor",
        skip_serializing_if = "Option::is_none"
    )]
    pub kernel_factory: Option<KernelFactory>,
}

/// Acquisition function evaluated by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionFunction {
    /// Function type tag (e.g. `qExpectedImprovement`)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Recommender descriptor, a recursive tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommender {
    /// Strategy type tag
    #[serde(rename = "type")]
    pub kind: RecommenderType,
    /// Surrogate model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub surrogate_model: Option<SurrogateModel>,
    /// Recommender used before enough data exists (meta recommenders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_recommender: Option<Box<Recommender>>,
    /// Main wrapped recommender (meta recommenders)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommender: Option<Box<Recommender>>,
    /// Acquisition function
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acquisition_function: Option<AcquisitionFunction>,
    /// Hybrid space sampler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hybrid_sampler: Option<HybridSampler>,
    /// Fraction of candidates drawn by the hybrid sampler
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sampling_percentage: Option<f64>,
}

impl Recommender {
    /// Create a leaf recommender of the given type.
    #[must_use]
    pub const fn new(kind: RecommenderType) -> Self {
        Self {
            kind,
            surrogate_model: None,
            initial_recommender: None,
            recommender: None,
            acquisition_function: None,
            hybrid_sampler: None,
            sampling_percentage: None,
        }
    }

    /// Direct children, initial recommender first.
    pub fn children(&self) -> impl Iterator<Item = &Self> {
        self.initial_recommender
            .iter()
            .chain(self.recommender.iter())
            .map(|child| &**child)
    }

    /// Nesting depth; a leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.children().map(|c| c.depth() + 1).max().unwrap_or(0)
    }

    /// First surrogate model found in pre-order.
    #[must_use]
    pub fn surrogate(&self) -> Option<&SurrogateModel> {
        self.surrogate_model
            .as_ref()
            .or_else(|| self.children().find_map(Self::surrogate))
    }

    /// First acquisition function found in pre-order.
    #[must_use]
    pub fn acquisition(&self) -> Option<&AcquisitionFunction> {
        self.acquisition_function
            .as_ref()
            .or_else(|| self.children().find_map(Self::acquisition))
    }

    /// Check tree shape and scalar ranges.
    pub(crate) fn check(&self, max_depth: usize) -> Result<(), crate::Error> {
        let depth = self.depth();
        if depth > max_depth {
            return Err(crate::Error::RecommenderTooDeep {
                depth,
                max: max_depth,
            });
        }
        self.check_ranges()
    }

    fn check_ranges(&self) -> Result<(), crate::Error> {
        if let Some(p) = self.sampling_percentage {
            if !(0.0..=1.0).contains(&p) {
                return Err(crate::Error::malformed(
                    "recommender.sampling_percentage",
                    format!("{p} is outside [0, 1]"),
                ));
            }
        }
        self.children().try_for_each(Self::check_ranges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn two_phase() -> serde_json::Value {
        json!({
            "type": "TwoPhaseMetaRecommender",
            "initial_recommender": {"type": "RandomRecommender"},
            "recommender": {
                "type": "SequentialGreedyRecommender",
                "surrogate_model": {
                    "type": "GaussianProcessSurrogate",
                    "kernel_factory": {"type": "DefaultKernelFactory"}
                },
                "acquisition_function": {"type": "qExpectedImprovement"},
                "hybrid_sampler": "Farthest",
                "sampling_percentage": 0.3
            }
        })
    }

    #[test]
    fn test_recommender_tree() {
        let recommender: Recommender = serde_json::from_value(two_phase()).unwrap();
        assert_eq!(recommender.kind, RecommenderType::TwoPhaseMetaRecommender);
        assert_eq!(recommender.depth(), 1);
        assert_eq!(recommender.children().count(), 2);
        assert_eq!(
            recommender.surrogate().map(|s| s.kind.as_str()),
            Some("GaussianProcessSurrogate")
        );
        assert_eq!(
            recommender.acquisition().map(|a| a.kind.as_str()),
            Some("qExpectedImprovement")
        );
        assert!(recommender.check(2).is_ok());
    }

    #[test]
    fn test_recommender_round_trip() {
        let recommender: Recommender = serde_json::from_value(two_phase()).unwrap();
        assert_eq!(serde_json::to_value(&recommender).unwrap(), two_phase());
    }

    #[test]
    fn test_depth_limit() {
        let mut nested = Recommender::new(RecommenderType::RandomRecommender);
        for _ in 0..3 {
            let mut parent = Recommender::new(RecommenderType::TwoPhaseMetaRecommender);
            parent.recommender = Some(Box::new(nested));
            nested = parent;
        }
        assert_eq!(nested.depth(), 3);
        assert!(matches!(
            nested.check(2),
            Err(crate::Error::RecommenderTooDeep { depth: 3, max: 2 })
        ));
    }

    #[test]
    fn test_sampling_percentage_range() {
        let mut recommender = Recommender::new(RecommenderType::SequentialGreedyRecommender);
        recommender.sampling_percentage = Some(1.5);
        assert!(recommender.check(2).is_err());
    }

    #[test]
    fn test_legacy_kernel_key() {
        let raw = json!({
            "type": "GaussianProcessSurrogate",
            "kernel_factor": {"type": "DefaultKernelFactory"}
        });
        let model: SurrogateModel = serde_json::from_value(raw).unwrap();
        assert!(model.kernel_factory.is_some());
    }
}
