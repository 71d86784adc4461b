//! Campaign Record Schema
//!
//! Strongly-typed model of an optimization campaign, projected from the
//! engine's raw campaign record.
//!
//! ## Schema Overview
//!
//! ```text
//! BayesianOptimizationRecord
//!     ├──< Parameter (N) [Continuous | NumericalDiscrete | Categorical]
//!     ├─── Objective ─── Target
//!     ├─── Recommender ──< Recommender (0..2) [recursive]
//!     └──< Step (N) [values_used | values_recommended]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use bayes_record::schema::{CampaignSignals, OptimizationStatus, Row, Step};
//!
//! let steps = vec![Step::executed(Row::new()), Step::recommended(Row::new())];
//! let status = OptimizationStatus::derive(&steps, CampaignSignals::default());
//! assert_eq!(status, OptimizationStatus::Suggesting);
//! ```

mod objective;
mod parameter;
mod recommender;
mod record;
mod status;
pub(crate) mod step;

pub(crate) use parameter::descriptor_name;
pub use objective::{Objective, ObjectiveType, Target, TargetMode, TargetType, Transformation};
pub use parameter::{resolve, Bounds, Parameter, ParameterKind, ParameterTag};
pub use recommender::{
    AcquisitionFunction, HybridSampler, KernelFactory, Recommender, RecommenderType,
    SurrogateModel,
};
pub use record::{BayesianOptimizationRecord, RecordBuilder, SearchFacets};
pub use status::{CampaignSignals, OptimizationStatus};
pub use step::{Row, Scalar, Step};
