//! # bayes-record: Typed Bayesian Optimization Campaign Records
//!
//! **Version**: 0.1.0
//!
//! bayes-record ingests the opaque campaign record written by a Bayesian
//! optimization engine (search space, objective, recommender, and the
//! trial history embedded as serialized dataframes) and projects it into a
//! strongly-typed, versionable record. From that record it derives the
//! human-readable progress artifacts: a convergence chart and a
//! reverse-chronological trace table.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: Ingestion is all-or-nothing; no partially typed record
//! - **Jidoka**: Every failing parameter is reported at once
//! - **Muda elimination**: Parquet cells are materialized lazily, row by row
//! - **Genchi Genbutsu**: Status is derived from the step history, never hand-set
//!
//! ## Pipeline
//!
//! ```text
//! raw campaign ─> schema::resolve (per parameter)
//!              ─> table::decode (trials + pending recommendation)
//!              ─> history::build_steps ─> OptimizationStatus::derive
//!              ─> BayesianOptimizationRecord ─> render::render ─> figures
//! ```
//!
//! ## Example Usage
//!
//! ```rust
//! use bayes_record::{project, render::render, OptimizationStatus};
//!
//! let raw = serde_json::json!({
//!     "searchspace": {"continuous": {"parameters": [
//!         {"type": "NumericalContinuousParameter", "name": "temperature",
//!          "bounds": {"lower": 300.0, "upper": 600.0}}
//!     ]}},
//!     "objective": {"target": {"name": "refractive_index", "mode": "MATCH",
//!                              "bounds": {"lower": 2.45, "upper": 2.85}}},
//!     "recommender": {"type": "RandomRecommender"},
//!     "_measurements_exp": {"constructor": "from_records", "data": [
//!         {"temperature": 310.0, "refractive_index": 2.1}
//!     ]}
//! });
//!
//! let record = project(&raw)?;
//! assert_eq!(record.status(), OptimizationStatus::Acquiring);
//!
//! let report = render(&record);
//! assert_eq!(report.figures().len(), 2);
//! # Ok::<(), bayes_record::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod history;
pub mod projector;
pub mod render;
pub mod schema;
pub mod table;

pub use config::ProjectorConfig;
pub use error::{Error, ParameterError, ParameterFailure, Result};
pub use projector::{project, Projector};
pub use schema::{BayesianOptimizationRecord, CampaignSignals, OptimizationStatus};
