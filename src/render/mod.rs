//! Progress renderer
//!
//! Derives two display artifacts from a record's step history:
//!
//! - **Convergence series**: `(iteration, target value)` per executed step
//! - **Trace table**: every step, most recent first, pending recommendation on top
//!
//! Both are pure functions of the record and are recomputed on demand;
//! neither is ever stored as authoritative state. Rendering never calls a
//! charting backend: [`ProgressReport::figures`] hands out declarative
//! [`Figure`] descriptions instead.

mod figure;

pub use figure::{Figure, LabeledFigure, LineChart, TableFigure};

use serde::{Deserialize, Serialize};

use crate::schema::{BayesianOptimizationRecord, Parameter, Scalar, Step};
use crate::Error;

/// One point of the convergence series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConvergencePoint {
    /// 1-based step ordinal, oldest first
    pub iteration: usize,
    /// Target value measured at that step
    pub value: f64,
}

/// Target value per executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvergenceSeries {
    target: String,
    points: Vec<ConvergencePoint>,
}

impl ConvergenceSeries {
    /// Get the target column name.
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Get the points in iteration order.
    #[must_use]
    pub fn points(&self) -> &[ConvergencePoint] {
        &self.points
    }
}

/// Reverse-chronological table of all steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceTable {
    columns: Vec<String>,
    rows: Vec<Vec<Option<Scalar>>>,
}

impl TraceTable {
    /// Get the column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the rows, most recent step first. `None` marks an empty cell.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<Scalar>>] {
        &self.rows
    }

    /// Cells of one column, top to bottom.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Vec<Option<&Scalar>>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| row[idx].as_ref()).collect())
    }
}

/// Rendered progress of one record.
#[derive(Debug)]
pub struct ProgressReport {
    convergence: Option<ConvergenceSeries>,
    trace: Option<TraceTable>,
    excluded: Vec<Error>,
}

impl ProgressReport {
    /// Get the convergence series; `None` when the history is empty.
    #[must_use]
    pub const fn convergence(&self) -> Option<&ConvergenceSeries> {
        self.convergence.as_ref()
    }

    /// Get the trace table; `None` when the history is empty.
    #[must_use]
    pub const fn trace(&self) -> Option<&TraceTable> {
        self.trace.as_ref()
    }

    /// Steps left out of the convergence series, as
    /// [`Error::MissingTargetValue`].
    #[must_use]
    pub fn excluded(&self) -> &[Error] {
        &self.excluded
    }

    /// Declarative figures: `Progress` (line chart) then `Steps` (table).
    #[must_use]
    pub fn figures(&self) -> Vec<LabeledFigure> {
        let mut figures = Vec::with_capacity(2);
        if let Some(series) = &self.convergence {
            figures.push(LabeledFigure::new("Progress", Figure::Line(LineChart::from(series))));
        }
        if let Some(trace) = &self.trace {
            figures.push(LabeledFigure::new("Steps", Figure::Table(TableFigure::from(trace))));
        }
        figures
    }
}

/// Render the progress artifacts of a record.
///
/// # Example
///
/// ```rust
/// use bayes_record::{project, render::render};
///
/// let raw = serde_json::json!({
///     "searchspace": {"continuous": {"parameters": [
///         {"type": "NumericalContinuousParameter", "name": "t", "bounds": [0, 10]}
///     ]}},
///     "objective": {"target": {"name": "y", "mode": "MAX"}},
///     "recommender": {"type": "RandomRecommender"},
///     "_measurements_exp": {"constructor": "from_records", "data": [
///         {"t": 1.0, "y": 0.5}, {"t": 2.0, "y": 0.7}
///     ]}
/// });
/// let report = render(&project(&raw)?);
/// assert_eq!(report.convergence().unwrap().points().len(), 2);
/// assert_eq!(report.trace().unwrap().rows().len(), 2);
/// # Ok::<(), bayes_record::Error>(())
/// ```
#[must_use]
pub fn render(record: &BayesianOptimizationRecord) -> ProgressReport {
    let steps = record.steps();
    if steps.is_empty() {
        return ProgressReport {
            convergence: None,
            trace: None,
            excluded: Vec::new(),
        };
    }

    let (series, excluded) = convergence_series(steps, record.objective().target_name());
    ProgressReport {
        convergence: Some(series),
        trace: Some(trace_table(steps, record.parameters())),
        excluded,
    }
}

/// Build the convergence series for `target`.
///
/// Steps without a numeric target value are excluded and reported as
/// [`Error::MissingTargetValue`]; they are never zero-filled.
#[must_use]
pub fn convergence_series(steps: &[Step], target: &str) -> (ConvergenceSeries, Vec<Error>) {
    let mut points = Vec::new();
    let mut excluded = Vec::new();

    for (idx, step) in steps.iter().enumerate() {
        let Some(used) = step.values_used() else {
            continue;
        };
        let iteration = idx + 1;
        match used.get(target).and_then(Scalar::as_f64) {
            Some(value) => points.push(ConvergencePoint { iteration, value }),
            None => {
                tracing::warn!(
                    step = iteration,
                    target_name = target,
                    "step excluded from convergence series"
                );
                excluded.push(Error::MissingTargetValue {
                    step: iteration,
                    target: target.to_string(),
                });
            }
        }
    }

    let series = ConvergenceSeries {
        target: target.to_string(),
        points,
    };
    (series, excluded)
}

/// Build the trace table, most recent step first.
///
/// Columns: declared parameters that occur in any step (declaration
/// order), then every other column in first-seen order.
#[must_use]
pub fn trace_table(steps: &[Step], parameters: &[Parameter]) -> TraceTable {
    let mut seen: Vec<&str> = Vec::new();
    for row in steps.iter().filter_map(Step::display_values) {
        for key in row.keys() {
            if !seen.contains(&key.as_str()) {
                seen.push(key);
            }
        }
    }

    let declared = parameters
        .iter()
        .map(Parameter::name)
        .filter(|name| seen.contains(name));
    let undeclared = seen
        .iter()
        .copied()
        .filter(|name| !parameters.iter().any(|p| p.name() == *name));
    let columns: Vec<String> = declared.chain(undeclared).map(str::to_string).collect();

    let rows = steps
        .iter()
        .rev()
        .map(|step| {
            let values = step.display_values();
            columns
                .iter()
                .map(|col| values.and_then(|v| v.get(col)).cloned())
                .collect()
        })
        .collect();

    TraceTable { columns, rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Row;

    fn row(pairs: &[(&str, Scalar)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_convergence_skips_pending_and_missing() {
        let steps = vec![
            Step::executed(row(&[("y", Scalar::Float(1.0))])),
            Step::executed(row(&[("x", Scalar::Float(3.0))])),
            Step::executed(row(&[("y", Scalar::Int(2))])),
            Step::recommended(row(&[("x", Scalar::Float(4.0))])),
        ];
        let (series, excluded) = convergence_series(&steps, "y");
        assert_eq!(
            series.points(),
            [
                ConvergencePoint { iteration: 1, value: 1.0 },
                ConvergencePoint { iteration: 3, value: 2.0 },
            ]
        );
        assert_eq!(excluded.len(), 1);
        assert!(matches!(excluded[0], Error::MissingTargetValue { step: 2, .. }));
    }

    #[test]
    fn test_null_and_text_targets_are_missing() {
        let steps = vec![
            Step::executed(row(&[("y", Scalar::Null)])),
            Step::executed(row(&[("y", Scalar::Text("n/a".to_string()))])),
        ];
        let (series, excluded) = convergence_series(&steps, "y");
        assert!(series.points().is_empty());
        assert_eq!(excluded.len(), 2);
    }

    #[test]
    fn test_trace_table_empty_cells() {
        let steps = vec![
            Step::executed(row(&[("a", Scalar::Int(1)), ("y", Scalar::Float(0.1))])),
            Step::recommended(row(&[("a", Scalar::Int(2))])),
        ];
        let table = trace_table(&steps, &[]);
        assert_eq!(table.columns(), ["a", "y"]);
        assert_eq!(table.rows()[0], vec![Some(Scalar::Int(2)), None]);
        assert_eq!(
            table.rows()[1],
            vec![Some(Scalar::Int(1)), Some(Scalar::Float(0.1))]
        );
        assert_eq!(
            table.column("a"),
            Some(vec![Some(&Scalar::Int(2)), Some(&Scalar::Int(1))])
        );
    }
}
