//! Step history builder
//!
//! Combines the executed-trials rows and the pending-recommendation rows
//! into the canonical, oldest-first step sequence:
//!
//! ```text
//! executed:  r1 r2 r3        pending: p1 [p2 ...]
//! steps:     U(r1) U(r2) U(r3) R(p1)
//! ```
//!
//! Only the first pending row becomes a step. Display-time reversal is
//! the renderer's concern, not stored state.

use crate::schema::{Row, Step};

/// Build the ordered step history.
///
/// One executed step per `executed` row, in row order, then at most one
/// recommendation-only step from the first `pending` row. Later pending
/// rows are counted, never materialized.
///
/// # Example
///
/// ```rust
/// use bayes_record::history::build_steps;
/// use bayes_record::schema::Row;
///
/// let steps = build_steps(vec![Row::new(), Row::new()], vec![Row::new()]);
/// assert_eq!(steps.len(), 3);
/// assert!(steps[2].is_pending());
/// ```
pub fn build_steps<E, P>(executed: E, pending: P) -> Vec<Step>
where
    E: IntoIterator<Item = Row>,
    P: IntoIterator<Item = Row>,
    P::IntoIter: ExactSizeIterator,
{
    let mut steps: Vec<Step> = executed.into_iter().map(Step::executed).collect();

    let mut pending = pending.into_iter();
    if let Some(recommendation) = pending.next() {
        let dropped = pending.len();
        if dropped > 0 {
            tracing::warn!(
                dropped,
                "multiple pending recommendation rows; keeping only the first"
            );
        }
        steps.push(Step::recommended(recommendation));
    }

    steps
}
