//! Declarative figure descriptions for an external charting backend

use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use super::{ConvergenceSeries, TraceTable};
use crate::schema::Scalar;

/// Plot template applied to every figure.
pub const TEMPLATE: &str = "plotly_white";

/// Line + marker chart of one series.
#[derive(Debug, Clone, PartialEq)]
pub struct LineChart {
    /// Chart title
    pub title: String,
    /// X axis title
    pub x_title: String,
    /// Y axis title
    pub y_title: String,
    /// X values (iterations)
    pub x: Vec<usize>,
    /// Y values
    pub y: Vec<f64>,
}

impl From<&ConvergenceSeries> for LineChart {
    fn from(series: &ConvergenceSeries) -> Self {
        Self {
            title: "Progress".to_string(),
            x_title: "Iteration".to_string(),
            y_title: series.target().to_string(),
            x: series.points().iter().map(|p| p.iteration).collect(),
            y: series.points().iter().map(|p| p.value).collect(),
        }
    }
}

/// Table with a header row and column-major cells.
#[derive(Debug, Clone, PartialEq)]
pub struct TableFigure {
    /// Column headers
    pub header: Vec<String>,
    /// One vector per column, top row first
    pub cells: Vec<Vec<Option<Scalar>>>,
}

impl From<&TraceTable> for TableFigure {
    fn from(table: &TraceTable) -> Self {
        let cells = (0..table.columns().len())
            .map(|col| table.rows().iter().map(|row| row[col].clone()).collect())
            .collect();
        Self {
            header: table.columns().to_vec(),
            cells,
        }
    }
}

/// A figure description.
#[derive(Debug, Clone, PartialEq)]
pub enum Figure {
    /// Line chart
    Line(LineChart),
    /// Table
    Table(TableFigure),
}

impl Figure {
    /// Plotly-compatible JSON document for this figure.
    #[must_use]
    pub fn to_plotly_json(&self) -> Value {
        match self {
            Self::Line(chart) => json!({
                "data": [{
                    "type": "scatter",
                    "x": chart.x,
                    "y": chart.y,
                    "mode": "lines+markers",
                }],
                "layout": {
                    "template": TEMPLATE,
                    "title": {"text": chart.title},
                    "xaxis": {"title": {"text": chart.x_title}},
                    "yaxis": {"title": {"text": chart.y_title}},
                },
            }),
            Self::Table(table) => json!({
                "data": [{
                    "type": "table",
                    "header": {"values": table.header, "align": "left"},
                    "cells": {"values": table.cells, "align": "left"},
                }],
                "layout": {
                    "template": TEMPLATE,
                    "margin": {"l": 0, "r": 0, "t": 0, "b": 0},
                    "width": 800,
                },
            }),
        }
    }
}

/// A figure with the label it is shown under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledFigure {
    /// Display label
    pub label: String,
    /// Figure, serialized as plotly JSON
    #[serde(serialize_with = "as_plotly")]
    pub figure: Figure,
}

impl LabeledFigure {
    /// Create a labeled figure.
    #[must_use]
    pub fn new(label: impl Into<String>, figure: Figure) -> Self {
        Self {
            label: label.into(),
            figure,
        }
    }
}

fn as_plotly<S: Serializer>(figure: &Figure, serializer: S) -> Result<S::Ok, S::Error> {
    figure.to_plotly_json().serialize(serializer)
}
