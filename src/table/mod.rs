//! Tabular blob decoder (Arrow/Parquet + readable records)
//!
//! The optimization engine embeds its measurement and recommendation
//! dataframes in the campaign record in one of two self-describing forms:
//!
//! - **Binary**: base64 string of a Parquet file (columnar, typed)
//! - **Readable**: `{"constructor": "from_records", "data": [{col: value}, ...]}`
//!
//! Both decode to a [`DecodedTable`] whose [`rows`](DecodedTable::rows)
//! iterator is lazy and restartable. Parquet cells are converted to
//! [`Scalar`]s on demand, one row at a time (late materialization).
//!
//! Empty or absent blobs decode to an empty table, never an error.

use std::sync::Arc;

use arrow::array::{
    Array, ArrayRef, ArrowPrimitiveType, BooleanArray, LargeStringArray, PrimitiveArray,
    StringArray,
};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use arrow::record_batch::RecordBatch;
use base64::Engine as _;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value};

use crate::schema::{Row, Scalar};
use crate::{Error, Result};

/// Constructor name of the readable encoding.
pub const FROM_RECORDS: &str = "from_records";

/// Prefix of dataframe index columns spilled into Parquet files.
const INDEX_COLUMN_PREFIX: &str = "__index_level_";

/// Decoded table: ordered column names and ordered rows.
#[derive(Debug, Clone)]
pub struct DecodedTable {
    columns: Vec<String>,
    source: Source,
}

#[derive(Debug, Clone)]
enum Source {
    Records(Vec<Row>),
    Batches {
        batches: Vec<RecordBatch>,
        /// Indices of the kept (non-index) columns, aligned with `columns`
        kept: Vec<usize>,
    },
}

impl DecodedTable {
    /// Create an empty table.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            columns: Vec::new(),
            source: Source::Records(Vec::new()),
        }
    }

    /// Create a table from already materialized rows.
    ///
    /// Columns are the union of row keys in first-seen order.
    #[must_use]
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let mut columns: Vec<String> = Vec::new();
        for row in &rows {
            for key in row.keys() {
                if !columns.contains(key) {
                    columns.push(key.clone());
                }
            }
        }
        Self {
            columns,
            source: Source::Records(rows),
        }
    }

    /// Get the column names in encoded order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of rows.
    #[must_use]
    pub fn num_rows(&self) -> usize {
        match &self.source {
            Source::Records(rows) => rows.len(),
            Source::Batches { batches, .. } => batches.iter().map(RecordBatch::num_rows).sum(),
        }
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.num_rows() == 0
    }

    /// Iterate over rows in encoded order. Each call starts from the top.
    #[must_use]
    pub fn rows(&self) -> Rows<'_> {
        Rows {
            table: self,
            batch_idx: 0,
            offset: 0,
            remaining: self.num_rows(),
        }
    }
}

/// Lazy iterator over the rows of a [`DecodedTable`].
#[derive(Debug, Clone)]
pub struct Rows<'a> {
    table: &'a DecodedTable,
    batch_idx: usize,
    offset: usize,
    remaining: usize,
}

impl Iterator for Rows<'_> {
    type Item = Row;

    fn next(&mut self) -> Option<Self::Item> {
        match &self.table.source {
            Source::Records(rows) => {
                let row = rows.get(self.offset)?.clone();
                self.offset += 1;
                self.remaining -= 1;
                Some(row)
            }
            Source::Batches { batches, kept } => {
                // Skip exhausted (or empty) batches
                while self.offset >= batches.get(self.batch_idx)?.num_rows() {
                    self.batch_idx += 1;
                    self.offset = 0;
                }
                let batch = &batches[self.batch_idx];
                let row = self
                    .table
                    .columns
                    .iter()
                    .zip(kept)
                    .map(|(name, &col)| (name.clone(), cell(batch.column(col), self.offset)))
                    .collect();
                self.offset += 1;
                self.remaining -= 1;
                Some(row)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

/// Decode a tabular blob taken from a campaign record.
///
/// `None` (absent key), `null`, `""` and `{}` decode to an empty table.
///
/// # Errors
///
/// Returns [`Error::MalformedTableEncoding`] if the blob is neither a
/// valid base64 Parquet string nor a valid `from_records` object, or if
/// it contains non-scalar cells or unsupported column types.
///
/// # Example
///
/// ```rust
/// use bayes_record::table::decode;
///
/// let blob = serde_json::json!({
///     "constructor": "from_records",
///     "data": [{"temperature": 310.0, "refractive_index": 2.1}]
/// });
/// let table = decode(Some(&blob))?;
/// assert_eq!(table.columns(), ["temperature", "refractive_index"]);
/// assert_eq!(table.rows().count(), 1);
/// # Ok::<(), bayes_record::Error>(())
/// ```
pub fn decode(blob: Option<&Value>) -> Result<DecodedTable> {
    let table = match blob {
        None | Some(Value::Null) => DecodedTable::empty(),
        Some(Value::String(s)) if s.trim().is_empty() => DecodedTable::empty(),
        Some(Value::String(s)) => decode_parquet_base64(s)?,
        Some(Value::Object(m)) if m.is_empty() => DecodedTable::empty(),
        Some(Value::Object(m)) => decode_records(m)?,
        Some(other) => {
            return Err(Error::MalformedTableEncoding(format!(
                "expected a base64 string or a '{FROM_RECORDS}' object, got {}",
                json_kind(other)
            )))
        }
    };
    tracing::debug!(
        columns = table.columns().len(),
        rows = table.num_rows(),
        "decoded table blob"
    );
    Ok(table)
}

fn decode_records(object: &Map<String, Value>) -> Result<DecodedTable> {
    match object.get("constructor").and_then(Value::as_str) {
        Some(FROM_RECORDS) => {}
        Some(other) => {
            return Err(Error::MalformedTableEncoding(format!(
                "unsupported constructor '{other}' (expected '{FROM_RECORDS}')"
            )))
        }
        None => {
            return Err(Error::MalformedTableEncoding(
                "missing 'constructor' key".to_string(),
            ))
        }
    }

    let records = object
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| Error::MalformedTableEncoding("'data' must be an array".to_string()))?;

    let rows = records
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let fields = record.as_object().ok_or_else(|| {
                Error::MalformedTableEncoding(format!("record {idx} is not an object"))
            })?;
            fields
                .iter()
                .map(|(key, value)| {
                    Scalar::from_json(value)
                        .map(|scalar| (key.clone(), scalar))
                        .ok_or_else(|| {
                            Error::MalformedTableEncoding(format!(
                                "record {idx}, column '{key}': cell is not a scalar"
                            ))
                        })
                })
                .collect::<Result<Row>>()
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DecodedTable::from_rows(rows))
}

fn decode_parquet_base64(encoded: &str) -> Result<DecodedTable> {
    let raw = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::MalformedTableEncoding(format!("invalid base64: {e}")))?;
    decode_parquet(raw)
}

/// Decode an in-memory Parquet file.
///
/// # Errors
///
/// Returns [`Error::MalformedTableEncoding`] if the bytes are not a
/// Parquet file or a column has an unsupported type.
pub fn decode_parquet(raw: impl Into<bytes::Bytes>) -> Result<DecodedTable> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(raw.into())
        .map_err(|e| Error::MalformedTableEncoding(format!("invalid Parquet data: {e}")))?;
    let schema = Arc::clone(builder.schema());

    let mut columns = Vec::new();
    let mut kept = Vec::new();
    for (idx, field) in schema.fields().iter().enumerate() {
        if field.name().starts_with(INDEX_COLUMN_PREFIX) {
            continue;
        }
        if !is_supported(field.data_type()) {
            return Err(Error::MalformedTableEncoding(format!(
                "column '{}' has unsupported type {:?}",
                field.name(),
                field.data_type()
            )));
        }
        columns.push(field.name().clone());
        kept.push(idx);
    }

    let reader = builder.build().map_err(|e| {
        Error::MalformedTableEncoding(format!("failed to create Parquet reader: {e}"))
    })?;

    // Read all batches into memory; cells are converted lazily
    let mut batches = Vec::new();
    for batch in reader {
        let batch = batch.map_err(|e| {
            Error::MalformedTableEncoding(format!("failed to read record batch: {e}"))
        })?;
        batches.push(batch);
    }

    Ok(DecodedTable {
        columns,
        source: Source::Batches { batches, kept },
    })
}

const fn is_supported(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Null
            | DataType::Boolean
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
            | DataType::Utf8
            | DataType::LargeUtf8
    )
}

fn primitive<T: ArrowPrimitiveType>(array: &ArrayRef, row: usize) -> Option<T::Native> {
    array
        .as_any()
        .downcast_ref::<PrimitiveArray<T>>()
        .map(|a| a.value(row))
}

/// Convert one Arrow cell. Column types were validated at decode time.
fn cell(array: &ArrayRef, row: usize) -> Scalar {
    if array.is_null(row) {
        return Scalar::Null;
    }
    let scalar = match array.data_type() {
        DataType::Boolean => array
            .as_any()
            .downcast_ref::<BooleanArray>()
            .map(|a| Scalar::Bool(a.value(row))),
        DataType::Int8 => primitive::<Int8Type>(array, row).map(|v| Scalar::Int(v.into())),
        DataType::Int16 => primitive::<Int16Type>(array, row).map(|v| Scalar::Int(v.into())),
        DataType::Int32 => primitive::<Int32Type>(array, row).map(|v| Scalar::Int(v.into())),
        DataType::Int64 => primitive::<Int64Type>(array, row).map(Scalar::Int),
        DataType::UInt8 => primitive::<UInt8Type>(array, row).map(|v| Scalar::Int(v.into())),
        DataType::UInt16 => primitive::<UInt16Type>(array, row).map(|v| Scalar::Int(v.into())),
        DataType::UInt32 => primitive::<UInt32Type>(array, row).map(|v| Scalar::Int(v.into())),
        #[allow(clippy::cast_precision_loss)]
        DataType::UInt64 => primitive::<UInt64Type>(array, row)
            .map(|v| i64::try_from(v).map_or(Scalar::Float(v as f64), Scalar::Int)),
        DataType::Float32 => {
            primitive::<Float32Type>(array, row).map(|v| Scalar::float(f64::from(v)))
        }
        DataType::Float64 => primitive::<Float64Type>(array, row).map(Scalar::float),
        DataType::Utf8 => array
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|a| Scalar::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => array
            .as_any()
            .downcast_ref::<LargeStringArray>()
            .map(|a| Scalar::Text(a.value(row).to_string())),
        _ => None,
    };
    scalar.unwrap_or(Scalar::Null)
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
