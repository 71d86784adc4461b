//! Projection benchmarks
//!
//! - Parquet blob decoding (base64 + Parquet)
//! - Full campaign projection
//! - Progress rendering
//!
//! Toyota Way: Measure before optimizing (Genchi Genbutsu)

use arrow::array::{Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use base64::Engine as _;
use bayes_record::render::render;
use bayes_record::{project, table};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use parquet::arrow::ArrowWriter;
use serde_json::{json, Value};
use std::sync::Arc;

const SUBSTRATES: [&str; 3] = ["SiC", "Si", "GaN"];

/// Create a measurement batch with the specified number of rows
#[allow(clippy::cast_precision_loss)]
fn create_measurements(num_rows: i64) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("substrate", DataType::Utf8, false),
        Field::new("temperature", DataType::Float64, false),
        Field::new("refractive_index", DataType::Float64, false),
        Field::new("BatchNr", DataType::Int64, false),
    ]);

    RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(StringArray::from_iter_values(
                (0..num_rows).map(|i| SUBSTRATES[usize::try_from(i % 3).unwrap()]),
            )),
            Arc::new(Float64Array::from_iter_values(
                (0..num_rows).map(|i| 300.0 + (i % 300) as f64),
            )),
            Arc::new(Float64Array::from_iter_values(
                (0..num_rows).map(|i| 2.0 + (i % 100) as f64 / 100.0),
            )),
            Arc::new(Int64Array::from_iter_values(1..=num_rows)),
        ],
    )
    .unwrap()
}

/// Encode a batch the way the engine embeds trial tables
fn encode_blob(batch: &RecordBatch) -> String {
    let mut buf = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buf, batch.schema(), None).unwrap();
    writer.write(batch).unwrap();
    writer.close().unwrap();
    base64::engine::general_purpose::STANDARD.encode(buf)
}

fn create_campaign(num_rows: i64) -> Value {
    json!({
        "searchspace": {
            "discrete": {"parameters": [
                {"type": "CategoricalParameter", "name": "substrate", "values": SUBSTRATES}
            ]},
            "continuous": {"parameters": [
                {"type": "NumericalContinuousParameter", "name": "temperature",
                 "bounds": {"lower": 300.0, "upper": 600.0}}
            ]}
        },
        "objective": {"target": {
            "name": "refractive_index", "mode": "MATCH",
            "bounds": {"lower": 2.4473, "upper": 2.8473}
        }},
        "recommender": {"type": "TwoPhaseMetaRecommender"},
        "_measurements_exp": encode_blob(&create_measurements(num_rows)),
        "_cached_recommendation": {"constructor": "from_records", "data": [
            {"substrate": "Si", "temperature": 455.0}
        ]}
    })
}

/// Benchmark Parquet blob decoding
fn bench_blob_decoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("blob_decoding");

    for size in [100, 1_000, 10_000].iter() {
        let blob = Value::String(encode_blob(&create_measurements(*size)));

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let decoded = table::decode(Some(&blob)).unwrap();
                let rows: Vec<_> = decoded.rows().collect();
                black_box(rows);
            });
        });
    }

    group.finish();
}

/// Benchmark end-to-end projection
fn bench_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");

    for size in [100, 1_000, 10_000].iter() {
        let raw = create_campaign(*size);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let record = project(&raw).unwrap();
                black_box(record);
            });
        });
    }

    group.finish();
}

/// Benchmark progress rendering
fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");

    for size in [100, 1_000, 10_000].iter() {
        let record = project(&create_campaign(*size)).unwrap();

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let figures = render(&record).figures();
                black_box(figures);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_blob_decoding, bench_projection, bench_rendering);
criterion_main!(benches);
