//   Copyright (c) 2024-2026 Anton Kundenko <singaraiona@gmail.com>
//   All rights reserved.
//
//   Permission is hereby granted, free of charge, to any person obtaining a copy
//   of this software and associated documentation files (the "Software"), to deal
//   in the Software without restriction, including without limitation the rights
//   to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//   copies of the Software, and to permit persons to whom the Software is
//   furnished to do so, subject to the following conditions:
//
//   The above copyright notice and this permission notice shall be included in all
//   copies or substantial portions of the Software.
//
//   THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//   IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//   FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//   AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//   LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

//! Groupby/sort/filter benchmark suite (criterion), grounded on synthetic
//! in-memory data rather than an external dataset — this engine has no file
//! catalog to point at one.

use std::time::Duration;

use criterion::{criterion_group, criterion_main, Criterion, SamplingMode};

use vinum::{Array, ArrayData, DataType, Field, RecordBatch, Schema, Table};

const ROWS: usize = 200_000;
const GROUPS: i64 = 100;

fn synthetic_table() -> Table {
    let schema = Schema::new(vec![
        Field::new("id1", DataType::Int64),
        Field::new("id2", DataType::Int64),
        Field::new("v1", DataType::Float64),
        Field::new("v2", DataType::Float64),
    ]);
    let id1: Vec<i64> = (0..ROWS as i64).map(|i| i % GROUPS).collect();
    let id2: Vec<i64> = (0..ROWS as i64).map(|i| i % (GROUPS * 3)).collect();
    let v1: Vec<f64> = (0..ROWS).map(|i| (i % 997) as f64).collect();
    let v2: Vec<f64> = (0..ROWS).map(|i| (i % 331) as f64 * 1.5).collect();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Array::from_data(ArrayData::Int64(id1)),
            Array::from_data(ArrayData::Int64(id2)),
            Array::from_data(ArrayData::Float64(v1)),
            Array::from_data(ArrayData::Float64(v2)),
        ],
    )
    .unwrap();
    Table::from_record_batches(schema, vec![batch]).unwrap()
}

fn bench_groupby(c: &mut Criterion) {
    let table = synthetic_table();

    let mut group = c.benchmark_group("groupby");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    group.bench_function("q1_single_key_sum", |b| {
        b.iter(|| table.sql("SELECT id1, SUM(v1) as v1 FROM t GROUP BY id1").unwrap())
    });

    group.bench_function("q2_compound_key_sum", |b| {
        b.iter(|| table.sql("SELECT id1, id2, SUM(v1) as v1 FROM t GROUP BY id1, id2").unwrap())
    });

    group.bench_function("q3_multi_agg_avg", |b| {
        b.iter(|| {
            table
                .sql("SELECT id1, AVG(v1) as v1, AVG(v2) as v2, COUNT(v1) as cnt FROM t GROUP BY id1")
                .unwrap()
        })
    });

    group.finish();
}

fn bench_filter_and_sort(c: &mut Criterion) {
    let table = synthetic_table();

    let mut group = c.benchmark_group("filter_sort");
    group.sample_size(10);
    group.sampling_mode(SamplingMode::Flat);
    group.warm_up_time(Duration::from_millis(500));
    group.measurement_time(Duration::from_secs(1));

    group.bench_function("filter_half", |b| {
        b.iter(|| table.sql("SELECT id1, v1 FROM t WHERE id1 < 50").unwrap())
    });

    group.bench_function("order_by_v1", |b| {
        b.iter(|| table.sql("SELECT id1, v1 FROM t ORDER BY v1 DESC LIMIT 100").unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_groupby, bench_filter_and_sort);
criterion_main!(benches);
