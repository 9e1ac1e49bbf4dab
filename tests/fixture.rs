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

//! Shared four-row taxi-ride fixture used by the scenario tests: schema
//! `(id i64, ts i64, vendor i64, city_from str, city_to str, lat f64, lng f64,
//! name str, tax f64, tip f64, total f64)`.

use vinum::{Array, ArrayData, DataType, Field, RecordBatch, Schema, Table};

#[allow(dead_code)]
pub fn schema() -> Schema {
    Schema::new(vec![
        Field::new("id", DataType::Int64),
        Field::new("ts", DataType::Int64),
        Field::new("vendor", DataType::Int64),
        Field::new("city_from", DataType::Utf8),
        Field::new("city_to", DataType::Utf8),
        Field::new("lat", DataType::Float64),
        Field::new("lng", DataType::Float64),
        Field::new("name", DataType::Utf8),
        Field::new("tax", DataType::Float64),
        Field::new("tip", DataType::Float64),
        Field::new("total", DataType::Float64),
    ])
}

#[allow(dead_code)]
pub fn table() -> Table {
    let schema = schema();
    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Array::from_data(ArrayData::Int64(vec![1, 2, 3, 4])),
            Array::from_data(ArrayData::Int64(vec![1596899421, 1596999422, 1597899423, 1598899424])),
            Array::from_data(ArrayData::Int64(vec![1, 2, 1, 3])),
            Array::from_data(ArrayData::Utf8(vec!["Berlin".into(), "Munich".into(), "Riva".into(), "San Francisco".into()])),
            Array::from_data(ArrayData::Utf8(vec!["Munich".into(), "Riva".into(), "Naples".into(), "Naples".into()])),
            Array::from_data(ArrayData::Float64(vec![52.51, 48.51, 44.89, 42.89])),
            Array::from_data(ArrayData::Float64(vec![13.66, 12.3, 14.23, 15.89])),
            Array::from_data(ArrayData::Utf8(vec!["Joe".into(), "Jonas".into(), "Joseph".into(), "Joseph".into()])),
            Array::from_data(ArrayData::Float64(vec![0.43, 2.0, 1.59, 1.69])),
            Array::from_data(ArrayData::Float64(vec![1.0, 5.34, 11.0, 5.0])),
            Array::from_data(ArrayData::Float64(vec![2.43, 143.15, 33.40, 53.1])),
        ],
    )
    .unwrap();
    Table::from_record_batches(schema, vec![batch]).unwrap()
}
