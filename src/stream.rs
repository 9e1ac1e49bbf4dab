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

//! External streaming input (spec §6): a minimal trait any host-side reader
//! implements, plus two built-in readers grounded in this crate's own
//! needs — an in-memory one for tests and a CSV one for the CLI.

use chrono::Datelike;

use crate::data::{Array, ArrayData, DataType, RecordBatch, Schema};
use crate::error::{Error, Result};

/// A source of batches read from outside the engine. Each call to
/// `next_batch` reads at most one batch (spec §4.4 "Source (stream
/// reader)"); `None` signals end-of-stream.
pub trait StreamReader: Send {
    fn schema(&self) -> &Schema;
    fn next_batch(&mut self, max_rows: usize) -> Result<Option<RecordBatch>>;
}

/// Replays a fixed list of batches; used by tests and by [`crate::Table`]
/// internally once a table has been fully materialized in memory.
pub struct VecStreamReader {
    schema: Schema,
    batches: std::vec::IntoIter<RecordBatch>,
}

impl VecStreamReader {
    pub fn new(schema: Schema, batches: Vec<RecordBatch>) -> Self {
        VecStreamReader {
            schema,
            batches: batches.into_iter(),
        }
    }
}

impl StreamReader for VecStreamReader {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_batch(&mut self, _max_rows: usize) -> Result<Option<RecordBatch>> {
        Ok(self.batches.next())
    }
}

/// Reads CSV rows into typed columns according to a caller-supplied schema
/// (the csv format itself carries no type information).
pub struct CsvStreamReader<R> {
    schema: Schema,
    reader: csv::Reader<R>,
    done: bool,
}

impl CsvStreamReader<std::fs::File> {
    pub fn from_path(path: impl AsRef<std::path::Path>, schema: Schema) -> Result<Self> {
        let reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        Ok(CsvStreamReader {
            schema,
            reader,
            done: false,
        })
    }
}

impl<R: std::io::Read> CsvStreamReader<R> {
    pub fn new(rdr: R, schema: Schema) -> Self {
        let reader = csv::ReaderBuilder::new().has_headers(true).from_reader(rdr);
        CsvStreamReader {
            schema,
            reader,
            done: false,
        }
    }
}

impl<R: std::io::Read + Send> StreamReader for CsvStreamReader<R> {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next_batch(&mut self, max_rows: usize) -> Result<Option<RecordBatch>> {
        if self.done {
            return Ok(None);
        }
        let ncols = self.schema.len();
        let mut columns: Vec<Vec<String>> = vec![Vec::new(); ncols];
        let mut validity: Vec<Vec<bool>> = vec![Vec::new(); ncols];
        let mut rows_read = 0;
        for record in self.reader.records() {
            let record = record?;
            for i in 0..ncols {
                let raw = record.get(i).unwrap_or("");
                let is_null = raw.is_empty();
                columns[i].push(raw.to_string());
                validity[i].push(!is_null);
            }
            rows_read += 1;
            if rows_read >= max_rows {
                break;
            }
        }
        if rows_read == 0 {
            self.done = true;
            return Ok(None);
        }
        if rows_read < max_rows {
            self.done = true;
        }
        let arrays = self
            .schema
            .fields()
            .iter()
            .zip(columns.into_iter().zip(validity.into_iter()))
            .map(|(field, (raw, valid))| parse_column(field.data_type, raw, valid))
            .collect::<Result<Vec<_>>>()?;
        Ok(Some(RecordBatch::try_new(self.schema.clone(), arrays)?))
    }
}

fn parse_column(ty: DataType, raw: Vec<String>, valid: Vec<bool>) -> Result<Array> {
    let data = match ty {
        DataType::Int64 => {
            let mut out = Vec::with_capacity(raw.len());
            for (s, v) in raw.iter().zip(&valid) {
                out.push(if *v {
                    s.parse::<i64>().map_err(|e| Error::io(format!("invalid int64 '{s}': {e}")))?
                } else {
                    0
                });
            }
            ArrayData::Int64(out)
        }
        DataType::Float64 => {
            let mut out = Vec::with_capacity(raw.len());
            for (s, v) in raw.iter().zip(&valid) {
                out.push(if *v {
                    s.parse::<f64>().map_err(|e| Error::io(format!("invalid float64 '{s}': {e}")))?
                } else {
                    0.0
                });
            }
            ArrayData::Float64(out)
        }
        DataType::Bool => {
            let mut out = Vec::with_capacity(raw.len());
            for (s, v) in raw.iter().zip(&valid) {
                out.push(if *v {
                    s.parse::<bool>().map_err(|e| Error::io(format!("invalid bool '{s}': {e}")))?
                } else {
                    false
                });
            }
            ArrayData::Bool(out)
        }
        DataType::Utf8 => ArrayData::Utf8(raw),
        DataType::Date => {
            let mut out = Vec::with_capacity(raw.len());
            for (s, v) in raw.iter().zip(&valid) {
                out.push(if *v {
                    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .map_err(|e| Error::io(format!("invalid date '{s}': {e}")))?
                        .num_days_from_ce()
                        - 719_163
                } else {
                    0
                });
            }
            ArrayData::Date(out)
        }
        DataType::Timestamp(unit) => {
            let mut out = Vec::with_capacity(raw.len());
            for (s, v) in raw.iter().zip(&valid) {
                out.push(if *v {
                    s.parse::<i64>().map_err(|e| Error::io(format!("invalid timestamp '{s}': {e}")))?
                } else {
                    0
                });
            }
            ArrayData::Timestamp(out, unit)
        }
        DataType::Null => ArrayData::Float64(vec![0.0; raw.len()]),
    };
    Ok(Array::new(data, valid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Field;
    use std::io::Cursor;

    #[test]
    fn reads_typed_columns_and_empty_fields_as_null() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64), Field::new("name", DataType::Utf8)]);
        let csv = "id,name\n1,alice\n2,\n";
        let mut reader = CsvStreamReader::new(Cursor::new(csv), schema);
        let batch = reader.next_batch(10).unwrap().unwrap();
        assert_eq!(batch.num_rows(), 2);
        let name = batch.column("name").unwrap();
        assert!(!name.is_valid(1));
        assert!(reader.next_batch(10).unwrap().is_none());
    }

    #[test]
    fn respects_max_rows_across_multiple_calls() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int64)]);
        let csv = "id\n1\n2\n3\n";
        let mut reader = CsvStreamReader::new(Cursor::new(csv), schema);
        let first = reader.next_batch(2).unwrap().unwrap();
        assert_eq!(first.num_rows(), 2);
        let second = reader.next_batch(2).unwrap().unwrap();
        assert_eq!(second.num_rows(), 1);
        assert!(reader.next_batch(2).unwrap().is_none());
    }
}
