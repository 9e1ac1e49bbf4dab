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

//! `(schema, columns[])` where every column shares `num_rows` (spec §3
//! "Record Batch").

use super::array::Array;
use super::schema::Schema;
use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct RecordBatch {
    schema: Schema,
    columns: Vec<Array>,
    /// Authoritative row count. Mirrors `columns[0].len()` whenever there is
    /// at least one column; tracked separately so a zero-column batch (the
    /// degenerate-projection synthetic source, spec §4.3 rule 2) can still
    /// report a non-zero row count.
    row_count: usize,
}

impl RecordBatch {
    pub fn try_new(schema: Schema, columns: Vec<Array>) -> Result<Self> {
        if schema.len() != columns.len() {
            return Err(Error::operator(format!(
                "schema has {} fields but {} columns were supplied",
                schema.len(),
                columns.len()
            )));
        }
        let len = columns.first().map(|c| c.len());
        if let Some(len) = len {
            if columns.iter().any(|c| c.len() != len) {
                return Err(Error::operator("unequal sizes"));
            }
        }
        let row_count = len.unwrap_or(0);
        Ok(RecordBatch {
            schema,
            columns,
            row_count,
        })
    }

    /// A batch with a schema but zero rows.
    pub fn empty(schema: Schema) -> Self {
        let columns = schema
            .fields()
            .iter()
            .map(|f| Array::empty_of(f.data_type))
            .collect();
        RecordBatch {
            schema,
            columns,
            row_count: 0,
        }
    }

    /// A batch with no columns but `row_count` rows — used only for the
    /// synthetic source that lets a fully degenerate (no column referenced
    /// at all) projection still flow `row_count` rows downstream.
    pub fn with_row_count(schema: Schema, row_count: usize) -> Self {
        debug_assert!(schema.is_empty());
        RecordBatch {
            schema,
            columns: Vec::new(),
            row_count,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn columns(&self) -> &[Array] {
        &self.columns
    }

    pub fn num_rows(&self) -> usize {
        self.row_count
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, name: &str) -> Option<&Array> {
        self.schema.index_of(name).map(|i| &self.columns[i])
    }

    pub fn column_at(&self, i: usize) -> &Array {
        &self.columns[i]
    }

    /// Returns a new batch with `name -> array` appended (or replacing an
    /// existing column of that name, used when a CSE materialization under a
    /// `shared_id` is recomputed for a differently-shaped parent batch).
    pub fn with_column(&self, name: &str, array: Array) -> Result<RecordBatch> {
        if array.len() != self.num_rows() && self.num_rows() != 0 {
            return Err(Error::operator("unequal sizes"));
        }
        if let Some(i) = self.schema.index_of(name) {
            let mut columns = self.columns.clone();
            columns[i] = array;
            return RecordBatch::try_new(self.schema.clone(), columns);
        }
        let mut schema = self.schema.clone();
        schema.push_unique(super::schema::Field::new(name, array.data_type()));
        let mut columns = self.columns.clone();
        columns.push(array);
        RecordBatch::try_new(schema, columns)
    }

    pub fn project_by_name(&self, names: &[&str]) -> Result<RecordBatch> {
        let schema = self.schema.project(names)?;
        let columns = names
            .iter()
            .map(|n| self.column(n).cloned().unwrap())
            .collect();
        RecordBatch::try_new(schema, columns)
    }

    pub fn slice(&self, start: usize, len: usize) -> RecordBatch {
        if self.columns.is_empty() {
            return RecordBatch::with_row_count(self.schema.clone(), len.min(self.row_count.saturating_sub(start)));
        }
        let columns = self.columns.iter().map(|c| c.slice(start, len)).collect();
        RecordBatch {
            schema: self.schema.clone(),
            columns,
            row_count: len,
        }
    }
}

impl Array {
    /// Produce a zero-length array of the requested logical type.
    pub fn empty_of(ty: crate::data::value::DataType) -> Array {
        use crate::data::array::ArrayData;
        use crate::data::value::DataType;
        let data = match ty {
            DataType::Null | DataType::Float64 => ArrayData::Float64(vec![]),
            DataType::Bool => ArrayData::Bool(vec![]),
            DataType::Int64 => ArrayData::Int64(vec![]),
            DataType::Utf8 => ArrayData::Utf8(vec![]),
            DataType::Timestamp(u) => ArrayData::Timestamp(vec![], u),
            DataType::Date => ArrayData::Date(vec![]),
        };
        Array::from_data(data)
    }
}
