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

//! Sort operator (spec §4.5): buffers its parent, sorts once, emits one
//! batch.

use crate::ast::SortOrder;
use crate::data::{Array, DataType, RecordBatch, Schema, Value};
use crate::error::{Error, Result};

use super::{CancellationToken, Operator};

pub struct SortOperator {
    parent: Box<dyn Operator>,
    keys: Vec<String>,
    directions: Vec<SortOrder>,
    schema: Schema,
    cancel: CancellationToken,
    done: bool,
}

impl SortOperator {
    pub fn new(
        parent: Box<dyn Operator>,
        keys: Vec<String>,
        directions: Vec<SortOrder>,
        schema: Schema,
        cancel: CancellationToken,
    ) -> Self {
        SortOperator {
            parent,
            keys,
            directions,
            schema,
            cancel,
            done: false,
        }
    }
}

impl Operator for SortOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let mut batches = Vec::new();
        while let Some(b) = self.parent.next()? {
            self.cancel.check()?;
            batches.push(b);
        }
        if batches.is_empty() {
            return Ok(Some(RecordBatch::empty(self.schema.clone())));
        }

        let ncols = self.schema.len();
        let mut columns = Vec::with_capacity(ncols);
        for i in 0..ncols {
            let parts: Vec<&Array> = batches.iter().map(|b| b.column_at(i)).collect();
            columns.push(Array::concat(&parts)?);
        }
        let merged = RecordBatch::try_new(self.schema.clone(), columns)?;

        for key in &self.keys {
            let col = merged
                .column(key)
                .ok_or_else(|| Error::planner(format!("sort key '{key}' not found")))?;
            if col.data_type() == DataType::Bool {
                return Err(Error::operator(format!("cannot sort by boolean column '{key}'")));
            }
        }

        let n = merged.num_rows();
        let mut idx: Vec<usize> = (0..n).collect();
        idx.sort_by(|&a, &b| {
            for (key, dir) in self.keys.iter().zip(&self.directions) {
                let col = merged.column(key).unwrap();
                let ord = compare_for_key(&col.get(a), &col.get(b), *dir);
                if ord != std::cmp::Ordering::Equal {
                    return ord;
                }
            }
            std::cmp::Ordering::Equal
        });

        let out_columns = (0..ncols).map(|i| merged.column_at(i).take(&idx)).collect();
        Ok(Some(RecordBatch::try_new(self.schema.clone(), out_columns)?))
    }

    fn name(&self) -> &'static str {
        "Sort"
    }

    fn child(&self) -> Option<&dyn Operator> {
        Some(self.parent.as_ref())
    }
}

/// Nulls sort last regardless of direction (spec §4.5); only non-null
/// comparisons are reversed for `Desc`.
fn compare_for_key(a: &Value, b: &Value, dir: SortOrder) -> std::cmp::Ordering {
    use std::cmp::Ordering::*;
    match (a.is_null(), b.is_null()) {
        (true, true) => Equal,
        (true, false) => Greater,
        (false, true) => Less,
        (false, false) => {
            let ord = a.cmp_for_sort(b);
            if dir == SortOrder::Desc {
                ord.reverse()
            } else {
                ord
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ArrayData, Field};
    use crate::operator::source::TableSourceOperator;
    use crate::table::Table;

    fn build(values: Vec<i64>, valid: Vec<bool>) -> Box<dyn Operator> {
        let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
        let batch = RecordBatch::try_new(schema.clone(), vec![Array::new(ArrayData::Int64(values), valid)]).unwrap();
        let table = Table::from_record_batches(schema, vec![batch]).unwrap();
        Box::new(TableSourceOperator::new(table, 100, CancellationToken::new()))
    }

    #[test]
    fn nulls_sort_last_in_ascending_and_descending() {
        let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
        for dir in [SortOrder::Asc, SortOrder::Desc] {
            let parent = build(vec![3, 1, 2], vec![true, false, true]);
            let mut op = SortOperator::new(parent, vec!["x".to_string()], vec![dir], schema.clone(), CancellationToken::new());
            let batch = op.next().unwrap().unwrap();
            assert!(!batch.column("x").unwrap().is_valid(2), "null must be last for {dir:?}");
        }
    }

    #[test]
    fn rejects_boolean_sort_key() {
        let schema = Schema::new(vec![Field::new("b", DataType::Bool)]);
        let batch = RecordBatch::try_new(schema.clone(), vec![Array::from_data(ArrayData::Bool(vec![true, false]))]).unwrap();
        let table = Table::from_record_batches(schema.clone(), vec![batch]).unwrap();
        let parent = Box::new(TableSourceOperator::new(table, 10, CancellationToken::new()));
        let mut op = SortOperator::new(parent, vec!["b".to_string()], vec![SortOrder::Asc], schema, CancellationToken::new());
        assert!(op.next().unwrap_err().to_string().contains("boolean"));
    }
}
