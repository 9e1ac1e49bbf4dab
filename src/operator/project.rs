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

//! Projection operator (spec §4.4 "Project").

use crate::ast::Expr;
use crate::data::{Array, RecordBatch, Schema};
use crate::error::{Error, Result};
use crate::eval::evaluate;

use super::{CancellationToken, Operator};

/// Evaluates `exprs` (in order, each already named by the planner) against
/// every input batch. When `keep_input` is set the output is input columns
/// followed by the new columns; otherwise only the new columns survive.
pub struct ProjectOperator {
    parent: Box<dyn Operator>,
    exprs: Vec<(String, Expr)>,
    keep_input: bool,
    schema: Schema,
    cancel: CancellationToken,
}

impl ProjectOperator {
    pub fn new(
        parent: Box<dyn Operator>,
        exprs: Vec<(String, Expr)>,
        keep_input: bool,
        schema: Schema,
        cancel: CancellationToken,
    ) -> Self {
        ProjectOperator {
            parent,
            exprs,
            keep_input,
            schema,
            cancel,
        }
    }
}

impl Operator for ProjectOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        let Some(batch) = self.parent.next()? else {
            return Ok(None);
        };

        let mut computed = Vec::with_capacity(self.exprs.len());
        for (name, expr) in &self.exprs {
            computed.push((name.clone(), evaluate(expr, &batch)?));
        }

        // Every non-scalar evaluated column already has length
        // `batch.num_rows()` by construction; only scalar (literal) results
        // need broadcasting up or down to match it.
        let max_len = batch.num_rows();

        let mut names: Vec<String> = Vec::new();
        let mut arrays: Vec<Array> = Vec::new();
        if self.keep_input {
            for i in 0..batch.num_columns() {
                names.push(batch.schema().fields()[i].name.clone());
                arrays.push(align_one(batch.column_at(i).clone(), max_len)?);
            }
        }
        for (name, array) in computed {
            names.push(name);
            arrays.push(align_one(array, max_len)?);
        }

        let name_refs: Vec<&str> = names.iter().map(|s| s.as_str()).collect();
        let schema = self.schema.clone();
        // The final schema already carries dedup-suffixed names from the
        // planner; re-derive it here only if shapes genuinely differ
        // (keep_input passthrough batches always match by construction).
        if name_refs.len() == schema.len() {
            RecordBatch::try_new(schema, arrays).map(Some)
        } else {
            Err(Error::operator("unequal sizes"))
        }
    }

    fn name(&self) -> &'static str {
        "Project"
    }

    fn child(&self) -> Option<&dyn Operator> {
        Some(self.parent.as_ref())
    }
}

fn align_one(array: Array, len: usize) -> Result<Array> {
    if array.len() == len {
        Ok(array)
    } else if array.len() == 1 {
        Ok(array.broadcast(len))
    } else {
        Err(Error::operator("unequal sizes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::OpTag;
    use crate::data::{ArrayData, DataType, Field, Value};
    use crate::operator::source::TableSourceOperator;
    use crate::table::Table;

    fn one_row_table() -> Table {
        let schema = Schema::new(vec![Field::new("x", DataType::Int64)]);
        let batch = RecordBatch::try_new(schema.clone(), vec![Array::from_data(ArrayData::Int64(vec![1, 2, 3]))]).unwrap();
        Table::from_record_batches(schema, vec![batch]).unwrap()
    }

    #[test]
    fn keep_input_appends_new_columns() {
        let table = one_row_table();
        let parent = TableSourceOperator::new(table, 10, CancellationToken::new());
        let schema = Schema::new(vec![
            Field::new("x", DataType::Int64),
            Field::new("doubled", DataType::Int64),
        ]);
        let expr = Expr::op(OpTag::Mul, vec![Expr::column("x"), Expr::literal(Value::Int64(2))]);
        let mut op = ProjectOperator::new(
            Box::new(parent),
            vec![("doubled".to_string(), expr)],
            true,
            schema,
            CancellationToken::new(),
        );
        let batch = op.next().unwrap().unwrap();
        assert_eq!(batch.num_columns(), 2);
        assert_eq!(batch.column("doubled").unwrap().get(0), Value::Int64(2));
    }

    #[test]
    fn drop_input_keeps_only_new_columns() {
        let table = one_row_table();
        let parent = TableSourceOperator::new(table, 10, CancellationToken::new());
        let schema = Schema::new(vec![Field::new("col_0", DataType::Int64)]);
        let mut op = ProjectOperator::new(
            Box::new(parent),
            vec![("col_0".to_string(), Expr::column("x"))],
            false,
            schema,
            CancellationToken::new(),
        );
        let batch = op.next().unwrap().unwrap();
        assert_eq!(batch.num_columns(), 1);
    }
}
