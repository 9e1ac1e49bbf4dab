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

//! Filter operator (spec §4.4 "Filter").

use crate::ast::Expr;
use crate::data::{RecordBatch, Schema};
use crate::error::Result;
use crate::eval::evaluate;

use super::{CancellationToken, Operator};

/// Evaluates a single boolean predicate per input batch and drops rows
/// whose mask entry is false or null (spec §4.4: "null mask entries are
/// treated as false").
pub struct FilterOperator {
    parent: Box<dyn Operator>,
    predicate: Expr,
    cancel: CancellationToken,
}

impl FilterOperator {
    pub fn new(parent: Box<dyn Operator>, predicate: Expr, cancel: CancellationToken) -> Self {
        FilterOperator {
            parent,
            predicate,
            cancel,
        }
    }
}

impl Operator for FilterOperator {
    fn schema(&self) -> &Schema {
        self.parent.schema()
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        loop {
            let Some(batch) = self.parent.next()? else {
                return Ok(None);
            };
            let mask = evaluate(&self.predicate, &batch)?;
            let mask = if mask.len() == 1 && batch.num_rows() != 1 {
                mask.broadcast(batch.num_rows())
            } else {
                mask
            };
            let mut columns = Vec::with_capacity(batch.num_columns());
            for i in 0..batch.num_columns() {
                columns.push(batch.column_at(i).filter_by_mask(&mask)?);
            }
            let out = RecordBatch::try_new(batch.schema().clone(), columns)?;
            // Keep pulling if this batch filtered down to nothing, rather
            // than surfacing a spurious empty batch mid-stream.
            if out.num_rows() == 0 {
                continue;
            }
            return Ok(Some(out));
        }
    }

    fn name(&self) -> &'static str {
        "Filter"
    }

    fn child(&self) -> Option<&dyn Operator> {
        Some(self.parent.as_ref())
    }
}
