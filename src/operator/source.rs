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

//! Leaf operators (spec §4.4): table reader, stream reader, empty source.

use crate::data::{RecordBatch, Schema};
use crate::error::Result;
use crate::stream::StreamReader;
use crate::table::Table;

use super::{CancellationToken, Operator};

/// Yields batches of `batch_size` rows from an in-memory [`Table`],
/// preserving column order.
pub struct TableSourceOperator {
    schema: Schema,
    batches: std::vec::IntoIter<RecordBatch>,
    pending: Option<RecordBatch>,
    batch_size: usize,
    cancel: CancellationToken,
}

impl TableSourceOperator {
    pub fn new(table: Table, batch_size: usize, cancel: CancellationToken) -> Self {
        let schema = table.schema().clone();
        TableSourceOperator {
            schema,
            batches: table.batches().to_vec().into_iter(),
            pending: None,
            batch_size: batch_size.max(1),
            cancel,
        }
    }
}

impl Operator for TableSourceOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        loop {
            if self.pending.is_none() {
                self.pending = self.batches.next();
            }
            let Some(batch) = self.pending.take() else {
                return Ok(None);
            };
            if batch.num_rows() <= self.batch_size {
                return Ok(Some(batch));
            }
            let head = batch.slice(0, self.batch_size);
            let rest = batch.slice(self.batch_size, batch.num_rows() - self.batch_size);
            self.pending = Some(rest);
            return Ok(Some(head));
        }
    }

    fn name(&self) -> &'static str {
        "TableSource"
    }
}

/// Yields batches directly from a host-supplied [`StreamReader`]; each call
/// to `next()` reads at most one batch from the underlying reader.
pub struct StreamSourceOperator {
    schema: Schema,
    reader: Box<dyn StreamReader>,
    batch_size: usize,
    cancel: CancellationToken,
}

impl StreamSourceOperator {
    pub fn new(reader: Box<dyn StreamReader>, batch_size: usize, cancel: CancellationToken) -> Self {
        let schema = reader.schema().clone();
        StreamSourceOperator {
            schema,
            reader,
            batch_size: batch_size.max(1),
            cancel,
        }
    }
}

impl Operator for StreamSourceOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        self.reader.next_batch(self.batch_size)
    }

    fn name(&self) -> &'static str {
        "StreamSource"
    }
}

/// Yields exactly one empty batch (zero columns, `num_rows == 1` so
/// aggregates still fire once over a degenerate no-column-referenced
/// query), then `None` (spec §4.3 rule 2, §4.4 "Empty source").
pub struct EmptySourceOperator {
    schema: Schema,
    emitted: bool,
    num_rows: usize,
    cancel: CancellationToken,
}

impl EmptySourceOperator {
    /// `num_rows = 1` for the degenerate-aggregate case (spec §4.3 rule 2);
    /// `num_rows = 0` is also legal for a genuinely empty relation.
    pub fn new(schema: Schema, num_rows: usize, cancel: CancellationToken) -> Self {
        EmptySourceOperator {
            schema,
            emitted: false,
            num_rows,
            cancel,
        }
    }
}

impl Operator for EmptySourceOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        if self.emitted {
            return Ok(None);
        }
        self.emitted = true;
        if self.schema.is_empty() {
            return Ok(Some(RecordBatch::with_row_count(self.schema.clone(), self.num_rows)));
        }
        // Non-empty schema is not exercised by the planner today (the
        // degenerate source always carries an empty schema), but stays
        // total: fill each column with nulls of the right length.
        let columns = self
            .schema
            .fields()
            .iter()
            .map(|f| crate::data::Array::new(null_data_of(f.data_type, self.num_rows), vec![false; self.num_rows]))
            .collect();
        Ok(Some(RecordBatch::try_new(self.schema.clone(), columns)?))
    }

    fn name(&self) -> &'static str {
        "EmptySource"
    }
}

fn null_data_of(ty: crate::data::DataType, len: usize) -> crate::data::ArrayData {
    use crate::data::{ArrayData, DataType};
    match ty {
        DataType::Null | DataType::Float64 => ArrayData::Float64(vec![0.0; len]),
        DataType::Bool => ArrayData::Bool(vec![false; len]),
        DataType::Int64 => ArrayData::Int64(vec![0; len]),
        DataType::Utf8 => ArrayData::Utf8(vec![String::new(); len]),
        DataType::Timestamp(u) => ArrayData::Timestamp(vec![0; len], u),
        DataType::Date => ArrayData::Date(vec![0; len]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ArrayData, Field};

    #[test]
    fn table_source_splits_into_configured_batch_size() {
        let schema = Schema::new(vec![Field::new("id", crate::data::DataType::Int64)]);
        let batch = RecordBatch::try_new(schema.clone(), vec![crate::data::Array::from_data(ArrayData::Int64(vec![1, 2, 3, 4, 5]))]).unwrap();
        let table = Table::from_record_batches(schema, vec![batch]).unwrap();
        let mut op = TableSourceOperator::new(table, 2, CancellationToken::new());
        assert_eq!(op.next().unwrap().unwrap().num_rows(), 2);
        assert_eq!(op.next().unwrap().unwrap().num_rows(), 2);
        assert_eq!(op.next().unwrap().unwrap().num_rows(), 1);
        assert!(op.next().unwrap().is_none());
    }

    #[test]
    fn empty_source_yields_one_batch_then_stops() {
        let schema = Schema::empty();
        let mut op = EmptySourceOperator::new(schema, 1, CancellationToken::new());
        let batch = op.next().unwrap().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert!(op.next().unwrap().is_none());
    }

    #[test]
    fn cancelled_source_returns_error() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut op = EmptySourceOperator::new(Schema::empty(), 1, cancel);
        assert!(op.next().is_err());
    }
}
