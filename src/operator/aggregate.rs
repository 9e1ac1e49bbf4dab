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

//! Aggregate operator (spec §4.6): buffers its parent, then emits exactly
//! one output batch containing all groups.

use ahash::AHashMap;

use crate::data::{Array, DataType, RecordBatch, Schema, Value};
use crate::error::Result;
use crate::functions::aggregate::{AggKind, Accumulator};

use super::{CancellationToken, Operator};

/// `(func_kind, input_column_name?, output_column_name)`; `input_column` is
/// `None` only for `COUNT_STAR`, which has no argument column (spec §4.6).
#[derive(Clone)]
pub struct AggFuncDef {
    pub kind: AggKind,
    pub input_column: Option<String>,
    pub output_column: String,
}

/// Collapses spec §4.6's four variants into one hash-grouped path (keyed by
/// `Vec<Value>`, empty for the no-group-keys case) backed by `ahash` —
/// structural `Value` equality already gives correct grouping for any mix
/// of numeric/string/temporal keys, so no separate single-numeric-key fast
/// path is needed for correctness (only for performance, which spec §4.6
/// leaves unconstrained beyond O(n) amortized per row).
pub struct AggregateOperator {
    parent: Box<dyn Operator>,
    group_by: Vec<String>,
    funcs: Vec<AggFuncDef>,
    schema: Schema,
    cancel: CancellationToken,
    done: bool,
}

impl AggregateOperator {
    pub fn new(
        parent: Box<dyn Operator>,
        group_by: Vec<String>,
        funcs: Vec<AggFuncDef>,
        schema: Schema,
        cancel: CancellationToken,
    ) -> Self {
        AggregateOperator {
            parent,
            group_by,
            funcs,
            schema,
            cancel,
            done: false,
        }
    }

}

impl Operator for AggregateOperator {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        if self.done {
            return Ok(None);
        }
        self.done = true;

        let mut groups: AHashMap<Vec<Value>, Vec<Accumulator>> = AHashMap::new();
        let mut group_order: Vec<Vec<Value>> = Vec::new();
        let mut parent_schema: Option<Schema> = None;

        while let Some(batch) = self.parent.next()? {
            self.cancel.check()?;
            if parent_schema.is_none() {
                parent_schema = Some(batch.schema().clone());
            }
            let group_cols: Vec<&Array> = self
                .group_by
                .iter()
                .map(|name| batch.column(name).expect("group-by column missing from pre-agg batch"))
                .collect();
            let input_cols: Vec<Option<&Array>> = self
                .funcs
                .iter()
                .map(|f| f.input_column.as_deref().and_then(|n| batch.column(n)))
                .collect();

            for row in 0..batch.num_rows() {
                let key: Vec<Value> = group_cols.iter().map(|c| c.get(row)).collect();
                let funcs = &self.funcs;
                let ps = parent_schema.as_ref().unwrap();
                let accs = groups.entry(key).or_insert_with(|| {
                    funcs
                        .iter()
                        .map(|f| Accumulator::new(f.kind, Self::lookup_type(ps, f)))
                        .collect()
                });
                for (i, def) in self.funcs.iter().enumerate() {
                    match def.kind {
                        AggKind::CountStar => accs[i].count_row(),
                        _ => {
                            let v = input_cols[i].map(|c| c.get(row)).unwrap_or(Value::Null);
                            accs[i].update(&v);
                        }
                    }
                }
            }
        }
        group_order = groups.keys().cloned().collect();

        if self.group_by.is_empty() && groups.is_empty() {
            // No input rows at all but this is a `OneGroupAggregate`
            // (spec §4.6 variant 1): still emit one row of empty-group
            // accumulator results (COUNT 0, SUM 0, MIN/MAX/AVG null).
            let parent_schema = parent_schema.unwrap_or_else(Schema::empty);
            let accs: Vec<Accumulator> = self
                .funcs
                .iter()
                .map(|f| Accumulator::new(f.kind, Self::lookup_type(&parent_schema, f)))
                .collect();
            return Ok(Some(self.build_batch(vec![(Vec::new(), accs)])));
        }

        let rows: Vec<(Vec<Value>, Vec<Accumulator>)> = group_order
            .into_iter()
            .map(|k| {
                let accs = groups.remove(&k).unwrap();
                (k, accs)
            })
            .collect();
        Ok(Some(self.build_batch(rows)))
    }

    fn name(&self) -> &'static str {
        "Aggregate"
    }

    fn child(&self) -> Option<&dyn Operator> {
        Some(self.parent.as_ref())
    }
}

impl AggregateOperator {
    fn lookup_type(schema: &Schema, def: &AggFuncDef) -> DataType {
        match &def.input_column {
            Some(name) => schema.field(name).map(|f| f.data_type).unwrap_or(DataType::Null),
            None => DataType::Null,
        }
    }

    fn build_batch(&self, rows: Vec<(Vec<Value>, Vec<Accumulator>)>) -> RecordBatch {
        let num_rows = rows.len();
        let mut columns = Vec::with_capacity(self.group_by.len() + self.funcs.len());
        for (g, name) in self.group_by.iter().enumerate() {
            let dtype = self.schema.field(name).map(|f| f.data_type).unwrap_or(DataType::Null);
            let values: Vec<Value> = rows.iter().map(|(k, _)| k[g].clone()).collect();
            columns.push(Array::from_values(dtype, values));
        }
        for (f, def) in self.funcs.iter().enumerate() {
            let dtype = self
                .schema
                .field(&def.output_column)
                .map(|fld| fld.data_type)
                .unwrap_or(DataType::Int64);
            let values: Vec<Value> = rows.iter().map(|(_, accs)| accs[f].finish()).collect();
            columns.push(Array::from_values(dtype, values));
        }
        if num_rows == 0 {
            return RecordBatch::empty(self.schema.clone());
        }
        RecordBatch::try_new(self.schema.clone(), columns).expect("aggregate output columns share length by construction")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ArrayData, Field};
    use crate::operator::source::TableSourceOperator;
    use crate::table::Table;

    fn source(group_by_vals: Vec<i64>, metric: Vec<i64>) -> Box<dyn Operator> {
        let schema = Schema::new(vec![Field::new("g", DataType::Int64), Field::new("m", DataType::Int64)]);
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![Array::from_data(ArrayData::Int64(group_by_vals)), Array::from_data(ArrayData::Int64(metric))],
        )
        .unwrap();
        let table = Table::from_record_batches(schema, vec![batch]).unwrap();
        Box::new(TableSourceOperator::new(table, 100, CancellationToken::new()))
    }

    #[test]
    fn groups_and_sums_by_key() {
        let parent = source(vec![1, 1, 2], vec![10, 20, 5]);
        let schema = Schema::new(vec![Field::new("g", DataType::Int64), Field::new("total", DataType::Int64)]);
        let funcs = vec![AggFuncDef {
            kind: AggKind::Sum,
            input_column: Some("m".to_string()),
            output_column: "total".to_string(),
        }];
        let mut op = AggregateOperator::new(parent, vec!["g".to_string()], funcs, schema, CancellationToken::new());
        let batch = op.next().unwrap().unwrap();
        assert_eq!(batch.num_rows(), 2);
        let mut totals: Vec<(i64, i64)> = (0..batch.num_rows())
            .map(|i| {
                let g = batch.column("g").unwrap().get(i).as_i64().unwrap();
                let t = batch.column("total").unwrap().get(i).as_i64().unwrap();
                (g, t)
            })
            .collect();
        totals.sort();
        assert_eq!(totals, vec![(1, 30), (2, 5)]);
        assert!(op.next().unwrap().is_none());
    }

    #[test]
    fn one_group_aggregate_over_empty_input_still_emits_one_row() {
        let schema = Schema::new(vec![Field::new("m", DataType::Int64)]);
        let table = Table::from_record_batches(schema.clone(), vec![]).unwrap();
        let parent: Box<dyn Operator> = Box::new(TableSourceOperator::new(table, 10, CancellationToken::new()));
        let out_schema = Schema::new(vec![Field::new("c", DataType::Int64)]);
        let funcs = vec![AggFuncDef {
            kind: AggKind::CountStar,
            input_column: None,
            output_column: "c".to_string(),
        }];
        let mut op = AggregateOperator::new(parent, vec![], funcs, out_schema, CancellationToken::new());
        let batch = op.next().unwrap().unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(batch.column("c").unwrap().get(0), Value::Int64(0));
    }
}
