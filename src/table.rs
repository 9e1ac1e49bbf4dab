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

//! The public, in-memory result/input container (spec §6 "Table").

use crate::ast::Query;
use crate::binder::bind;
use crate::config::Config;
use crate::data::{Array, ArrayData, RecordBatch, Schema, Value};
use crate::error::{Error, Result};
use crate::operator::{materialize, CancellationToken};
use crate::parser::parse;
use crate::planner::plan;
use crate::stream::StreamReader;

/// An in-memory columnar dataset: a schema plus zero or more batches whose
/// row counts sum to the table's length. The entry point for running SQL
/// (`Table::sql`) and for building input from host data (`from_record_batches`,
/// `from_dict`).
#[derive(Debug, Clone)]
pub struct Table {
    schema: Schema,
    batches: Vec<RecordBatch>,
}

impl Table {
    /// Builds a table from already-batched data; every batch must share
    /// `schema`.
    pub fn from_record_batches(schema: Schema, batches: Vec<RecordBatch>) -> Result<Table> {
        for b in &batches {
            if b.schema() != &schema {
                return Err(Error::operator("batch schema does not match table schema"));
            }
        }
        Ok(Table { schema, batches })
    }

    /// Builds a table from `{ column_name -> column data }`, preserving
    /// insertion order (spec §6: a dict-like constructor for host-language
    /// callers without a CSV file).
    pub fn from_dict(columns: Vec<(String, ArrayData)>) -> Result<Table> {
        let mut fields = Vec::with_capacity(columns.len());
        let mut arrays = Vec::with_capacity(columns.len());
        for (name, data) in columns {
            let array = Array::from_data(data);
            fields.push(crate::data::Field::new(name, array.data_type()));
            arrays.push(array);
        }
        let schema = Schema::new(fields);
        let batch = RecordBatch::try_new(schema.clone(), arrays)?;
        let batches = if batch.num_rows() == 0 { vec![] } else { vec![batch] };
        Ok(Table { schema, batches })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn batches(&self) -> &[RecordBatch] {
        &self.batches
    }

    pub fn num_rows(&self) -> usize {
        self.batches.iter().map(|b| b.num_rows()).sum()
    }

    /// First `n` rows, materialized as a new table.
    pub fn head(&self, n: usize) -> Table {
        let mut remaining = n;
        let mut out = Vec::new();
        for b in &self.batches {
            if remaining == 0 {
                break;
            }
            let take = remaining.min(b.num_rows());
            out.push(b.slice(0, take));
            remaining -= take;
        }
        Table {
            schema: self.schema.clone(),
            batches: out,
        }
    }

    fn bound_query(&self, sql: &str) -> Result<Query> {
        let parsed = parse(sql, &self.schema)?;
        bind(parsed, &self.schema)
    }

    /// Parses, binds, plans and executes `sql` against this table, returning
    /// the result as a new `Table` (spec §6 "Table::sql").
    pub fn sql(&self, sql: &str) -> Result<Table> {
        self.sql_cancellable(sql, CancellationToken::new())
    }

    /// Like [`Table::sql`] but cooperatively cancellable mid-execution
    /// (spec §5).
    pub fn sql_cancellable(&self, sql: &str, cancel: CancellationToken) -> Result<Table> {
        let query = self.bound_query(sql)?;
        let batch_size = Config::global().batch_size();
        let root = plan(&query, self.clone(), batch_size, cancel.clone())?;
        materialize(root, &cancel)
    }

    /// Parses, binds, plans and executes `sql` against a streaming source
    /// rather than a materialized table (spec §6: `StreamReader` accepted as
    /// an alternative source by `sql`). The reader is read to exhaustion;
    /// its schema drives binding.
    pub fn sql_stream(sql: &str, reader: Box<dyn StreamReader>) -> Result<Table> {
        Self::sql_stream_cancellable(sql, reader, CancellationToken::new())
    }

    /// Like [`Table::sql_stream`] but cooperatively cancellable mid-execution
    /// (spec §5).
    pub fn sql_stream_cancellable(sql: &str, reader: Box<dyn StreamReader>, cancel: CancellationToken) -> Result<Table> {
        let schema = reader.schema().clone();
        let parsed = parse(sql, &schema)?;
        let query = bind(parsed, &schema)?;
        let batch_size = Config::global().batch_size();
        let root = plan(&query, reader, batch_size, cancel.clone())?;
        materialize(root, &cancel)
    }

    /// Returns a human-readable rendering of the physical plan without
    /// executing it (spec §6 "Table::explain"). With `with_ast`, the bound
    /// AST is rendered above the plan.
    pub fn explain(&self, sql: &str, with_ast: bool) -> Result<String> {
        let query = self.bound_query(sql)?;
        let batch_size = Config::global().batch_size();
        let root = plan(&query, self.clone(), batch_size, CancellationToken::new())?;
        let plan_str = describe(root.as_ref());
        if with_ast {
            Ok(format!("{query:#?}\n{plan_str}"))
        } else {
            Ok(plan_str)
        }
    }

    /// Row `i` as a vector of values, in schema order. Used by tests and by
    /// the CLI's result printer.
    pub fn row(&self, i: usize) -> Vec<Value> {
        let mut remaining = i;
        for b in &self.batches {
            if remaining < b.num_rows() {
                return (0..b.num_columns()).map(|c| b.column_at(c).get(remaining)).collect();
            }
            remaining -= b.num_rows();
        }
        Vec::new()
    }
}

/// Renders the operator chain bottom-up (source first), one line per
/// operator, each annotated with its output column names.
fn describe(op: &dyn crate::operator::Operator) -> String {
    let mut stages = Vec::new();
    let mut cur = Some(op);
    while let Some(o) = cur {
        stages.push(format!("{}{:?}", o.name(), o.schema().names()));
        cur = o.child();
    }
    stages.reverse();
    stages
        .iter()
        .enumerate()
        .map(|(depth, line)| format!("{}{}", "  ".repeat(depth), line))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{ArrayData, Field};
    use crate::stream::VecStreamReader;

    fn schema() -> Schema {
        Schema::new(vec![Field::new("id", crate::data::DataType::Int64), Field::new("n", crate::data::DataType::Utf8)])
    }

    #[test]
    fn sql_runs_a_select_against_a_materialized_table() {
        let s = schema();
        let batch = RecordBatch::try_new(
            s.clone(),
            vec![Array::from_data(ArrayData::Int64(vec![1, 2])), Array::from_data(ArrayData::Utf8(vec!["a".into(), "b".into()]))],
        )
        .unwrap();
        let table = Table::from_record_batches(s, vec![batch]).unwrap();
        let out = table.sql("SELECT id FROM t WHERE id = 2").unwrap();
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.row(0), vec![Value::Int64(2)]);
    }

    #[test]
    fn sql_stream_runs_a_select_against_a_stream_reader() {
        let s = schema();
        let batch = RecordBatch::try_new(
            s.clone(),
            vec![Array::from_data(ArrayData::Int64(vec![1, 2])), Array::from_data(ArrayData::Utf8(vec!["a".into(), "b".into()]))],
        )
        .unwrap();
        let reader: Box<dyn crate::stream::StreamReader> = Box::new(VecStreamReader::new(s, vec![batch]));
        let out = Table::sql_stream("SELECT id FROM t", reader).unwrap();
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn explain_renders_the_operator_chain_bottom_up() {
        let s = schema();
        let batch = RecordBatch::try_new(
            s.clone(),
            vec![Array::from_data(ArrayData::Int64(vec![1, 2])), Array::from_data(ArrayData::Utf8(vec!["a".into(), "b".into()]))],
        )
        .unwrap();
        let table = Table::from_record_batches(s, vec![batch]).unwrap();
        let plan = table.explain("SELECT id FROM t WHERE id = 2 ORDER BY id LIMIT 1", false).unwrap();
        let lines: Vec<&str> = plan.lines().collect();
        assert!(lines.first().unwrap().contains("TableSource"));
        assert!(lines.last().unwrap().trim_start().starts_with("Slice"));
        assert!(plan.contains("Filter"));
        assert!(plan.contains("Sort"));
    }

    #[test]
    fn from_dict_builds_a_table_preserving_column_order() {
        let table = Table::from_dict(vec![
            ("id".to_string(), ArrayData::Int64(vec![1, 2, 3])),
            ("n".to_string(), ArrayData::Utf8(vec!["x".into(), "y".into(), "z".into()])),
        ])
        .unwrap();
        assert_eq!(table.schema().names(), vec!["id", "n"]);
        assert_eq!(table.num_rows(), 3);
    }
}
