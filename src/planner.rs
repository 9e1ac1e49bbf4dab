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

//! Lowers a bound [`Query`] into a pull-based physical operator tree (spec
//! §4.3): one function per lowering rule, applied in order.

use std::collections::{HashMap, HashSet};

use crate::ast::{Expr, ExprNode, OpTag, Query};
use crate::data::{DataType, Field, Schema};
use crate::error::{Error, Result};
use crate::functions::aggregate::AggKind;
use crate::functions::{agg_kind_for, is_aggregate_name};
use crate::operator::aggregate::AggFuncDef;
use crate::operator::{
    AggregateOperator, CancellationToken, EmptySourceOperator, FilterOperator, Operator, ProjectOperator, SliceOperator,
    SortOperator, StreamSourceOperator, TableSourceOperator,
};
use crate::stream::StreamReader;
use crate::table::Table;

/// Rule 1's input: either a fully materialized [`Table`] or a host-supplied
/// [`StreamReader`] (spec §6: "`StreamReader` accepted as an alternative
/// source by `sql`").
pub enum Source {
    Table(Table),
    Stream(Box<dyn StreamReader>),
}

impl Source {
    fn schema(&self) -> Schema {
        match self {
            Source::Table(t) => t.schema().clone(),
            Source::Stream(r) => r.schema().clone(),
        }
    }
}

impl From<Table> for Source {
    fn from(t: Table) -> Self {
        Source::Table(t)
    }
}

impl From<Box<dyn StreamReader>> for Source {
    fn from(r: Box<dyn StreamReader>) -> Self {
        Source::Stream(r)
    }
}

/// `plan(bound_query, source) -> Operator` (spec §4.3).
pub fn plan(query: &Query, source: impl Into<Source>, batch_size: usize, cancel: CancellationToken) -> Result<Box<dyn Operator>> {
    let mut q = query.clone();
    let source = source.into();
    let table_schema = source.schema();

    // Rule 1: source.
    let mut root: Box<dyn Operator> = match source {
        Source::Table(table) => Box::new(TableSourceOperator::new(table, batch_size, cancel.clone())),
        Source::Stream(reader) => Box::new(StreamSourceOperator::new(reader, batch_size, cancel.clone())),
    };

    // Rule 2: column pruning.
    root = prune_columns(root, &q, &table_schema, &cancel)?;

    // Rule 3: WHERE.
    if let Some(w) = q.where_clause.clone() {
        root = Box::new(FilterOperator::new(root, w, cancel.clone()));
    }

    // Rule 4: aggregation.
    if q.is_aggregate {
        root = lower_aggregation(root, &mut q, &cancel)?;
    }

    // Rule 5: HAVING.
    if let Some(h) = q.having.clone() {
        root = Box::new(FilterOperator::new(root, h, cancel.clone()));
    }

    // Rule 6: ORDER BY.
    if !q.order_by.is_empty() {
        root = lower_order_by(root, &q, &cancel)?;
    }

    // Rule 7: final projection.
    root = lower_final_projection(root, &q, &cancel)?;

    // Rule 8: LIMIT/OFFSET.
    if q.limit.is_some() || q.offset != 0 {
        root = Box::new(SliceOperator::new(root, q.limit, q.offset, cancel.clone()));
    }

    Ok(root)
}

/// Rule 2: insert a Project that passes only the referenced columns, or
/// substitute a synthetic one-row source for a fully degenerate query.
fn prune_columns(root: Box<dyn Operator>, query: &Query, schema: &Schema, cancel: &CancellationToken) -> Result<Box<dyn Operator>> {
    let referenced = referenced_columns(query);
    if referenced.is_empty() {
        if references_count_star(query) {
            let first = schema
                .fields()
                .first()
                .ok_or_else(|| Error::planner("count(*) requires at least one schema column"))?
                .clone();
            let project_schema = Schema::new(vec![first.clone()]);
            let exprs = vec![(first.name.clone(), Expr::column(first.name.clone()))];
            return Ok(Box::new(ProjectOperator::new(root, exprs, false, project_schema, cancel.clone())));
        }
        // Fully degenerate: no column referenced anywhere, not even count(*).
        return Ok(Box::new(EmptySourceOperator::new(Schema::empty(), 1, cancel.clone())));
    }
    if referenced.len() < schema.len() {
        let names: Vec<&str> = schema.names().into_iter().filter(|n| referenced.contains(*n)).collect();
        let project_schema = schema.project(&names)?;
        let exprs = names.iter().map(|n| (n.to_string(), Expr::column(*n))).collect();
        return Ok(Box::new(ProjectOperator::new(root, exprs, false, project_schema, cancel.clone())));
    }
    Ok(root)
}

fn references_count_star(query: &Query) -> bool {
    let mut found = false;
    let mut check = |e: &Expr| {
        e.walk(&mut |node| {
            if let Some(n) = node.as_expr_node() {
                if n.op_tag == OpTag::Function && n.function_name.as_deref() == Some("count_star") {
                    found = true;
                }
            }
        });
    };
    for e in &query.select_exprs {
        check(e);
    }
    if let Some(h) = &query.having {
        check(h);
    }
    found
}

fn referenced_columns(query: &Query) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut collect = |e: &Expr| {
        e.walk(&mut |node| {
            if let Some(c) = node.as_column() {
                names.insert(c.name.clone());
            }
        });
    };
    for e in &query.select_exprs {
        collect(e);
    }
    if let Some(w) = &query.where_clause {
        collect(w);
    }
    for g in &query.group_by {
        collect(g);
    }
    if let Some(h) = &query.having {
        collect(h);
    }
    for o in &query.order_by {
        collect(o);
    }
    names
}

/// One materialized (aggregate call or compound GROUP BY key) target,
/// identified by its `shared_id`.
struct PendingAgg {
    kind: AggKind,
    arg: Option<Expr>,
}

/// Rule 4: extract aggregate calls and compound GROUP BY keys into an
/// intermediate Project, then replace them in SELECT/HAVING/ORDER BY with
/// ColumnRefs, and collapse the stream into one Aggregate batch.
fn lower_aggregation(root: Box<dyn Operator>, q: &mut Query, cancel: &CancellationToken) -> Result<Box<dyn Operator>> {
    // DISTINCT with no explicit GROUP BY lowers to an implicit GROUP BY over
    // the full SELECT output list (spec §4.2: distinct forces `is_aggregate`;
    // §4.3 gives no separate DISTINCT rule, so dedup reuses the same Aggregate
    // machinery with zero aggregate functions).
    let group_by: Vec<Expr> = if !q.group_by.is_empty() {
        q.group_by.clone()
    } else if q.distinct {
        q.select_exprs.clone()
    } else {
        Vec::new()
    };

    let mut agg_order: Vec<String> = Vec::new();
    let mut agg_by_id: HashMap<String, PendingAgg> = HashMap::new();
    collect_aggregates(&q.select_exprs, &mut agg_order, &mut agg_by_id);
    collect_aggregates(&group_by, &mut agg_order, &mut agg_by_id);
    if let Some(h) = &q.having {
        collect_aggregates(std::slice::from_ref(h), &mut agg_order, &mut agg_by_id);
    }
    collect_aggregates(&q.order_by, &mut agg_order, &mut agg_by_id);

    let mut pre_agg: Vec<(String, Expr)> = Vec::new();
    let mut pre_agg_seen: HashSet<String> = HashSet::new();

    let mut group_cols: Vec<String> = Vec::new();
    for g in &group_by {
        match g {
            Expr::ColumnRef(c) => group_cols.push(c.name.clone()),
            Expr::Expr(node) => {
                let id = node
                    .shared_id
                    .clone()
                    .ok_or_else(|| Error::planner("compound GROUP BY expression missing shared_id"))?;
                if pre_agg_seen.insert(id.clone()) {
                    pre_agg.push((id.clone(), g.clone()));
                }
                group_cols.push(id);
            }
            Expr::Literal(_) => return Err(Error::planner("GROUP BY may not name a literal")),
        }
    }

    let mut agg_defs: Vec<AggFuncDef> = Vec::with_capacity(agg_order.len());
    for id in &agg_order {
        let pending = agg_by_id.get(id).expect("agg_order entries always present in agg_by_id");
        let input_column = match (&pending.arg, pending.kind) {
            (_, AggKind::CountStar) => None,
            (Some(Expr::ColumnRef(c)), _) => Some(c.name.clone()),
            (Some(Expr::Expr(node)), _) => {
                let arg_id = node
                    .shared_id
                    .clone()
                    .ok_or_else(|| Error::planner("aggregate argument expression missing shared_id"))?;
                if pre_agg_seen.insert(arg_id.clone()) {
                    pre_agg.push((arg_id.clone(), pending.arg.clone().unwrap()));
                }
                Some(arg_id)
            }
            (Some(Expr::Literal(_)), _) => {
                let name = format!("lit_agg_{id}");
                if pre_agg_seen.insert(name.clone()) {
                    pre_agg.push((name.clone(), pending.arg.clone().unwrap()));
                }
                Some(name)
            }
            (None, _) => return Err(Error::planner(format!("aggregate '{id}' requires an argument"))),
        };
        agg_defs.push(AggFuncDef {
            kind: pending.kind,
            input_column,
            output_column: id.clone(),
        });
    }

    // Rewrite every occurrence of an extracted aggregate or compound GROUP BY
    // key, anywhere in SELECT/HAVING/ORDER BY, into a ColumnRef naming its
    // materialized/output column.
    let mut targets: HashSet<String> = agg_order.iter().cloned().collect();
    targets.extend(group_cols_compound_ids(&group_by));
    for e in &mut q.select_exprs {
        rewrite_to_column_refs(e, &targets);
    }
    if let Some(h) = &mut q.having {
        rewrite_to_column_refs(h, &targets);
    }
    for o in &mut q.order_by {
        rewrite_to_column_refs(o, &targets);
    }

    let mut current_schema = root.schema().clone();
    let mut root = root;
    if !pre_agg.is_empty() {
        let mut new_schema = current_schema.clone();
        for (name, expr) in &pre_agg {
            new_schema.push_unique(Field::new(name.clone(), infer_type(expr, &current_schema)?));
        }
        root = Box::new(ProjectOperator::new(root, pre_agg, true, new_schema.clone(), cancel.clone()));
        current_schema = new_schema;
    }

    let mut out_fields = Vec::with_capacity(group_cols.len() + agg_defs.len());
    for name in &group_cols {
        let field = current_schema
            .field(name)
            .ok_or_else(|| Error::planner(format!("group-by column '{name}' not found")))?;
        out_fields.push(field.clone());
    }
    for def in &agg_defs {
        let input_type = match &def.input_column {
            Some(name) => current_schema.field(name).map(|f| f.data_type).unwrap_or(DataType::Null),
            None => DataType::Int64,
        };
        out_fields.push(Field::new(def.output_column.clone(), agg_output_type(def.kind, input_type)));
    }
    let agg_schema = Schema::new(out_fields);
    Ok(Box::new(AggregateOperator::new(root, group_cols, agg_defs, agg_schema, cancel.clone())))
}

fn group_cols_compound_ids(group_by: &[Expr]) -> Vec<String> {
    group_by.iter().filter_map(|g| g.shared_id().map(|s| s.to_string())).collect()
}

/// Walks `exprs`, recording every aggregate function call by its `shared_id`
/// in first-seen order (CountStar calls take no argument).
fn collect_aggregates(exprs: &[Expr], order: &mut Vec<String>, by_id: &mut HashMap<String, PendingAgg>) {
    for e in exprs {
        e.walk(&mut |node| {
            let Some(n) = node.as_expr_node() else { return };
            if n.op_tag != OpTag::Function {
                return;
            }
            let Some(name) = &n.function_name else { return };
            let Some(kind) = agg_kind_for(name) else { return };
            let Some(id) = node.shared_id() else { return };
            if by_id.contains_key(id) {
                return;
            }
            let arg = n.args.first().cloned();
            let id = id.to_string();
            order.push(id.clone());
            by_id.insert(id.clone(), PendingAgg { kind, arg });
        });
    }
}

/// Replaces every `Expr::Expr` node whose `shared_id` is in `targets` with a
/// `ColumnRef` to that id, preserving the node's own alias. Relies on
/// `walk_mut`'s post-replacement check (the node is no longer `Expr::Expr`)
/// to avoid descending into a consumed node's now-orphaned arguments.
fn rewrite_to_column_refs(expr: &mut Expr, targets: &HashSet<String>) {
    expr.walk_mut(&mut |node| {
        let target_id = match node {
            Expr::Expr(inner) => inner.shared_id.clone(),
            _ => None,
        };
        let Some(id) = target_id else { return };
        if !targets.contains(&id) {
            return;
        }
        let alias = node.alias().map(|s| s.to_string());
        *node = Expr::ColumnRef(crate::ast::ColumnRef { name: id, alias });
    });
}

fn agg_output_type(kind: AggKind, input_type: DataType) -> DataType {
    match kind {
        AggKind::Count | AggKind::CountStar => DataType::Int64,
        AggKind::Min | AggKind::Max => input_type,
        AggKind::Sum => {
            if input_type == DataType::Float64 {
                DataType::Float64
            } else {
                DataType::Int64
            }
        }
        AggKind::Avg => DataType::Float64,
    }
}

/// Rule 6: materialize compound ORDER BY keys under their shared/fresh name,
/// then sort by column names.
fn lower_order_by(root: Box<dyn Operator>, q: &Query, cancel: &CancellationToken) -> Result<Box<dyn Operator>> {
    let current_schema = root.schema().clone();
    let mut keys: Vec<String> = Vec::with_capacity(q.order_by.len());
    let mut pre_sort: Vec<(String, Expr)> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for key in &q.order_by {
        match key {
            Expr::ColumnRef(c) => keys.push(c.name.clone()),
            Expr::Expr(node) => {
                let id = node
                    .shared_id
                    .clone()
                    .ok_or_else(|| Error::planner("compound ORDER BY expression missing shared_id"))?;
                if seen.insert(id.clone()) {
                    pre_sort.push((id.clone(), key.clone()));
                }
                keys.push(id);
            }
            Expr::Literal(_) => return Err(Error::planner("ORDER BY may not name a literal")),
        }
    }

    let mut root = root;
    let mut schema_after_pre = current_schema.clone();
    if !pre_sort.is_empty() {
        let mut new_schema = current_schema.clone();
        for (name, expr) in &pre_sort {
            new_schema.push_unique(Field::new(name.clone(), infer_type(expr, &current_schema)?));
        }
        root = Box::new(ProjectOperator::new(root, pre_sort, true, new_schema.clone(), cancel.clone()));
        schema_after_pre = new_schema;
    }

    Ok(Box::new(SortOperator::new(root, keys, q.sort_order.clone(), schema_after_pre, cancel.clone())))
}

/// Rule 7: exactly the SELECT output columns in order; duplicate names get
/// `_1`, `_2`, ... suffixes.
fn lower_final_projection(root: Box<dyn Operator>, q: &Query, cancel: &CancellationToken) -> Result<Box<dyn Operator>> {
    let current_schema = root.schema().clone();
    let mut exprs: Vec<(String, Expr)> = Vec::with_capacity(q.select_exprs.len());
    let mut schema = Schema::empty();
    for (k, e) in q.select_exprs.iter().enumerate() {
        let base_name = e.alias().map(|s| s.to_string()).unwrap_or_else(|| e.default_name(k));
        let dtype = infer_type(e, &current_schema)?;
        schema.push_unique(Field::new(base_name, dtype));
        let name = schema.fields()[k].name.clone();
        exprs.push((name, e.clone()));
    }
    Ok(Box::new(ProjectOperator::new(root, exprs, false, schema, cancel.clone())))
}

/// Planning-time return-type inference, used only to size Schemas ahead of
/// execution; `eval.rs` itself never consults this (it is purely dynamic).
fn infer_type(expr: &Expr, schema: &Schema) -> Result<DataType> {
    match expr {
        Expr::Literal(l) => Ok(l.value.data_type()),
        Expr::ColumnRef(c) => schema
            .field(&c.name)
            .map(|f| f.data_type)
            .ok_or_else(|| Error::planner(format!("column '{}' not found", c.name))),
        Expr::Expr(node) => infer_node_type(node, schema),
    }
}

fn infer_node_type(node: &ExprNode, schema: &Schema) -> Result<DataType> {
    use OpTag::*;
    match node.op_tag {
        Add | Sub | Mul | Mod => {
            let mut is_float = false;
            for a in &node.args {
                if matches!(infer_type(a, schema)?, DataType::Float64) {
                    is_float = true;
                }
            }
            Ok(if is_float { DataType::Float64 } else { DataType::Int64 })
        }
        Div => Ok(DataType::Float64),
        Neg => infer_type(&node.args[0], schema),
        BitNot | BitAnd | BitOr | BitXor => Ok(DataType::Int64),
        Concat => Ok(DataType::Utf8),
        Eq | Neq | Gt | Gte | Lt | Lte | And | Or | Not | IsNull | IsNotNull | In | NotIn | Between | NotBetween | Like
        | NotLike | Distinct => Ok(DataType::Bool),
        Function => {
            let name = node.function_name.as_deref().unwrap_or("");
            if is_aggregate_name(name) {
                // Reached only if the aggregation rewrite missed a call
                // (internal planner bug, not a user-facing condition).
                return Err(Error::planner(format!("unresolved aggregate call '{name}' reached final projection")));
            }
            function_return_type(name, &node.args, schema)
        }
    }
}

fn function_return_type(name: &str, args: &[Expr], schema: &Schema) -> Result<DataType> {
    let lname = name.to_lowercase();
    let lname = lname.strip_prefix("np.").unwrap_or(&lname);
    match lname {
        "abs" | "sqrt" | "exp" | "ln" | "log" | "log2" | "log10" | "sin" | "cos" | "tan" | "floor" | "ceil" | "round" | "pow"
        | "power" => Ok(DataType::Float64),
        "upper" | "lower" | "trim" => Ok(DataType::Utf8),
        "length" | "len" | "year" | "month" | "day" => Ok(DataType::Int64),
        "cast" => cast_target_type(args),
        "count_star" => Ok(DataType::Int64),
        other => {
            // User-registered scalar/vector function: no static signature is
            // tracked (spec §4.7 functions are opaque column-in/column-out
            // kernels), so fall back to the first argument's type, or Float64
            // for a nullary call.
            match args.first() {
                Some(a) => infer_type(a, schema),
                None => {
                    let _ = other;
                    Ok(DataType::Float64)
                }
            }
        }
    }
}

fn cast_target_type(args: &[Expr]) -> Result<DataType> {
    let target = args
        .get(1)
        .and_then(|a| match a {
            Expr::Literal(l) => match &l.value {
                crate::data::Value::Utf8(s) => Some(s.clone()),
                _ => None,
            },
            _ => None,
        })
        .ok_or_else(|| Error::planner("cast target type must be a string literal"))?;
    match target.as_str() {
        "int64" => Ok(DataType::Int64),
        "float64" => Ok(DataType::Float64),
        "string" => Ok(DataType::Utf8),
        "bool" => Ok(DataType::Bool),
        other => Err(Error::planner(format!("unsupported cast target '{other}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SortOrder;
    use crate::data::{Array, ArrayData, RecordBatch, Value};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("vendor", DataType::Int64),
            Field::new("total", DataType::Float64),
        ])
    }

    fn table() -> Table {
        let s = schema();
        let batch = RecordBatch::try_new(
            s.clone(),
            vec![
                Array::from_data(ArrayData::Int64(vec![1, 2, 3])),
                Array::from_data(ArrayData::Int64(vec![10, 10, 20])),
                Array::from_data(ArrayData::Float64(vec![1.5, 2.5, 3.5])),
            ],
        )
        .unwrap();
        Table::from_record_batches(s, vec![batch]).unwrap()
    }

    fn run(q: Query) -> Table {
        let root = plan(&q, table(), 100, CancellationToken::new()).unwrap();
        crate::operator::materialize(root, &CancellationToken::new()).unwrap()
    }

    #[test]
    fn plain_select_prunes_unreferenced_columns() {
        let q = crate::binder::bind(Query::new(vec![Expr::column("id")]), &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.schema().len(), 1);
        assert_eq!(out.num_rows(), 3);
    }

    #[test]
    fn count_star_over_no_columns_still_scans_input() {
        let select = Expr::func("count_star", vec![]);
        let q = crate::binder::bind(Query::new(vec![select]), &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.row(0), vec![Value::Int64(3)]);
    }

    #[test]
    fn group_by_with_compound_key_and_sum() {
        let group_key = Expr::op(OpTag::Mod, vec![Expr::column("vendor"), Expr::literal(Value::Int64(100))]);
        let sum = Expr::func("sum", vec![Expr::column("total")]);
        let mut q = Query::new(vec![group_key.clone(), sum]);
        q.group_by = vec![group_key];
        let q = crate::binder::bind(q, &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn distinct_dedupes_without_explicit_group_by() {
        let q = Query {
            distinct: true,
            ..Query::new(vec![Expr::column("vendor")])
        };
        let q = crate::binder::bind(q, &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.num_rows(), 2);
    }

    #[test]
    fn order_by_compound_expression_materializes_key() {
        let neg_id = Expr::op(OpTag::Neg, vec![Expr::column("id")]);
        let mut q = Query::new(vec![Expr::column("id")]);
        q.order_by = vec![neg_id];
        q.sort_order = vec![SortOrder::Asc];
        let q = crate::binder::bind(q, &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.row(0), vec![Value::Int64(3)]);
        assert_eq!(out.row(2), vec![Value::Int64(1)]);
    }

    #[test]
    fn limit_offset_applied_last() {
        let mut q = Query::new(vec![Expr::column("id")]);
        q.limit = Some(1);
        q.offset = 1;
        let q = crate::binder::bind(q, &schema()).unwrap();
        let out = run(q);
        assert_eq!(out.num_rows(), 1);
        assert_eq!(out.row(0), vec![Value::Int64(2)]);
    }

    #[test]
    fn plans_over_a_stream_reader_source() {
        let s = schema();
        let batch = RecordBatch::try_new(
            s.clone(),
            vec![
                Array::from_data(ArrayData::Int64(vec![1, 2, 3])),
                Array::from_data(ArrayData::Int64(vec![10, 10, 20])),
                Array::from_data(ArrayData::Float64(vec![1.5, 2.5, 3.5])),
            ],
        )
        .unwrap();
        let reader: Box<dyn crate::stream::StreamReader> = Box::new(crate::stream::VecStreamReader::new(s.clone(), vec![batch]));
        let q = crate::binder::bind(Query::new(vec![Expr::column("id")]), &s).unwrap();
        let root = plan(&q, reader, 100, CancellationToken::new()).unwrap();
        let out = crate::operator::materialize(root, &CancellationToken::new()).unwrap();
        assert_eq!(out.num_rows(), 3);
    }
}
