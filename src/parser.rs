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

//! `parse(sql, schema) -> Query | ParserError` (spec §4.1).
//!
//! Lowers a single SQL `SELECT` statement, parsed with `sqlparser`'s
//! `GenericDialect`, into this crate's own closed-`OpTag` AST (spec §3).
//! `sqlparser`'s tree is never retained past this one pass.

use sqlparser::ast::{
    BinaryOperator, Expr as SqlExpr, FunctionArg, FunctionArgExpr, FunctionArguments, GroupByExpr,
    OrderByExpr, Query as SqlQuery, Select, SelectItem, SetExpr, Statement, UnaryOperator,
    Value as SqlValue,
};
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser;

use crate::ast::{ColumnRef, Expr, Literal, OpTag, Query, SortOrder};
use crate::data::{Schema, Value};
use crate::error::{Error, Result};

/// Parses `sql` against `schema`, producing an unbound [`Query`].
///
/// `schema` is used only to expand `SELECT *`; column existence is checked
/// later, by the binder.
pub fn parse(sql: &str, schema: &Schema) -> Result<Query> {
    let dialect = GenericDialect {};
    let mut statements = Parser::parse_sql(&dialect, sql)
        .map_err(|e| Error::parser(format!("{e}")))?;
    if statements.len() != 1 {
        return Err(Error::parser("only a single SELECT statement is supported"));
    }
    let stmt = statements.remove(0);
    let Statement::Query(query) = stmt else {
        return Err(Error::parser("only SELECT supported"));
    };
    parse_query(&query, schema)
}

fn parse_query(query: &SqlQuery, schema: &Schema) -> Result<Query> {
    let select = match query.body.as_ref() {
        SetExpr::Select(s) => s.as_ref(),
        _ => return Err(Error::parser("only SELECT supported")),
    };

    let select_exprs = lower_projection(&select.projection, schema)?;
    let mut q = Query::new(select_exprs);
    q.distinct = select.distinct.is_some();

    if let Some(sel) = &select.selection {
        q.where_clause = Some(lower_expr(sel)?);
    }

    q.group_by = lower_group_by(&select.group_by)?;

    if let Some(having) = &select.having {
        q.having = Some(lower_expr(having)?);
    }

    let (order_by, sort_order) = lower_order_by(query)?;
    q.order_by = order_by;
    q.sort_order = sort_order;

    q.limit = lower_limit(query)?;
    q.offset = lower_offset(query)?.unwrap_or(0);

    Ok(q)
}

fn lower_projection(items: &[SelectItem], schema: &Schema) -> Result<Vec<Expr>> {
    let mut out = Vec::new();
    for item in items {
        match item {
            SelectItem::Wildcard(_) => {
                for name in schema.names() {
                    out.push(Expr::column(name));
                }
            }
            SelectItem::UnnamedExpr(e) => out.push(lower_expr(e)?),
            SelectItem::ExprWithAlias { expr, alias } => {
                let mut lowered = lower_expr(expr)?;
                lowered.set_alias(Some(alias.value.clone()));
                out.push(lowered);
            }
            SelectItem::QualifiedWildcard(_, _) => {
                for name in schema.names() {
                    out.push(Expr::column(name));
                }
            }
        }
    }
    Ok(out)
}

fn lower_group_by(gb: &GroupByExpr) -> Result<Vec<Expr>> {
    match gb {
        GroupByExpr::Expressions(exprs, modifiers) => {
            if !modifiers.is_empty() {
                return Err(Error::parser("GROUP BY modifiers are not supported"));
            }
            exprs.iter().map(lower_expr).collect()
        }
        GroupByExpr::All(_) => Err(Error::parser("GROUP BY ALL is not supported")),
    }
}

fn lower_order_by(query: &SqlQuery) -> Result<(Vec<Expr>, Vec<SortOrder>)> {
    let Some(order_by) = &query.order_by else {
        return Ok((Vec::new(), Vec::new()));
    };
    let mut exprs = Vec::new();
    let mut orders = Vec::new();
    for ob in order_by_exprs(order_by) {
        exprs.push(lower_expr(&ob.expr)?);
        let desc = ob.asc == Some(false);
        orders.push(if desc { SortOrder::Desc } else { SortOrder::Asc });
    }
    Ok((exprs, orders))
}

/// `sqlparser` wraps `ORDER BY` in an `OrderBy` struct whose `exprs` field is
/// what we want; isolated here so a `sqlparser` minor-version shuffle of the
/// wrapper only touches one function.
fn order_by_exprs(order_by: &sqlparser::ast::OrderBy) -> &[OrderByExpr] {
    &order_by.exprs
}

fn lower_limit(query: &SqlQuery) -> Result<Option<i64>> {
    match &query.limit {
        None => Ok(None),
        Some(SqlExpr::Value(SqlValue::Number(n, _))) => {
            let v: i64 = n
                .parse()
                .map_err(|_| Error::parser(format!("invalid LIMIT literal '{n}'")))?;
            if v < 0 {
                return Err(Error::parser("LIMIT must be non-negative"));
            }
            Ok(Some(v))
        }
        Some(_) => Err(Error::parser("LIMIT must be a non-negative integer literal")),
    }
}

fn lower_offset(query: &SqlQuery) -> Result<Option<i64>> {
    match &query.offset {
        None => Ok(None),
        Some(offset) => match &offset.value {
            SqlExpr::Value(SqlValue::Number(n, _)) => {
                let v: i64 = n
                    .parse()
                    .map_err(|_| Error::parser(format!("invalid OFFSET literal '{n}'")))?;
                if v < 0 {
                    return Err(Error::parser("OFFSET must be non-negative"));
                }
                Ok(Some(v))
            }
            _ => Err(Error::parser("OFFSET must be a non-negative integer literal")),
        },
    }
}

fn lower_expr(expr: &SqlExpr) -> Result<Expr> {
    match expr {
        SqlExpr::Identifier(ident) => Ok(Expr::column(ident.value.clone())),
        SqlExpr::CompoundIdentifier(parts) => {
            let name = parts
                .last()
                .map(|p| p.value.clone())
                .ok_or_else(|| Error::parser("empty compound identifier"))?;
            Ok(Expr::column(name))
        }
        SqlExpr::Value(v) => Ok(Expr::literal(lower_value(v)?)),
        SqlExpr::Nested(inner) => lower_expr(inner),

        SqlExpr::UnaryOp { op, expr: inner } => {
            let e = lower_expr(inner)?;
            match op {
                UnaryOperator::Minus => Ok(Expr::op(OpTag::Neg, vec![e])),
                UnaryOperator::Plus => Ok(e),
                UnaryOperator::Not => Ok(Expr::op(OpTag::Not, vec![e])),
                _ => Err(Error::parser(format!("unsupported unary operator: {op}"))),
            }
        }

        SqlExpr::BinaryOp { left, op, right } => lower_binary_op(left, op, right),

        SqlExpr::IsNull(inner) => Ok(Expr::op(OpTag::IsNull, vec![lower_expr(inner)?])),
        SqlExpr::IsNotNull(inner) => Ok(Expr::op(OpTag::IsNotNull, vec![lower_expr(inner)?])),

        SqlExpr::Between {
            expr: inner,
            negated,
            low,
            high,
        } => {
            let args = vec![lower_expr(inner)?, lower_expr(low)?, lower_expr(high)?];
            Ok(Expr::op(
                if *negated { OpTag::NotBetween } else { OpTag::Between },
                args,
            ))
        }

        SqlExpr::InList {
            expr: inner,
            list,
            negated,
        } => {
            let mut args = vec![lower_expr(inner)?];
            for item in list {
                args.push(lower_expr(item)?);
            }
            Ok(Expr::op(if *negated { OpTag::NotIn } else { OpTag::In }, args))
        }

        SqlExpr::Like {
            negated,
            expr: inner,
            pattern,
            escape_char: _,
            any: _,
        } => {
            let args = vec![lower_expr(inner)?, lower_expr(pattern)?];
            Ok(Expr::op(if *negated { OpTag::NotLike } else { OpTag::Like }, args))
        }

        SqlExpr::Function(f) => {
            let name = f.name.to_string().to_lowercase();
            let args = lower_function_args(&f.args)?;
            if name == "count" && args.len() == 1 && args[0].1 {
                // COUNT(*) -> zero-arg function `count_star` (spec §4.1).
                return Ok(Expr::func("count_star", vec![]));
            }
            let exprs: Result<Vec<Expr>> = args
                .into_iter()
                .map(|(e, _)| e.ok_or_else(|| Error::parser("unsupported function argument")))
                .collect();
            Ok(Expr::func(name, exprs?))
        }

        SqlExpr::Cast {
            expr: inner,
            data_type,
            ..
        } => {
            // CAST is modeled as an opaque function call (spec §3 "opaque:
            // FUNCTION") so the catalog's `cast` kernel (spec §4.7) handles
            // type coercion uniformly; the target type rides along as a
            // string-literal second argument.
            let target = sql_type_name(data_type);
            Ok(Expr::func(
                "cast",
                vec![lower_expr(inner)?, Expr::literal(Value::Utf8(target))],
            ))
        }

        other => Err(Error::parser(format!("unsupported expression: {other}"))),
    }
}

/// Returns `(lowered_expr_or_none, is_wildcard)` per argument; `count(*)` is
/// recognised by a single wildcard argument.
fn lower_function_args(args: &FunctionArguments) -> Result<Vec<(Option<Expr>, bool)>> {
    match args {
        FunctionArguments::None => Ok(Vec::new()),
        FunctionArguments::List(list) => {
            let mut out = Vec::new();
            for arg in &list.args {
                match arg {
                    FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => {
                        out.push((Some(lower_expr(e)?), false))
                    }
                    FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => out.push((None, true)),
                    _ => return Err(Error::parser("unsupported function argument form")),
                }
            }
            Ok(out)
        }
        FunctionArguments::Subquery(_) => Err(Error::parser("subqueries are not supported")),
    }
}

fn lower_binary_op(left: &SqlExpr, op: &BinaryOperator, right: &SqlExpr) -> Result<Expr> {
    // Null-equality rewrites (spec §4.1): `expr = NULL` / `expr == NULL` ->
    // IS_NULL; `expr != NULL` / `expr <> NULL` -> IS_NOT_NULL.
    if matches!(op, BinaryOperator::Eq) && is_null_literal(right) {
        return Ok(Expr::op(OpTag::IsNull, vec![lower_expr(left)?]));
    }
    if matches!(op, BinaryOperator::Eq) && is_null_literal(left) {
        return Ok(Expr::op(OpTag::IsNull, vec![lower_expr(right)?]));
    }
    if matches!(op, BinaryOperator::NotEq) && is_null_literal(right) {
        return Ok(Expr::op(OpTag::IsNotNull, vec![lower_expr(left)?]));
    }
    if matches!(op, BinaryOperator::NotEq) && is_null_literal(left) {
        return Ok(Expr::op(OpTag::IsNotNull, vec![lower_expr(right)?]));
    }

    let l = lower_expr(left)?;
    let r = lower_expr(right)?;
    let tag = match op {
        BinaryOperator::Plus => OpTag::Add,
        BinaryOperator::Minus => OpTag::Sub,
        BinaryOperator::Multiply => OpTag::Mul,
        BinaryOperator::Divide => OpTag::Div,
        BinaryOperator::Modulo => OpTag::Mod,
        BinaryOperator::StringConcat => OpTag::Concat,
        BinaryOperator::Eq => OpTag::Eq,
        BinaryOperator::NotEq => OpTag::Neq,
        BinaryOperator::Gt => OpTag::Gt,
        BinaryOperator::GtEq => OpTag::Gte,
        BinaryOperator::Lt => OpTag::Lt,
        BinaryOperator::LtEq => OpTag::Lte,
        BinaryOperator::And => OpTag::And,
        BinaryOperator::Or => OpTag::Or,
        BinaryOperator::BitwiseAnd => OpTag::BitAnd,
        BinaryOperator::BitwiseOr => OpTag::BitOr,
        BinaryOperator::BitwiseXor => OpTag::BitXor,
        other => return Err(Error::parser(format!("unsupported operator: {other}"))),
    };
    Ok(Expr::op(tag, vec![l, r]))
}

/// Maps a `sqlparser` `DataType` to one of this crate's own type names
/// (`"int64"`, `"float64"`, `"string"`, `"bool"`), understood by the `cast`
/// kernel (spec §4.7).
fn sql_type_name(dt: &sqlparser::ast::DataType) -> String {
    use sqlparser::ast::DataType as Dt;
    match dt {
        Dt::BigInt(_) | Dt::Int(_) | Dt::Integer(_) | Dt::SmallInt(_) | Dt::TinyInt(_) => {
            "int64".into()
        }
        Dt::Float(_) | Dt::Double | Dt::DoublePrecision | Dt::Real => "float64".into(),
        Dt::Boolean => "bool".into(),
        _ => "string".into(),
    }
}

fn is_null_literal(expr: &SqlExpr) -> bool {
    matches!(expr, SqlExpr::Value(SqlValue::Null))
}

fn lower_value(v: &SqlValue) -> Result<Value> {
    match v {
        SqlValue::Null => Ok(Value::Null),
        SqlValue::Boolean(b) => Ok(Value::Bool(*b)),
        SqlValue::Number(n, _) => {
            if let Ok(i) = n.parse::<i64>() {
                Ok(Value::Int64(i))
            } else {
                n.parse::<f64>()
                    .map(Value::Float64)
                    .map_err(|_| Error::parser(format!("invalid numeric literal '{n}'")))
            }
        }
        SqlValue::SingleQuotedString(s) | SqlValue::DoubleQuotedString(s) => {
            Ok(Value::Utf8(s.clone()))
        }
        other => Err(Error::parser(format!("unsupported literal: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DataType, Field};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
            Field::new("total", DataType::Float64),
        ])
    }

    #[test]
    fn rejects_non_select() {
        let err = parse("DELETE FROM t", &schema()).unwrap_err();
        assert!(matches!(err, Error::Parser(_)));
    }

    #[test]
    fn star_expands_to_schema_columns() {
        let q = parse("SELECT * FROM t", &schema()).unwrap();
        assert_eq!(q.select_exprs.len(), 3);
    }

    #[test]
    fn null_equality_becomes_is_null() {
        let q = parse("SELECT id FROM t WHERE name = NULL", &schema()).unwrap();
        let w = q.where_clause.unwrap();
        assert_eq!(w.as_expr_node().unwrap().op_tag, OpTag::IsNull);
    }

    #[test]
    fn count_star_is_zero_arg_function() {
        let q = parse("SELECT count(*) FROM t", &schema()).unwrap();
        let e = q.select_exprs[0].as_expr_node().unwrap();
        assert_eq!(e.function_name.as_deref(), Some("count_star"));
        assert!(e.args.is_empty());
    }

    #[test]
    fn limit_offset_must_be_non_negative() {
        assert!(parse("SELECT id FROM t LIMIT -1", &schema()).is_err());
        assert!(parse("SELECT id FROM t LIMIT 2 OFFSET 1", &schema()).is_ok());
    }

    #[test]
    fn order_by_defaults_to_asc() {
        let q = parse("SELECT id FROM t ORDER BY total", &schema()).unwrap();
        assert_eq!(q.sort_order[0], SortOrder::Asc);
    }
}
