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

//! Recursively evaluates an [`Expr`] against a [`RecordBatch`], producing a
//! column (spec §4.8).

use std::collections::HashMap;

use crate::ast::{Expr, OpTag};
use crate::data::{Array, ArrayData, DataType, RecordBatch, Value};
use crate::error::{Error, Result};
use crate::functions;
use crate::functions::like;

/// Evaluates `expr` against `batch`, returning a column the same length as
/// `batch` (or length 1 if the expression is a bare scalar literal — callers
/// that need it aligned to the batch should broadcast).
pub fn evaluate(expr: &Expr, batch: &RecordBatch) -> Result<Array> {
    // Step 1 (spec §4.8): common-subexpression reuse — if the node carries a
    // `shared_id` and the batch already has a column under that name (because
    // Project(pre-agg)/Sort materialized it earlier), return that column
    // rather than recomputing.
    if let Some(id) = expr.shared_id() {
        if let Some(col) = batch.column(id) {
            return Ok(col.clone());
        }
    }

    match expr {
        Expr::Literal(l) => Ok(Array::scalar(&l.value)),
        Expr::ColumnRef(c) => batch
            .column(&c.name)
            .cloned()
            .ok_or_else(|| Error::planner(format!("column '{}' not found in batch", c.name))),
        Expr::Expr(node) => eval_node(node, batch),
    }
}

fn eval_args(args: &[Expr], batch: &RecordBatch) -> Result<Vec<Array>> {
    args.iter().map(|a| evaluate(a, batch)).collect()
}

/// Aligns columns to a common length: broadcasts length-1 columns up to the
/// max length seen; anything else mismatched is an `OperatorError` (spec
/// §4.4 Project: "All output columns must share a length").
fn align(cols: Vec<Array>) -> Result<Vec<Array>> {
    let max_len = cols.iter().map(|c| c.len()).max().unwrap_or(0).max(1);
    cols.into_iter()
        .map(|c| {
            if c.len() == max_len {
                Ok(c)
            } else if c.len() == 1 {
                Ok(c.broadcast(max_len))
            } else {
                Err(Error::operator("unequal sizes"))
            }
        })
        .collect()
}

fn eval_node(node: &crate::ast::ExprNode, batch: &RecordBatch) -> Result<Array> {
    use OpTag::*;
    match node.op_tag {
        Add | Sub | Mul | Div | Mod | BitAnd | BitOr | BitXor => {
            let args = align(eval_args(&node.args, batch)?)?;
            binary_arith(node.op_tag, &args[0], &args[1])
        }
        Neg => {
            let a = evaluate(&node.args[0], batch)?;
            unary_neg(&a)
        }
        BitNot => {
            let a = evaluate(&node.args[0], batch)?;
            unary_bitnot(&a)
        }
        Concat => {
            let args = align(eval_args(&node.args, batch)?)?;
            concat_many(&args)
        }
        Eq | Neq | Gt | Gte | Lt | Lte => {
            let args = align(eval_args(&node.args, batch)?)?;
            comparison(node.op_tag, &args[0], &args[1])
        }
        And | Or => {
            let args = align(eval_args(&node.args, batch)?)?;
            logical_fold(node.op_tag, &args)
        }
        Not => {
            let a = evaluate(&node.args[0], batch)?;
            logical_not(&a)
        }
        IsNull => {
            let a = evaluate(&node.args[0], batch)?;
            Ok(is_null_mask(&a, false))
        }
        IsNotNull => {
            let a = evaluate(&node.args[0], batch)?;
            Ok(is_null_mask(&a, true))
        }
        In | NotIn => {
            let negate = node.op_tag == NotIn;
            let x = evaluate(&node.args[0], batch)?;
            let mut acc: Option<Array> = None;
            for item in &node.args[1..] {
                let v = evaluate(item, batch)?;
                let aligned = align(vec![x.clone(), v])?;
                let eq = comparison(Eq, &aligned[0], &aligned[1])?;
                acc = Some(match acc {
                    None => eq,
                    Some(prev) => logical_fold(Or, &[prev, eq])?,
                });
            }
            let result = match acc {
                Some(a) => a,
                None => Array::from_data(ArrayData::Bool(vec![false; x.len().max(1)])),
            };
            if negate {
                logical_not(&result)
            } else {
                Ok(result)
            }
        }
        Between | NotBetween => {
            let x = evaluate(&node.args[0], batch)?;
            let lo = evaluate(&node.args[1], batch)?;
            let hi = evaluate(&node.args[2], batch)?;
            let a1 = align(vec![x.clone(), lo])?;
            let ge = comparison(Gte, &a1[0], &a1[1])?;
            let a2 = align(vec![x, hi])?;
            let le = comparison(Lte, &a2[0], &a2[1])?;
            let aligned = align(vec![ge, le])?;
            let result = logical_fold(And, &aligned)?;
            if node.op_tag == NotBetween {
                logical_not(&result)
            } else {
                Ok(result)
            }
        }
        Like | NotLike => {
            let args = align(eval_args(&node.args, batch)?)?;
            let result = like_match(&args[0], &args[1])?;
            if node.op_tag == NotLike {
                logical_not(&result)
            } else {
                Ok(result)
            }
        }
        Distinct => Err(Error::planner(
            "DISTINCT marker must be handled by the binder/planner, not evaluated directly".into(),
        )),
        Function => {
            let name = node
                .function_name
                .as_deref()
                .ok_or_else(|| Error::planner("function node missing a name"))?;
            if name == "count_star" {
                // Reaching eval means the planner didn't rewrite it; only
                // legal pre-aggregate-rewrite, where its value is unused.
                return Ok(Array::scalar(&Value::Int64(batch.num_rows() as i64)));
            }
            let kernel = functions::resolve(name)?;
            let args = eval_args(&node.args, batch)?;
            let args = if args.iter().any(|a| a.len() != args[0].len()) {
                align(args)?
            } else {
                args
            };
            kernel.call(&args)
        }
    }
}

fn numeric_is_float(a: &Array, b: &Array) -> bool {
    matches!(a.data_type(), DataType::Float64) || matches!(b.data_type(), DataType::Float64)
}

fn binary_arith(op: OpTag, a: &Array, b: &Array) -> Result<Array> {
    let len = a.len();
    let as_float = numeric_is_float(a, b)
        || matches!(op, OpTag::Div)
        || matches!(a.data_type(), DataType::Timestamp(_) | DataType::Date)
        || matches!(b.data_type(), DataType::Timestamp(_) | DataType::Date);
    if matches!(op, OpTag::BitAnd | OpTag::BitOr | OpTag::BitXor) {
        let mut out = Vec::with_capacity(len);
        let mut validity = Vec::with_capacity(len);
        for i in 0..len {
            if a.is_valid(i) && b.is_valid(i) {
                let x = a.get(i).as_i64().ok_or_else(|| Error::operator("bitwise op needs integer operands"))?;
                let y = b.get(i).as_i64().ok_or_else(|| Error::operator("bitwise op needs integer operands"))?;
                out.push(match op {
                    OpTag::BitAnd => x & y,
                    OpTag::BitOr => x | y,
                    OpTag::BitXor => x ^ y,
                    _ => unreachable!(),
                });
                validity.push(true);
            } else {
                out.push(0);
                validity.push(false);
            }
        }
        return Ok(Array::new(ArrayData::Int64(out), validity));
    }
    if as_float {
        let mut out = Vec::with_capacity(len);
        let mut validity = Vec::with_capacity(len);
        for i in 0..len {
            if a.is_valid(i) && b.is_valid(i) {
                let x = a.get(i).as_f64().ok_or_else(|| Error::operator("arithmetic needs numeric operands"))?;
                let y = b.get(i).as_f64().ok_or_else(|| Error::operator("arithmetic needs numeric operands"))?;
                let v = match op {
                    OpTag::Add => x + y,
                    OpTag::Sub => x - y,
                    OpTag::Mul => x * y,
                    OpTag::Div => x / y,
                    OpTag::Mod => x % y,
                    _ => unreachable!(),
                };
                out.push(v);
                validity.push(true);
            } else {
                out.push(0.0);
                validity.push(false);
            }
        }
        Ok(Array::new(ArrayData::Float64(out), validity))
    } else {
        let mut out = Vec::with_capacity(len);
        let mut validity = Vec::with_capacity(len);
        for i in 0..len {
            if a.is_valid(i) && b.is_valid(i) {
                let x = a.get(i).as_i64().ok_or_else(|| Error::operator("arithmetic needs numeric operands"))?;
                let y = b.get(i).as_i64().ok_or_else(|| Error::operator("arithmetic needs numeric operands"))?;
                let (v, ok) = match op {
                    OpTag::Add => (x.saturating_add(y), true),
                    OpTag::Sub => (x.saturating_sub(y), true),
                    OpTag::Mul => (x.saturating_mul(y), true),
                    OpTag::Mod => {
                        if y == 0 {
                            (0, false)
                        } else {
                            (x % y, true)
                        }
                    }
                    _ => unreachable!(),
                };
                out.push(v);
                validity.push(ok);
            } else {
                out.push(0);
                validity.push(false);
            }
        }
        Ok(Array::new(ArrayData::Int64(out), validity))
    }
}

fn unary_neg(a: &Array) -> Result<Array> {
    match a.data_type() {
        DataType::Int64 => {
            let mut out = Vec::with_capacity(a.len());
            let mut validity = Vec::with_capacity(a.len());
            for i in 0..a.len() {
                if a.is_valid(i) {
                    out.push(-a.get(i).as_i64().unwrap());
                    validity.push(true);
                } else {
                    out.push(0);
                    validity.push(false);
                }
            }
            Ok(Array::new(ArrayData::Int64(out), validity))
        }
        _ => {
            let mut out = Vec::with_capacity(a.len());
            let mut validity = Vec::with_capacity(a.len());
            for i in 0..a.len() {
                if a.is_valid(i) {
                    let v = a.get(i).as_f64().ok_or_else(|| Error::operator("NEG needs a numeric operand"))?;
                    out.push(-v);
                    validity.push(true);
                } else {
                    out.push(0.0);
                    validity.push(false);
                }
            }
            Ok(Array::new(ArrayData::Float64(out), validity))
        }
    }
}

fn unary_bitnot(a: &Array) -> Result<Array> {
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            let v = a.get(i).as_i64().ok_or_else(|| Error::operator("BITNOT needs an integer operand"))?;
            out.push(!v);
            validity.push(true);
        } else {
            out.push(0);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Int64(out), validity))
}

fn concat_many(args: &[Array]) -> Result<Array> {
    let len = args.first().map(|a| a.len()).unwrap_or(0);
    let mut out = Vec::with_capacity(len);
    let mut validity = Vec::with_capacity(len);
    for i in 0..len {
        let mut valid = true;
        let mut s = String::new();
        for a in args {
            if !a.is_valid(i) {
                valid = false;
                break;
            }
            s.push_str(&value_to_string(&a.get(i)));
        }
        out.push(if valid { s } else { String::new() });
        validity.push(valid);
    }
    Ok(Array::new(ArrayData::Utf8(out), validity))
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::Utf8(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total order used by comparison operators: numerics compare as `f64`,
/// strings/bools compare natively; `None` if the two values aren't
/// comparable (different non-numeric types).
fn value_cmp(a: &Value, b: &Value) -> Option<std::cmp::Ordering> {
    match (a, b) {
        (Value::Utf8(x), Value::Utf8(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => a.as_f64().zip(b.as_f64()).and_then(|(x, y)| x.partial_cmp(&y)),
    }
}

fn comparison(op: OpTag, a: &Array, b: &Array) -> Result<Array> {
    let len = a.len();
    let mut out = Vec::with_capacity(len);
    let mut validity = Vec::with_capacity(len);
    for i in 0..len {
        if a.is_valid(i) && b.is_valid(i) {
            let cmp = value_cmp(&a.get(i), &b.get(i));
            let Some(ord) = cmp else {
                out.push(false);
                validity.push(false);
                continue;
            };
            use std::cmp::Ordering::*;
            let v = match op {
                OpTag::Eq => ord == Equal,
                OpTag::Neq => ord != Equal,
                OpTag::Gt => ord == Greater,
                OpTag::Gte => ord != Less,
                OpTag::Lt => ord == Less,
                OpTag::Lte => ord != Greater,
                _ => unreachable!(),
            };
            out.push(v);
            validity.push(true);
        } else {
            out.push(false);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Bool(out), validity))
}

/// Three-valued AND/OR: `None` (SQL NULL) only "infects" the result when it
/// isn't already decided by a `false` (for AND) or `true` (for OR) operand.
fn logical_fold(op: OpTag, args: &[Array]) -> Result<Array> {
    let len = args.first().map(|a| a.len()).unwrap_or(0);
    let mut out = vec![false; len];
    let mut validity = vec![true; len];
    for i in 0..len {
        let mut any_null = false;
        let mut decided: Option<bool> = None;
        for a in args {
            if !a.is_valid(i) {
                any_null = true;
                continue;
            }
            let b = a.get(i).as_bool().unwrap_or(false);
            decided = Some(match (decided, op) {
                (None, _) => b,
                (Some(d), OpTag::And) => d && b,
                (Some(d), OpTag::Or) => d || b,
                _ => unreachable!(),
            });
            match (op, decided) {
                (OpTag::And, Some(false)) => break,
                (OpTag::Or, Some(true)) => break,
                _ => {}
            }
        }
        match decided {
            Some(true) if op == OpTag::Or => {
                out[i] = true;
                validity[i] = true;
            }
            Some(false) if op == OpTag::And => {
                out[i] = false;
                validity[i] = true;
            }
            _ if any_null => {
                validity[i] = false;
            }
            Some(v) => {
                out[i] = v;
                validity[i] = true;
            }
            None => {
                validity[i] = false;
            }
        }
    }
    Ok(Array::new(ArrayData::Bool(out), validity))
}

fn logical_not(a: &Array) -> Result<Array> {
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            out.push(!a.get(i).as_bool().unwrap_or(false));
            validity.push(true);
        } else {
            out.push(false);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Bool(out), validity))
}

/// `IS_NULL`/`IS_NOT_NULL` inspect the validity bitmap directly (spec §4.8
/// step 4); the result itself is never null.
fn is_null_mask(a: &Array, invert: bool) -> Array {
    let out: Vec<bool> = (0..a.len()).map(|i| a.is_valid(i) != invert).collect();
    let len = out.len();
    Array::new(ArrayData::Bool(out), vec![true; len])
}

fn like_match(input: &Array, pattern: &Array) -> Result<Array> {
    let len = input.len();
    let mut cache: HashMap<String, regex::Regex> = HashMap::new();
    let mut out = Vec::with_capacity(len);
    let mut validity = Vec::with_capacity(len);
    for i in 0..len {
        if !input.is_valid(i) || !pattern.is_valid(i) {
            out.push(false);
            validity.push(false);
            continue;
        }
        let s = value_to_string(&input.get(i));
        let pat = value_to_string(&pattern.get(i));
        let re = match cache.get(&pat) {
            Some(re) => re,
            None => {
                let compiled = like::compile(&pat)?;
                cache.entry(pat.clone()).or_insert(compiled)
            }
        };
        out.push(re.is_match(&s));
        validity.push(true);
    }
    Ok(Array::new(ArrayData::Bool(out), validity))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Field, Schema};

    fn batch_with(name: &str, data: ArrayData) -> RecordBatch {
        let ty = Array::from_data(data.clone()).data_type();
        let schema = Schema::new(vec![Field::new(name, ty)]);
        RecordBatch::try_new(schema, vec![Array::from_data(data)]).unwrap()
    }

    #[test]
    fn shared_id_reuses_materialized_column() {
        let batch = batch_with("already_there", ArrayData::Int64(vec![42]));
        let mut node = Expr::op(OpTag::Add, vec![Expr::literal(Value::Int64(1)), Expr::literal(Value::Int64(1))]);
        node.set_shared_id("already_there".into());
        let out = evaluate(&node, &batch).unwrap();
        assert_eq!(out.get(0), Value::Int64(42));
    }

    #[test]
    fn null_propagates_through_arithmetic() {
        let a = Array::new(ArrayData::Int64(vec![1, 2]), vec![true, false]);
        let b = Array::new(ArrayData::Int64(vec![10, 10]), vec![true, true]);
        let out = binary_arith(OpTag::Add, &a, &b).unwrap();
        assert_eq!(out.get(0), Value::Int64(11));
        assert!(!out.is_valid(1));
    }

    #[test]
    fn and_short_circuits_on_false_even_with_null() {
        let a = Array::new(ArrayData::Bool(vec![false]), vec![true]);
        let b = Array::new(ArrayData::Bool(vec![false]), vec![false]);
        let out = logical_fold(OpTag::And, &[a, b]).unwrap();
        assert_eq!(out.get(0), Value::Bool(false));
    }

    #[test]
    fn is_null_never_produces_null_itself() {
        let a = Array::new(ArrayData::Int64(vec![1]), vec![false]);
        let out = is_null_mask(&a, false);
        assert!(out.is_valid(0));
        assert_eq!(out.get(0), Value::Bool(true));
    }
}
