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

//! Built-in scalar/vector kernels: math, cast, datetime, string (spec §4.7).

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use super::FunctionKind;
use crate::data::{Array, ArrayData, DataType, Value};
use crate::error::{Error, Result};

/// Looks up a built-in kernel by lowercased name, honoring arity where a
/// name is ambiguous (none currently are). Returns `None` on a miss so the
/// caller can try the `np.`-namespace fallback or finally fail with
/// `FunctionError`.
pub fn builtin(name: &str, _arity: usize) -> Option<FunctionKind> {
    let f: Arc<dyn Fn(&[Array]) -> Result<Array> + Send + Sync> = match name {
        "abs" => Arc::new(|a| unary_f64(a, f64::abs)),
        "sqrt" => Arc::new(|a| unary_f64(a, f64::sqrt)),
        "exp" => Arc::new(|a| unary_f64(a, f64::exp)),
        "ln" | "log" => Arc::new(|a| unary_f64(a, f64::ln)),
        "log2" => Arc::new(|a| unary_f64(a, f64::log2)),
        "log10" => Arc::new(|a| unary_f64(a, f64::log10)),
        "sin" => Arc::new(|a| unary_f64(a, f64::sin)),
        "cos" => Arc::new(|a| unary_f64(a, f64::cos)),
        "tan" => Arc::new(|a| unary_f64(a, f64::tan)),
        "floor" => Arc::new(|a| unary_f64(a, f64::floor)),
        "ceil" => Arc::new(|a| unary_f64(a, f64::ceil)),
        "round" => Arc::new(|a| unary_f64(a, f64::round)),
        "pow" | "power" => Arc::new(binary_pow),
        "upper" => Arc::new(|a| unary_str(a, |s| s.to_uppercase())),
        "lower" => Arc::new(|a| unary_str(a, |s| s.to_lowercase())),
        "trim" => Arc::new(|a| unary_str(a, |s| s.trim().to_string())),
        "length" | "len" => Arc::new(unary_str_len),
        "year" => Arc::new(|a| datetime_field(a, |d| d.year() as i64)),
        "month" => Arc::new(|a| datetime_field(a, |d| d.month() as i64)),
        "day" => Arc::new(|a| datetime_field(a, |d| d.day() as i64)),
        "cast" => Arc::new(cast_kernel),
        _ => return None,
    };
    Some(FunctionKind::Scalar(f))
}

fn require_unary(args: &[Array]) -> Result<&Array> {
    if args.len() != 1 {
        return Err(Error::function(format!(
            "expected 1 argument, got {}",
            args.len()
        )));
    }
    Ok(&args[0])
}

fn unary_f64(args: &[Array], f: impl Fn(f64) -> f64) -> Result<Array> {
    let a = require_unary(args)?;
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            let v = a.get(i).as_f64().ok_or_else(|| {
                Error::function("expected a numeric argument".to_string())
            })?;
            out.push(f(v));
            validity.push(true);
        } else {
            out.push(0.0);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Float64(out), validity))
}

fn binary_pow(args: &[Array]) -> Result<Array> {
    if args.len() != 2 {
        return Err(Error::function(format!("pow expects 2 arguments, got {}", args.len())));
    }
    let len = args[0].len().max(args[1].len());
    let a = args[0].broadcast(len);
    let b = args[1].broadcast(len);
    let mut out = Vec::with_capacity(len);
    let mut validity = Vec::with_capacity(len);
    for i in 0..len {
        if a.is_valid(i) && b.is_valid(i) {
            let base = a.get(i).as_f64().unwrap_or(f64::NAN);
            let exp = b.get(i).as_f64().unwrap_or(f64::NAN);
            out.push(base.powf(exp));
            validity.push(true);
        } else {
            out.push(0.0);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Float64(out), validity))
}

fn unary_str(args: &[Array], f: impl Fn(&str) -> String) -> Result<Array> {
    let a = require_unary(args)?;
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            let s = value_to_string(&a.get(i));
            out.push(f(&s));
            validity.push(true);
        } else {
            out.push(String::new());
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Utf8(out), validity))
}

fn unary_str_len(args: &[Array]) -> Result<Array> {
    let a = require_unary(args)?;
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            let s = value_to_string(&a.get(i));
            out.push(s.chars().count() as i64);
            validity.push(true);
        } else {
            out.push(0);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Int64(out), validity))
}

fn datetime_field(args: &[Array], f: impl Fn(NaiveDate) -> i64) -> Result<Array> {
    let a = require_unary(args)?;
    let mut out = Vec::with_capacity(a.len());
    let mut validity = Vec::with_capacity(a.len());
    for i in 0..a.len() {
        if a.is_valid(i) {
            let days = match a.get(i) {
                Value::Date(d) => d,
                Value::Timestamp(t, unit) => (seconds_from_ticks(t, unit) / 86_400) as i32,
                other => {
                    return Err(Error::function(format!(
                        "expected a date or timestamp, got {other}"
                    )))
                }
            };
            let date = NaiveDate::from_num_days_from_ce_opt(days + 719_163).ok_or_else(|| {
                Error::function("date out of range".to_string())
            })?;
            out.push(f(date));
            validity.push(true);
        } else {
            out.push(0);
            validity.push(false);
        }
    }
    Ok(Array::new(ArrayData::Int64(out), validity))
}

fn seconds_from_ticks(t: i64, unit: crate::data::TimeUnit) -> i64 {
    use crate::data::TimeUnit::*;
    match unit {
        D => t * 86_400,
        S => t,
        Ms => t / 1_000,
        Us => t / 1_000_000,
        Ns => t / 1_000_000_000,
    }
}

fn value_to_string(v: &Value) -> String {
    match v {
        Value::Utf8(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `cast(expr, target_type_name)` (spec §4.7, opaque FUNCTION per spec §3).
fn cast_kernel(args: &[Array]) -> Result<Array> {
    if args.len() != 2 {
        return Err(Error::function(format!("cast expects 2 arguments, got {}", args.len())));
    }
    let src = &args[0];
    let target_name = match src_target_name(&args[1]) {
        Some(n) => n,
        None => return Err(Error::function("cast target type must be a string literal")),
    };
    let target = match target_name.as_str() {
        "int64" => DataType::Int64,
        "float64" => DataType::Float64,
        "string" => DataType::Utf8,
        "bool" => DataType::Bool,
        other => return Err(Error::function(format!("unsupported cast target '{other}'"))),
    };
    cast_array(src, target)
}

fn src_target_name(a: &Array) -> Option<String> {
    if a.len() != 1 {
        return None;
    }
    match a.get(0) {
        Value::Utf8(s) => Some(s),
        _ => None,
    }
}

pub fn cast_array(src: &Array, target: DataType) -> Result<Array> {
    let mut validity = Vec::with_capacity(src.len());
    let data = match target {
        DataType::Int64 => {
            let mut out = Vec::with_capacity(src.len());
            for i in 0..src.len() {
                if src.is_valid(i) {
                    match src.get(i).as_i64() {
                        Some(v) => {
                            out.push(v);
                            validity.push(true);
                        }
                        None => {
                            out.push(0);
                            validity.push(false);
                        }
                    }
                } else {
                    out.push(0);
                    validity.push(false);
                }
            }
            ArrayData::Int64(out)
        }
        DataType::Float64 => {
            let mut out = Vec::with_capacity(src.len());
            for i in 0..src.len() {
                if src.is_valid(i) {
                    match src.get(i).as_f64() {
                        Some(v) => {
                            out.push(v);
                            validity.push(true);
                        }
                        None => {
                            out.push(0.0);
                            validity.push(false);
                        }
                    }
                } else {
                    out.push(0.0);
                    validity.push(false);
                }
            }
            ArrayData::Float64(out)
        }
        DataType::Utf8 => {
            let mut out = Vec::with_capacity(src.len());
            for i in 0..src.len() {
                if src.is_valid(i) {
                    out.push(value_to_string(&src.get(i)));
                    validity.push(true);
                } else {
                    out.push(String::new());
                    validity.push(false);
                }
            }
            ArrayData::Utf8(out)
        }
        DataType::Bool => {
            let mut out = Vec::with_capacity(src.len());
            for i in 0..src.len() {
                if src.is_valid(i) {
                    match src.get(i).as_bool().or_else(|| src.get(i).as_f64().map(|f| f != 0.0)) {
                        Some(v) => {
                            out.push(v);
                            validity.push(true);
                        }
                        None => {
                            out.push(false);
                            validity.push(false);
                        }
                    }
                } else {
                    out.push(false);
                    validity.push(false);
                }
            }
            ArrayData::Bool(out)
        }
        other => return Err(Error::function(format!("unsupported cast target '{other}'"))),
    };
    Ok(Array::new(data, validity))
}
