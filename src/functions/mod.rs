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

//! Name → vectorized kernel registry (spec §4.7).
//!
//! Resolution order: aggregates first, then UDFs, then built-ins, then the
//! `np.`-namespaced vector library.

pub mod aggregate;
pub mod like;
pub mod scalar;

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

pub use aggregate::AggKind;

use crate::data::Array;
use crate::error::{Error, Result};

pub type Kernel = Arc<dyn Fn(&[Array]) -> Result<Array> + Send + Sync>;

/// Either registration surface resolves to the same column-in, column-out
/// shape; the distinction is kept only so `register_scalar`/`register_vector`
/// remain distinct public entry points, matching spec §4.7's two verbs.
#[derive(Clone)]
pub enum FunctionKind {
    Scalar(Kernel),
    Vector(Kernel),
}

impl FunctionKind {
    pub fn call(&self, args: &[Array]) -> Result<Array> {
        match self {
            FunctionKind::Scalar(f) | FunctionKind::Vector(f) => f(args),
        }
    }
}

const AGGREGATE_NAMES: &[&str] = &["count", "count_star", "sum", "min", "max", "avg"];

fn strip_np<'a>(name: &'a str) -> &'a str {
    name.strip_prefix("np.").unwrap_or(name)
}

/// True if `name` (or its `np.`-prefixed alias) names an aggregate function
/// (spec §4.7: "Built-in aggregate names: count, count_star, sum, min, max,
/// avg (plus numpy-prefixed aliases mapped to the same)").
pub fn is_aggregate_name(name: &str) -> bool {
    let lname = name.to_lowercase();
    AGGREGATE_NAMES.contains(&strip_np(&lname))
}

pub fn agg_kind_for(name: &str) -> Option<AggKind> {
    let lname = name.to_lowercase();
    match strip_np(&lname) {
        "count" => Some(AggKind::Count),
        "count_star" => Some(AggKind::CountStar),
        "min" => Some(AggKind::Min),
        "max" => Some(AggKind::Max),
        "sum" => Some(AggKind::Sum),
        "avg" => Some(AggKind::Avg),
        _ => None,
    }
}

struct Registry {
    user: HashMap<String, FunctionKind>,
}

static REGISTRY: OnceLock<RwLock<Registry>> = OnceLock::new();

fn registry() -> &'static RwLock<Registry> {
    REGISTRY.get_or_init(|| {
        RwLock::new(Registry {
            user: HashMap::new(),
        })
    })
}

/// `register_scalar(name, func)`: overwrites any prior entry; name is
/// lowercased (spec §4.7).
pub fn register_scalar(name: &str, func: Kernel) {
    registry()
        .write()
        .expect("function registry poisoned")
        .user
        .insert(name.to_lowercase(), FunctionKind::Scalar(func));
}

/// `register_vector(name, func)`: `func` receives whole columns and returns
/// a column (spec §4.7).
pub fn register_vector(name: &str, func: Kernel) {
    registry()
        .write()
        .expect("function registry poisoned")
        .user
        .insert(name.to_lowercase(), FunctionKind::Vector(func));
}

/// Resolves a non-aggregate function call by name. Aggregate names are
/// rejected here — the planner extracts and rewrites them before an
/// `Expression(FUNCTION)` with an aggregate name ever reaches the evaluator.
pub fn resolve(name: &str) -> Result<FunctionKind> {
    let lname = name.to_lowercase();
    if is_aggregate_name(&lname) {
        return Err(Error::function(format!(
            "'{name}' is an aggregate function and must be used in a GROUP BY / SELECT aggregate position"
        )));
    }
    if let Some(f) = registry().read().expect("function registry poisoned").user.get(&lname) {
        return Ok(f.clone());
    }
    if let Some(f) = scalar::builtin(&lname, 0) {
        return Ok(f);
    }
    if let Some(bare) = lname.strip_prefix("np.") {
        if let Some(f) = scalar::builtin(bare, 0) {
            return Ok(f);
        }
    }
    Err(Error::function(format!("function '{name}' not found")))
}
