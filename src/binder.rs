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

//! Resolves aliases, validates column references, and stamps `shared_id`s
//! onto a parsed [`Query`] (spec §4.2).

use std::collections::HashMap;

use crate::ast::{Expr, Query};
use crate::data::Schema;
use crate::error::{Error, Result};
use crate::functions::is_aggregate_name;

/// `bind(query, schema) -> Query`, applying the seven steps of spec §4.2 in
/// order.
pub fn bind(mut query: Query, schema: &Schema) -> Result<Query> {
    let aliases = alias_map(&query);
    substitute_aliases(&mut query, &aliases);
    validate_columns(&query, schema)?;
    query.is_aggregate = recompute_is_aggregate(&query);
    if !query.group_by.is_empty() {
        enforce_group_by_rules(&query)?;
    }
    assign_shared_ids(&mut query);
    check_having(&query)?;
    Ok(query)
}

/// Step 1: `{ alias_name -> SELECT expression }` for every aliased SELECT
/// entry.
fn alias_map(query: &Query) -> HashMap<String, Expr> {
    let mut map = HashMap::new();
    for e in &query.select_exprs {
        if let Some(alias) = e.alias() {
            map.insert(alias.to_string(), e.clone());
        }
    }
    map
}

/// Step 2: in WHERE/GROUP BY/HAVING/ORDER BY, replace a ColumnRef whose name
/// equals an alias with a deep copy of the aliased expression.
fn substitute_aliases(query: &mut Query, aliases: &HashMap<String, Expr>) {
    let rewrite = |expr: &mut Expr, aliases: &HashMap<String, Expr>| {
        expr.walk_mut(&mut |node| {
            let replacement = match node.as_column() {
                Some(c) => aliases.get(&c.name).map(|e| e.deep_copy()),
                None => None,
            };
            if let Some(r) = replacement {
                *node = r;
            }
        });
    };
    if let Some(w) = &mut query.where_clause {
        rewrite(w, aliases);
    }
    for g in &mut query.group_by {
        rewrite(g, aliases);
    }
    if let Some(h) = &mut query.having {
        rewrite(h, aliases);
    }
    for o in &mut query.order_by {
        rewrite(o, aliases);
    }
}

/// Step 3: every remaining ColumnRef must name a schema column.
fn validate_columns(query: &Query, schema: &Schema) -> Result<()> {
    let mut check = |expr: &Expr| -> Result<()> {
        let mut err = None;
        expr.walk(&mut |node| {
            if let Some(c) = node.as_column() {
                if !schema.contains(&c.name) {
                    err = Some(Error::parser(format!("Column '{}' is not found", c.name)));
                }
            }
        });
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    };
    for e in &query.select_exprs {
        check(e)?;
    }
    if let Some(w) = &query.where_clause {
        check(w)?;
    }
    for g in &query.group_by {
        check(g)?;
    }
    if let Some(h) = &query.having {
        check(h)?;
    }
    for o in &query.order_by {
        check(o)?;
    }
    Ok(())
}

/// Step 4: true iff any SELECT expression transitively calls an aggregate,
/// or `group_by` is non-empty, or `distinct` is set.
fn recompute_is_aggregate(query: &Query) -> bool {
    if !query.group_by.is_empty() || query.distinct {
        return true;
    }
    query
        .select_exprs
        .iter()
        .any(|e| e.contains_aggregate(&is_aggregate_name))
}

/// Step 5: GROUP BY legality.
fn enforce_group_by_rules(query: &Query) -> Result<()> {
    for e in &query.select_exprs {
        if e.is_literal() {
            return Err(Error::parser(
                "literals are not allowed in SELECT when GROUP BY is present",
            ));
        }
        let contains_agg = e.contains_aggregate(&is_aggregate_name);
        if contains_agg {
            continue;
        }
        if e.as_column().is_some() {
            let present = query.group_by.iter().any(|g| g.structurally_eq(e));
            if !present {
                return Err(Error::parser(format!(
                    "column '{}' must appear in the GROUP BY clause or be used in an aggregate function",
                    e.as_column().unwrap().name
                )));
            }
        } else {
            let present = query.group_by.iter().any(|g| g.structurally_eq(e));
            if !present {
                return Err(Error::parser(
                    "expression must appear in the GROUP BY clause or transitively contain an aggregate",
                ));
            }
        }
    }
    Ok(())
}

/// Step 6: flatten SELECT/GROUP BY/HAVING/ORDER BY, pairwise-compare by
/// structural equality, and stamp equal nodes with a shared identifier.
fn assign_shared_ids(query: &mut Query) {
    let mut counter: usize = 0;
    // Representative (structural) nodes seen so far, paired with the id
    // assigned to them.
    let mut seen: Vec<(Expr, String)> = Vec::new();

    let mut stamp = |expr: &mut Expr, seen: &mut Vec<(Expr, String)>, counter: &mut usize| {
        expr.walk_mut(&mut |node| {
            // Only Expression nodes (not bare literals/columns) carry a
            // shared_id slot.
            if node.as_expr_node().is_none() {
                return;
            }
            if node.shared_id().is_some() {
                return;
            }
            let existing = seen.iter().find(|(rep, _)| rep.structurally_eq(node));
            if let Some((_, id)) = existing {
                node.set_shared_id(id.clone());
            } else {
                let tag = node.as_expr_node().unwrap().op_tag.tag_str();
                let id = format!("{tag}_{counter}");
                *counter += 1;
                node.set_shared_id(id.clone());
                seen.push((node.clone(), id));
            }
        });
    };

    for e in &mut query.select_exprs {
        stamp(e, &mut seen, &mut counter);
    }
    if let Some(w) = &mut query.where_clause {
        stamp(w, &mut seen, &mut counter);
    }
    for g in &mut query.group_by {
        stamp(g, &mut seen, &mut counter);
    }
    if let Some(h) = &mut query.having {
        stamp(h, &mut seen, &mut counter);
    }
    for o in &mut query.order_by {
        stamp(o, &mut seen, &mut counter);
    }
}

/// Step 7: every aggregate call inside HAVING must also appear structurally
/// in SELECT or GROUP BY.
fn check_having(query: &Query) -> Result<()> {
    let Some(having) = &query.having else {
        return Ok(());
    };
    let mut offending: Option<String> = None;
    having.walk(&mut |node| {
        if let Some(e) = node.as_expr_node() {
            if e.op_tag == crate::ast::OpTag::Function {
                if let Some(name) = &e.function_name {
                    if is_aggregate_name(name) {
                        let shared = query
                            .select_exprs
                            .iter()
                            .chain(query.group_by.iter())
                            .any(|s| s.structurally_eq(node));
                        if !shared {
                            offending = Some(name.clone());
                        }
                    }
                }
            }
        }
    });
    match offending {
        Some(name) => Err(Error::parser(format!(
            "aggregate '{name}' in HAVING must also appear in SELECT or GROUP BY"
        ))),
        None => Ok(()),
    }
}
