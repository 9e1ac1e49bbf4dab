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

//! Immutable logical tree produced by the parser and mutated only by the
//! binder (spec §3 "AST entities").

use crate::data::Value;

/// The closed enumeration of operator tags (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpTag {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    BitNot,
    BitAnd,
    BitOr,
    BitXor,
    Concat,

    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,

    And,
    Or,
    Not,

    IsNull,
    IsNotNull,

    In,
    NotIn,

    Between,
    NotBetween,

    Like,
    NotLike,

    Distinct,

    Function,
}

impl OpTag {
    /// Canonical lowercase tag used as the base of a `shared_id` (spec §4.2
    /// step 6: `"<op_or_fn>_<stable_arbitrary_suffix>"`).
    pub fn tag_str(&self) -> &'static str {
        match self {
            OpTag::Add => "add",
            OpTag::Sub => "sub",
            OpTag::Mul => "mul",
            OpTag::Div => "div",
            OpTag::Mod => "mod",
            OpTag::Neg => "neg",
            OpTag::BitNot => "bitnot",
            OpTag::BitAnd => "bitand",
            OpTag::BitOr => "bitor",
            OpTag::BitXor => "bitxor",
            OpTag::Concat => "concat",
            OpTag::Eq => "eq",
            OpTag::Neq => "neq",
            OpTag::Gt => "gt",
            OpTag::Gte => "gte",
            OpTag::Lt => "lt",
            OpTag::Lte => "lte",
            OpTag::And => "and",
            OpTag::Or => "or",
            OpTag::Not => "not",
            OpTag::IsNull => "is_null",
            OpTag::IsNotNull => "is_not_null",
            OpTag::In => "in",
            OpTag::NotIn => "not_in",
            OpTag::Between => "between",
            OpTag::NotBetween => "not_between",
            OpTag::Like => "like",
            OpTag::NotLike => "not_like",
            OpTag::Distinct => "distinct",
            OpTag::Function => "fn",
        }
    }
}

/// Sort direction for an `ORDER BY` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// A constant (spec §3 `Literal(value, alias?)`).
#[derive(Debug, Clone)]
pub struct Literal {
    pub value: Value,
    pub alias: Option<String>,
}

/// A reference to a schema field; equality is by name (spec §3).
#[derive(Debug, Clone)]
pub struct ColumnRef {
    pub name: String,
    pub alias: Option<String>,
}

/// `Expression(op_tag, args[], function_name?, alias?, shared_id?)` (spec §3).
#[derive(Debug, Clone)]
pub struct ExprNode {
    pub op_tag: OpTag,
    pub args: Vec<Expr>,
    pub function_name: Option<String>,
    pub alias: Option<String>,
    pub shared_id: Option<String>,
}

/// One node of the logical expression tree.
#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    ColumnRef(ColumnRef),
    Expr(Box<ExprNode>),
}

impl Expr {
    pub fn literal(value: Value) -> Expr {
        Expr::Literal(Literal { value, alias: None })
    }

    pub fn column(name: impl Into<String>) -> Expr {
        Expr::ColumnRef(ColumnRef {
            name: name.into(),
            alias: None,
        })
    }

    pub fn op(op_tag: OpTag, args: Vec<Expr>) -> Expr {
        Expr::Expr(Box::new(ExprNode {
            op_tag,
            args,
            function_name: None,
            alias: None,
            shared_id: None,
        }))
    }

    pub fn func(name: impl Into<String>, args: Vec<Expr>) -> Expr {
        Expr::Expr(Box::new(ExprNode {
            op_tag: OpTag::Function,
            args,
            function_name: Some(name.into()),
            alias: None,
            shared_id: None,
        }))
    }

    pub fn alias(&self) -> Option<&str> {
        match self {
            Expr::Literal(l) => l.alias.as_deref(),
            Expr::ColumnRef(c) => c.alias.as_deref(),
            Expr::Expr(e) => e.alias.as_deref(),
        }
    }

    pub fn set_alias(&mut self, alias: Option<String>) {
        match self {
            Expr::Literal(l) => l.alias = alias,
            Expr::ColumnRef(c) => c.alias = alias,
            Expr::Expr(e) => e.alias = alias,
        }
    }

    pub fn shared_id(&self) -> Option<&str> {
        match self {
            Expr::Expr(e) => e.shared_id.as_deref(),
            _ => None,
        }
    }

    pub fn set_shared_id(&mut self, id: String) {
        if let Expr::Expr(e) = self {
            e.shared_id = Some(id);
        }
    }

    pub fn as_expr_node(&self) -> Option<&ExprNode> {
        match self {
            Expr::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_expr_node_mut(&mut self) -> Option<&mut ExprNode> {
        match self {
            Expr::Expr(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::ColumnRef(c) => Some(c),
            _ => None,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expr::Literal(_))
    }

    /// Deep-copies `self`, used by the binder when substituting an aliased
    /// SELECT expression into WHERE/GROUP BY/HAVING/ORDER BY (spec §4.2 step
    /// 2: "a deep copy so later shared-id stamping does not mutate the
    /// SELECT list").
    pub fn deep_copy(&self) -> Expr {
        self.clone()
    }

    /// Structural equality ignoring `alias` and `shared_id` (spec §3:
    /// "Expression equality is structural (same op_tag, same function_name,
    /// positionally-equal arguments)").
    pub fn structurally_eq(&self, other: &Expr) -> bool {
        match (self, other) {
            (Expr::Literal(a), Expr::Literal(b)) => a.value == b.value,
            (Expr::ColumnRef(a), Expr::ColumnRef(b)) => a.name == b.name,
            (Expr::Expr(a), Expr::Expr(b)) => {
                a.op_tag == b.op_tag
                    && a.function_name == b.function_name
                    && a.args.len() == b.args.len()
                    && a.args
                        .iter()
                        .zip(b.args.iter())
                        .all(|(x, y)| x.structurally_eq(y))
            }
            _ => false,
        }
    }

    /// Recursively visits every node in the tree, including `self`.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        if let Expr::Expr(e) = self {
            for a in &e.args {
                a.walk(f);
            }
        }
    }

    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Expr)) {
        f(self);
        if let Expr::Expr(e) = self {
            for a in &mut e.args {
                a.walk_mut(f);
            }
        }
    }

    /// True if `self` or any descendant is a call to a function in
    /// `is_aggregate_name`.
    pub fn contains_aggregate(&self, is_aggregate_name: &impl Fn(&str) -> bool) -> bool {
        let mut found = false;
        self.walk(&mut |node| {
            if let Expr::Expr(e) = node {
                if e.op_tag == OpTag::Function {
                    if let Some(name) = &e.function_name {
                        if is_aggregate_name(name) {
                            found = true;
                        }
                    }
                }
            }
        });
        found
    }

    /// Display name used when no alias is given: `col_<k>` unless the
    /// expression is a bare ColumnRef, in which case its own name is used.
    pub fn default_name(&self, k: usize) -> String {
        match self {
            Expr::ColumnRef(c) => c.name.clone(),
            _ => format!("col_{k}"),
        }
    }
}

/// `(schema, select_exprs, is_aggregate, distinct, where?, group_by[],
/// having?, order_by[], sort_order[], limit?, offset)` (spec §3 "Query").
#[derive(Debug, Clone)]
pub struct Query {
    pub select_exprs: Vec<Expr>,
    pub is_aggregate: bool,
    pub distinct: bool,
    pub where_clause: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<Expr>,
    pub sort_order: Vec<SortOrder>,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl Query {
    pub fn new(select_exprs: Vec<Expr>) -> Self {
        Query {
            select_exprs,
            is_aggregate: false,
            distinct: false,
            where_clause: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            sort_order: Vec::new(),
            limit: None,
            offset: 0,
        }
    }
}
