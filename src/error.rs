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

//! Structured error kinds surfaced by every stage of the SQL pipeline.
//!
//! Mirrors the teacher's hand-written `Display`/`std::error::Error` style
//! (no `thiserror`): each stage gets its own variant carrying a message,
//! so callers can match on the stage that failed without parsing text.

use std::fmt;

/// Errors produced while compiling or executing a SQL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed SQL, unsupported statement, unknown column, GROUP BY/HAVING
    /// legality violations, bad LIMIT/OFFSET literal.
    Parser(String),
    /// Unknown SQL operator tag, unmapped shared-id, internal planner bug.
    Planner(String),
    /// Unknown function name, wrong arity.
    Function(String),
    /// Runtime shape violation (unequal column lengths, sort by boolean, ...).
    Operator(String),
    /// Cancellation or stream I/O failure.
    Executor(ExecutorErrorKind),
}

/// Sub-kinds of [`Error::Executor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutorErrorKind {
    Cancelled,
    Io(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parser(msg) => write!(f, "parser error: {msg}"),
            Error::Planner(msg) => write!(f, "planner error: {msg}"),
            Error::Function(msg) => write!(f, "function error: {msg}"),
            Error::Operator(msg) => write!(f, "operator error: {msg}"),
            Error::Executor(ExecutorErrorKind::Cancelled) => write!(f, "executor error: query cancelled"),
            Error::Executor(ExecutorErrorKind::Io(msg)) => write!(f, "executor error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn parser(msg: impl Into<String>) -> Self {
        Error::Parser(msg.into())
    }
    pub fn planner(msg: impl Into<String>) -> Self {
        Error::Planner(msg.into())
    }
    pub fn function(msg: impl Into<String>) -> Self {
        Error::Function(msg.into())
    }
    pub fn operator(msg: impl Into<String>) -> Self {
        Error::Operator(msg.into())
    }
    pub fn cancelled() -> Self {
        Error::Executor(ExecutorErrorKind::Cancelled)
    }
    pub fn io(msg: impl Into<String>) -> Self {
        Error::Executor(ExecutorErrorKind::Io(msg.into()))
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::io(e.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::io(e.to_string())
    }
}
