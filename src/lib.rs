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

//! An in-memory, columnar SQL SELECT engine: parse, bind, plan and execute a
//! single `SELECT` against a batch-oriented in-memory table.
//!
//! ```no_run
//! use vinum::Table;
//!
//! let table = Table::from_record_batches(vinum::Schema::empty(), vec![]).unwrap();
//! let _ = table.sql("SELECT 1");
//! ```

mod ast;
mod binder;
mod config;
mod data;
mod error;
mod eval;
mod functions;
mod operator;
mod parser;
mod planner;
mod stream;
mod table;

pub use config::Config;
pub use data::{Array, ArrayData, DataType, Field, RecordBatch, Schema, TimeUnit, Value};
pub use error::{Error, Result};
pub use functions::{register_scalar, register_vector, Kernel};
pub use operator::CancellationToken;
pub use stream::{CsvStreamReader, StreamReader, VecStreamReader};
pub use table::Table;
