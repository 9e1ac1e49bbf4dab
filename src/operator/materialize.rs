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

//! Materialize (spec §4.3 step 9 / §4.4 "Materialize"): pulls an operator
//! tree to completion and collects the result into a [`crate::table::Table`].

use crate::error::Result;
use crate::table::Table;

use super::{CancellationToken, Operator};

/// Drains `root` until it yields `None`, collecting every batch.
pub fn materialize(mut root: Box<dyn Operator>, cancel: &CancellationToken) -> Result<Table> {
    let schema = root.schema().clone();
    let mut batches = Vec::new();
    while let Some(batch) = root.next()? {
        cancel.check()?;
        if batch.num_rows() > 0 {
            batches.push(batch);
        }
    }
    Table::from_record_batches(schema, batches)
}
