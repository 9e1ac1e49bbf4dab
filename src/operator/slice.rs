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

//! Slice operator (spec §4.4 "Slice(limit, offset)"): streams a contiguous
//! row window from its parent.

use crate::data::{RecordBatch, Schema};
use crate::error::Result;

use super::{CancellationToken, Operator};

pub struct SliceOperator {
    parent: Box<dyn Operator>,
    limit: Option<i64>,
    offset: i64,
    consumed: i64,
    emitted: i64,
    cancel: CancellationToken,
}

impl SliceOperator {
    pub fn new(parent: Box<dyn Operator>, limit: Option<i64>, offset: i64, cancel: CancellationToken) -> Self {
        SliceOperator {
            parent,
            limit,
            offset,
            consumed: 0,
            emitted: 0,
            cancel,
        }
    }
}

impl Operator for SliceOperator {
    fn schema(&self) -> &Schema {
        self.parent.schema()
    }

    fn next(&mut self) -> Result<Option<RecordBatch>> {
        self.cancel.check()?;
        let window_end = match self.limit {
            Some(limit) => self.offset.saturating_add(limit),
            None => i64::MAX,
        };
        if self.offset >= window_end {
            return Ok(None);
        }
        loop {
            if self.consumed >= window_end {
                return Ok(None);
            }
            let Some(batch) = self.parent.next()? else {
                return Ok(None);
            };
            let batch_len = batch.num_rows() as i64;
            let batch_start = self.consumed;
            let batch_end = self.consumed + batch_len;
            self.consumed = batch_end;

            let want_start = self.offset.max(batch_start);
            let want_end = window_end.min(batch_end);
            if want_start >= want_end {
                continue;
            }
            let local_start = (want_start - batch_start) as usize;
            let local_len = (want_end - want_start) as usize;
            self.emitted += local_len as i64;
            return Ok(Some(batch.slice(local_start, local_len)));
        }
    }

    fn name(&self) -> &'static str {
        "Slice"
    }

    fn child(&self) -> Option<&dyn Operator> {
        Some(self.parent.as_ref())
    }
}
