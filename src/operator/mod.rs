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

//! Pull-based physical operator tree (spec §4.4): every operator exposes a
//! single `next() -> Option<RecordBatch>` contract and may hold one parent.

pub mod aggregate;
pub mod filter;
pub mod materialize;
pub mod project;
pub mod slice;
pub mod sort;
pub mod source;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::data::{RecordBatch, Schema};
use crate::error::{Error, Result};

/// Cooperative cancellation signal shared by every operator in one query's
/// tree (spec §5): checked at the top of every `next()` call.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken(Arc::new(AtomicBool::new(false)))
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Returns `Err(Error::cancelled())` if cancellation has been requested;
    /// every operator's `next()` calls this first.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(Error::cancelled())
        } else {
            Ok(())
        }
    }
}

/// A node in the physical operator tree. `next()` pulls at most one batch
/// from this operator's output, consuming its parent lazily as needed.
pub trait Operator: Send {
    fn schema(&self) -> &Schema;
    fn next(&mut self) -> Result<Option<RecordBatch>>;

    /// Short tag used by `Table::explain` to render the plan tree, e.g.
    /// `"Project"` or `"Aggregate"`.
    fn name(&self) -> &'static str;

    /// This operator's parent, if any (sources have none). Lets `explain`
    /// walk the chain without knowing each operator's concrete type.
    fn child(&self) -> Option<&dyn Operator> {
        None
    }
}

pub use aggregate::AggregateOperator;
pub use filter::FilterOperator;
pub use materialize::materialize;
pub use project::ProjectOperator;
pub use slice::SliceOperator;
pub use sort::SortOperator;
pub use source::{EmptySourceOperator, StreamSourceOperator, TableSourceOperator};
