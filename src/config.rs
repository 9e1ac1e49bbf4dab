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

//! Process-wide configuration (spec §6): currently just the batch-size
//! knob consulted when a [`crate::operator::source`] iterates a `Table`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

const DEFAULT_BATCH_SIZE: usize = 10_000;

pub struct Config {
    batch_size: AtomicUsize,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

impl Config {
    pub fn global() -> &'static Config {
        CONFIG.get_or_init(|| Config {
            batch_size: AtomicUsize::new(DEFAULT_BATCH_SIZE),
        })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size.load(Ordering::Relaxed)
    }

    pub fn set_batch_size(&self, size: usize) {
        self.batch_size.store(size.max(1), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_batch_size() {
        // Other tests in the same process may have mutated the global
        // config, so only assert the invariant that matters: it's never 0.
        assert!(Config::global().batch_size() >= 1);
    }

    #[test]
    fn set_batch_size_round_trips() {
        let cfg = Config::global();
        let prev = cfg.batch_size();
        cfg.set_batch_size(256);
        assert_eq!(cfg.batch_size(), 256);
        cfg.set_batch_size(prev);
    }
}
