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

//! Aggregate accumulators (spec §4.6): `COUNT, COUNT_STAR, MIN, MAX, SUM, AVG`.

use crate::data::{DataType, Value};

/// One of the aggregate-function kinds spec §4.6 names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggKind {
    Count,
    CountStar,
    Min,
    Max,
    Sum,
    Avg,
}

/// Per-group running state for one aggregate function. Kept generic over
/// the accumulator kind so the planner can build one `Accumulator` per
/// `(func_kind, input_column_name, output_column_name)` triple (spec §4.6).
#[derive(Debug, Clone)]
pub enum Accumulator {
    Count {
        non_null: i64,
    },
    CountStar {
        rows: i64,
    },
    Min {
        value: Option<Value>,
    },
    Max {
        value: Option<Value>,
    },
    /// SUM of an empty group is `0`/`0.0` (spec §4.6), never null, so the
    /// accumulator starts seeded rather than `Option`-wrapped.
    Sum {
        int_total: i64,
        float_total: f64,
        is_float: bool,
    },
    Avg {
        total: f64,
        count: i64,
    },
}

impl Accumulator {
    pub fn new(kind: AggKind, input_type: DataType) -> Self {
        match kind {
            AggKind::Count => Accumulator::Count { non_null: 0 },
            AggKind::CountStar => Accumulator::CountStar { rows: 0 },
            AggKind::Min => Accumulator::Min { value: None },
            AggKind::Max => Accumulator::Max { value: None },
            AggKind::Sum => Accumulator::Sum {
                int_total: 0,
                float_total: 0.0,
                is_float: matches!(input_type, DataType::Float64),
            },
            AggKind::Avg => Accumulator::Avg {
                total: 0.0,
                count: 0,
            },
        }
    }

    /// Folds one row's value (`Value::Null` if the slot is invalid) into
    /// the accumulator. `row_present` is always true except for
    /// `COUNT_STAR`'s caller, which calls [`Accumulator::count_row`]
    /// directly instead since it has no input column to read.
    pub fn update(&mut self, value: &Value) {
        match self {
            Accumulator::Count { non_null } => {
                if !value.is_null() {
                    *non_null += 1;
                }
            }
            Accumulator::CountStar { rows } => {
                *rows += 1;
            }
            Accumulator::Min { value: cur } => {
                if !value.is_null() {
                    *cur = Some(match cur.take() {
                        None => value.clone(),
                        Some(c) => {
                            if value.cmp_for_sort(&c) == std::cmp::Ordering::Less {
                                value.clone()
                            } else {
                                c
                            }
                        }
                    });
                }
            }
            Accumulator::Max { value: cur } => {
                if !value.is_null() {
                    *cur = Some(match cur.take() {
                        None => value.clone(),
                        Some(c) => {
                            if value.cmp_for_sort(&c) == std::cmp::Ordering::Greater {
                                value.clone()
                            } else {
                                c
                            }
                        }
                    });
                }
            }
            Accumulator::Sum {
                int_total,
                float_total,
                is_float,
            } => {
                if !value.is_null() {
                    if *is_float {
                        *float_total += value.as_f64().unwrap_or(0.0);
                    } else {
                        match value {
                            Value::Int64(i) => *int_total = int_total.saturating_add(*i),
                            _ => *float_total += value.as_f64().unwrap_or(0.0),
                        }
                    }
                }
            }
            Accumulator::Avg { total, count } => {
                if !value.is_null() {
                    *total += value.as_f64().unwrap_or(0.0);
                    *count += 1;
                }
            }
        }
    }

    /// `COUNT_STAR` counts every row regardless of nulls (spec §4.6); the
    /// aggregate operator calls this once per row instead of `update`.
    pub fn count_row(&mut self) {
        if let Accumulator::CountStar { rows } = self {
            *rows += 1;
        }
    }

    pub fn finish(&self) -> Value {
        match self {
            Accumulator::Count { non_null } => Value::Int64(*non_null),
            Accumulator::CountStar { rows } => Value::Int64(*rows),
            Accumulator::Min { value } => value.clone().unwrap_or(Value::Null),
            Accumulator::Max { value } => value.clone().unwrap_or(Value::Null),
            Accumulator::Sum {
                int_total,
                float_total,
                is_float,
            } => {
                if *is_float {
                    Value::Float64(*float_total)
                } else {
                    Value::Int64(*int_total)
                }
            }
            Accumulator::Avg { total, count } => {
                if *count == 0 {
                    Value::Null
                } else {
                    Value::Float64(*total / *count as f64)
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_empty_group_is_zero() {
        let acc = Accumulator::new(AggKind::Sum, DataType::Int64);
        assert_eq!(acc.finish(), Value::Int64(0));
        let acc = Accumulator::new(AggKind::Sum, DataType::Float64);
        assert_eq!(acc.finish(), Value::Float64(0.0));
    }

    #[test]
    fn min_max_of_empty_group_is_null() {
        let acc = Accumulator::new(AggKind::Min, DataType::Int64);
        assert_eq!(acc.finish(), Value::Null);
    }

    #[test]
    fn avg_skips_nulls() {
        let mut acc = Accumulator::new(AggKind::Avg, DataType::Float64);
        acc.update(&Value::Float64(2.0));
        acc.update(&Value::Null);
        acc.update(&Value::Float64(4.0));
        assert_eq!(acc.finish(), Value::Float64(3.0));
    }

    #[test]
    fn avg_of_all_null_group_is_null() {
        let mut acc = Accumulator::new(AggKind::Avg, DataType::Float64);
        acc.update(&Value::Null);
        assert_eq!(acc.finish(), Value::Null);
    }

    #[test]
    fn count_star_counts_nulls() {
        let mut acc = Accumulator::new(AggKind::CountStar, DataType::Int64);
        acc.count_row();
        acc.count_row();
        assert_eq!(acc.finish(), Value::Int64(2));
    }
}
