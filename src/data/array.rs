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

//! Columnar array: a typed, ordered sequence of values plus a validity
//! bitmap (spec §3 "Column (array)").

use super::value::{DataType, TimeUnit, Value};
use crate::error::{Error, Result};

/// The typed backing storage for an [`Array`].
#[derive(Debug, Clone)]
pub enum ArrayData {
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Float64(Vec<f64>),
    Utf8(Vec<String>),
    Timestamp(Vec<i64>, TimeUnit),
    Date(Vec<i32>),
}

/// A finite ordered sequence of values of one logical type plus a parallel
/// validity bitmap: one bit (here, one `bool`) per slot. Length, type and
/// validity are invariants enforced by construction.
#[derive(Debug, Clone)]
pub struct Array {
    data: ArrayData,
    /// `true` = valid (non-null). Always the same length as `data`.
    validity: Vec<bool>,
}

impl Array {
    pub fn new(data: ArrayData, validity: Vec<bool>) -> Self {
        debug_assert_eq!(data_len(&data), validity.len());
        Array { data, validity }
    }

    /// All values valid.
    pub fn from_data(data: ArrayData) -> Self {
        let len = data_len(&data);
        Array {
            data,
            validity: vec![true; len],
        }
    }

    pub fn len(&self) -> usize {
        self.validity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn data_type(&self) -> DataType {
        match &self.data {
            ArrayData::Bool(_) => DataType::Bool,
            ArrayData::Int64(_) => DataType::Int64,
            ArrayData::Float64(_) => DataType::Float64,
            ArrayData::Utf8(_) => DataType::Utf8,
            ArrayData::Timestamp(_, u) => DataType::Timestamp(*u),
            ArrayData::Date(_) => DataType::Date,
        }
    }

    pub fn is_valid(&self, i: usize) -> bool {
        self.validity[i]
    }

    pub fn validity(&self) -> &[bool] {
        &self.validity
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    /// A length-1 array (used to represent Literal / scalar results so they
    /// compose with broadcast per spec §4.4 Project and §4.8 step 5).
    pub fn scalar(value: &Value) -> Self {
        match value {
            Value::Null => Array::new(ArrayData::Float64(vec![0.0]), vec![false]),
            Value::Bool(b) => Array::from_data(ArrayData::Bool(vec![*b])),
            Value::Int64(i) => Array::from_data(ArrayData::Int64(vec![*i])),
            Value::Float64(f) => Array::from_data(ArrayData::Float64(vec![*f])),
            Value::Utf8(s) => Array::from_data(ArrayData::Utf8(vec![s.clone()])),
            Value::Timestamp(t, u) => Array::from_data(ArrayData::Timestamp(vec![*t], *u)),
            Value::Date(d) => Array::from_data(ArrayData::Date(vec![*d])),
        }
    }

    /// Broadcast a length-1 array to `len` rows (spec §4.4 Project: "Scalar
    /// (length-1) results are broadcast to max(other_column_lengths, 1)").
    pub fn broadcast(&self, len: usize) -> Array {
        if self.len() == len {
            return self.clone();
        }
        assert_eq!(self.len(), 1, "broadcast source must be scalar");
        let valid = self.validity[0];
        let validity = vec![valid; len];
        let data = match &self.data {
            ArrayData::Bool(v) => ArrayData::Bool(vec![v[0]; len]),
            ArrayData::Int64(v) => ArrayData::Int64(vec![v[0]; len]),
            ArrayData::Float64(v) => ArrayData::Float64(vec![v[0]; len]),
            ArrayData::Utf8(v) => ArrayData::Utf8(vec![v[0].clone(); len]),
            ArrayData::Timestamp(v, u) => ArrayData::Timestamp(vec![v[0]; len], *u),
            ArrayData::Date(v) => ArrayData::Date(vec![v[0]; len]),
        };
        Array::new(data, validity)
    }

    /// Builds a column of the given logical type from a list of per-row
    /// scalar values, used when an operator (Aggregate, Sort) assembles its
    /// output row by row rather than kernel-at-a-time.
    pub fn from_values(dtype: DataType, values: Vec<Value>) -> Array {
        let mut validity = Vec::with_capacity(values.len());
        let data = match dtype {
            DataType::Null | DataType::Float64 => ArrayData::Float64(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        v.as_f64().unwrap_or(0.0)
                    })
                    .collect(),
            ),
            DataType::Bool => ArrayData::Bool(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        v.as_bool().unwrap_or(false)
                    })
                    .collect(),
            ),
            DataType::Int64 => ArrayData::Int64(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        v.as_i64().unwrap_or(0)
                    })
                    .collect(),
            ),
            DataType::Utf8 => ArrayData::Utf8(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        match v {
                            Value::Utf8(s) => s,
                            other => {
                                if other.is_null() {
                                    String::new()
                                } else {
                                    other.to_string()
                                }
                            }
                        }
                    })
                    .collect(),
            ),
            DataType::Timestamp(u) => ArrayData::Timestamp(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        match v {
                            Value::Timestamp(t, _) => t,
                            _ => 0,
                        }
                    })
                    .collect(),
                u,
            ),
            DataType::Date => ArrayData::Date(
                values
                    .into_iter()
                    .map(|v| {
                        let ok = !v.is_null();
                        validity.push(ok);
                        match v {
                            Value::Date(d) => d,
                            _ => 0,
                        }
                    })
                    .collect(),
            ),
        };
        Array::new(data, validity)
    }

    pub fn get(&self, i: usize) -> Value {
        if !self.validity[i] {
            return Value::Null;
        }
        match &self.data {
            ArrayData::Bool(v) => Value::Bool(v[i]),
            ArrayData::Int64(v) => Value::Int64(v[i]),
            ArrayData::Float64(v) => Value::Float64(v[i]),
            ArrayData::Utf8(v) => Value::Utf8(v[i].clone()),
            ArrayData::Timestamp(v, u) => Value::Timestamp(v[i], *u),
            ArrayData::Date(v) => Value::Date(v[i]),
        }
    }

    /// Selects rows by boolean mask (used by Filter); validity-false entries
    /// in `mask` are treated as false (spec §4.4 Filter emit-null semantics).
    pub fn filter_by_mask(&self, mask: &Array) -> Result<Array> {
        let ArrayData::Bool(mvals) = &mask.data else {
            return Err(Error::operator("filter mask must be boolean"));
        };
        if mvals.len() != self.len() {
            return Err(Error::operator("unequal sizes"));
        }
        let keep: Vec<usize> = (0..self.len())
            .filter(|&i| mask.validity[i] && mvals[i])
            .collect();
        Ok(self.take(&keep))
    }

    /// Gathers rows at the given (possibly reordered, possibly repeating)
    /// indices; used by Filter, Sort and Slice.
    pub fn take(&self, idx: &[usize]) -> Array {
        let validity: Vec<bool> = idx.iter().map(|&i| self.validity[i]).collect();
        let data = match &self.data {
            ArrayData::Bool(v) => ArrayData::Bool(idx.iter().map(|&i| v[i]).collect()),
            ArrayData::Int64(v) => ArrayData::Int64(idx.iter().map(|&i| v[i]).collect()),
            ArrayData::Float64(v) => ArrayData::Float64(idx.iter().map(|&i| v[i]).collect()),
            ArrayData::Utf8(v) => ArrayData::Utf8(idx.iter().map(|&i| v[i].clone()).collect()),
            ArrayData::Timestamp(v, u) => {
                ArrayData::Timestamp(idx.iter().map(|&i| v[i]).collect(), *u)
            }
            ArrayData::Date(v) => ArrayData::Date(idx.iter().map(|&i| v[i]).collect()),
        };
        Array::new(data, validity)
    }

    /// Row range `[start, start+len)`.
    pub fn slice(&self, start: usize, len: usize) -> Array {
        self.take(&(start..start + len).collect::<Vec<_>>())
    }

    /// Concatenates several arrays of the same type end to end.
    pub fn concat(arrays: &[&Array]) -> Result<Array> {
        if arrays.is_empty() {
            return Ok(Array::from_data(ArrayData::Int64(vec![])));
        }
        let ty = arrays[0].data_type();
        for a in arrays {
            if a.data_type() != ty {
                return Err(Error::operator("cannot concat arrays of different types"));
            }
        }
        let mut validity = Vec::new();
        for a in arrays {
            validity.extend_from_slice(&a.validity);
        }
        let data = match ty {
            DataType::Bool => ArrayData::Bool(concat_field(arrays, |d| match d {
                ArrayData::Bool(v) => v.clone(),
                _ => unreachable!(),
            })),
            DataType::Int64 => ArrayData::Int64(concat_field(arrays, |d| match d {
                ArrayData::Int64(v) => v.clone(),
                _ => unreachable!(),
            })),
            DataType::Float64 => ArrayData::Float64(concat_field(arrays, |d| match d {
                ArrayData::Float64(v) => v.clone(),
                _ => unreachable!(),
            })),
            DataType::Utf8 => ArrayData::Utf8(concat_field(arrays, |d| match d {
                ArrayData::Utf8(v) => v.clone(),
                _ => unreachable!(),
            })),
            DataType::Timestamp(u) => ArrayData::Timestamp(
                concat_field(arrays, |d| match d {
                    ArrayData::Timestamp(v, _) => v.clone(),
                    _ => unreachable!(),
                }),
                u,
            ),
            DataType::Date => ArrayData::Date(concat_field(arrays, |d| match d {
                ArrayData::Date(v) => v.clone(),
                _ => unreachable!(),
            })),
            DataType::Null => ArrayData::Float64(vec![]),
        };
        Ok(Array::new(data, validity))
    }
}

fn concat_field<T: Clone>(arrays: &[&Array], f: impl Fn(&ArrayData) -> Vec<T>) -> Vec<T> {
    let mut out = Vec::new();
    for a in arrays {
        out.extend(f(&a.data));
    }
    out
}

fn data_len(data: &ArrayData) -> usize {
    match data {
        ArrayData::Bool(v) => v.len(),
        ArrayData::Int64(v) => v.len(),
        ArrayData::Float64(v) => v.len(),
        ArrayData::Utf8(v) => v.len(),
        ArrayData::Timestamp(v, _) => v.len(),
        ArrayData::Date(v) => v.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_scalar() {
        let a = Array::scalar(&Value::Int64(7));
        let b = a.broadcast(4);
        assert_eq!(b.len(), 4);
        for i in 0..4 {
            assert_eq!(b.get(i), Value::Int64(7));
        }
    }

    #[test]
    fn filter_by_mask_treats_null_as_false() {
        let a = Array::from_data(ArrayData::Int64(vec![1, 2, 3]));
        let mask = Array::new(ArrayData::Bool(vec![true, false, true]), vec![true, true, false]);
        let out = a.filter_by_mask(&mask).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(0), Value::Int64(1));
    }
}
