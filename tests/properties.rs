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
//   OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//   SOFTWARE.

//! Property tests for the quantified claims: passthrough equivalence, WHERE
//! filtering, GROUP BY multiset equivalence, COUNT(*)/COUNT(expr), and
//! ORDER BY round-trip.

use std::collections::HashSet;

use proptest::prelude::*;

use vinum::{Array, ArrayData, DataType, Field, RecordBatch, Schema, Table};

fn int_table(values: &[i64]) -> Table {
    let schema = Schema::new(vec![Field::new("v", DataType::Int64)]);
    let batch = RecordBatch::try_new(schema.clone(), vec![Array::from_data(ArrayData::Int64(values.to_vec()))]).unwrap();
    Table::from_record_batches(schema, if values.is_empty() { vec![] } else { vec![batch] }).unwrap()
}

fn int_table_with_nulls(values: &[Option<i64>]) -> Table {
    let schema = Schema::new(vec![Field::new("v", DataType::Int64)]);
    let data: Vec<i64> = values.iter().map(|v| v.unwrap_or(0)).collect();
    let validity: Vec<bool> = values.iter().map(|v| v.is_some()).collect();
    let array = Array::new(ArrayData::Int64(data), validity);
    let batch = RecordBatch::try_new(schema.clone(), vec![array]).unwrap();
    Table::from_record_batches(schema, if values.is_empty() { vec![] } else { vec![batch] }).unwrap()
}

proptest! {
    #[test]
    fn passthrough_select_star_is_row_and_column_equivalent(values in prop::collection::vec(-1000i64..1000, 0..30)) {
        let t = int_table(&values);
        let out = t.sql("SELECT * FROM t").unwrap();
        prop_assert_eq!(out.schema(), t.schema());
        prop_assert_eq!(out.num_rows(), values.len());
        for (i, v) in values.iter().enumerate() {
            prop_assert_eq!(out.row(i)[0].as_i64().unwrap(), *v);
        }
    }

    #[test]
    fn where_returns_exactly_the_matching_rows(values in prop::collection::vec(-1000i64..1000, 0..30), threshold in -1000i64..1000) {
        let t = int_table(&values);
        let out = t.sql(&format!("SELECT v FROM t WHERE v > {threshold}")).unwrap();
        let want: Vec<i64> = values.iter().copied().filter(|v| *v > threshold).collect();
        let got: Vec<i64> = (0..out.num_rows()).map(|i| out.row(i)[0].as_i64().unwrap()).collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn group_by_keys_equal_distinct_key_multiset(values in prop::collection::vec(0i64..6, 0..40)) {
        let t = int_table(&values);
        let out = t.sql("SELECT v FROM t GROUP BY v").unwrap();
        let got: HashSet<i64> = (0..out.num_rows()).map(|i| out.row(i)[0].as_i64().unwrap()).collect();
        let want: HashSet<i64> = values.into_iter().collect();
        prop_assert_eq!(got, want);
    }

    #[test]
    fn count_star_equals_row_count_regardless_of_nulls(values in prop::collection::vec(proptest::option::of(-100i64..100), 0..30)) {
        let n = values.len();
        let t = int_table_with_nulls(&values);
        let out = t.sql("SELECT count(*) FROM t").unwrap();
        prop_assert_eq!(out.row(0)[0].as_i64().unwrap(), n as i64);
    }

    #[test]
    fn count_expr_equals_non_null_count(values in prop::collection::vec(proptest::option::of(-100i64..100), 0..30)) {
        let want = values.iter().filter(|v| v.is_some()).count() as i64;
        let t = int_table_with_nulls(&values);
        let out = t.sql("SELECT count(v) FROM t").unwrap();
        prop_assert_eq!(out.row(0)[0].as_i64().unwrap(), want);
    }

    #[test]
    fn order_by_asc_then_desc_on_reverse_round_trips(values in prop::collection::vec(-1000i64..1000, 0..30)) {
        let t = int_table(&values);
        let asc = t.sql("SELECT v FROM t ORDER BY v ASC").unwrap();
        let mut want = values.clone();
        want.sort();
        let got: Vec<i64> = (0..asc.num_rows()).map(|i| asc.row(i)[0].as_i64().unwrap()).collect();
        prop_assert_eq!(&got, &want);

        let desc = t.sql("SELECT v FROM t ORDER BY v DESC").unwrap();
        let mut want_desc = values;
        want_desc.sort_by(|a, b| b.cmp(a));
        let got_desc: Vec<i64> = (0..desc.num_rows()).map(|i| desc.row(i)[0].as_i64().unwrap()).collect();
        prop_assert_eq!(got_desc, want_desc);
    }
}
