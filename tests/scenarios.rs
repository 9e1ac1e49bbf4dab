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

//! The nine concrete scenarios run against the four-row taxi-ride fixture.

mod fixture;

use vinum::Value;

fn f64_at(table: &vinum::Table, row: usize, col: usize) -> f64 {
    table.row(row)[col].as_f64().unwrap()
}

#[test]
fn scenario_1_select_star_returns_the_same_rows() {
    let t = fixture::table();
    let out = t.sql("SELECT * FROM t").unwrap();
    assert_eq!(out.num_rows(), 4);
    assert_eq!(out.schema(), t.schema());
    for i in 0..4 {
        assert_eq!(out.row(i), t.row(i));
    }
}

#[test]
fn scenario_2_tax_plus_tip() {
    let t = fixture::table();
    let out = t.sql("SELECT tax+tip AS s FROM t").unwrap();
    let got: Vec<f64> = (0..4).map(|i| f64_at(&out, i, 0)).collect();
    let want = [1.43, 7.34, 12.59, 6.69];
    for (g, w) in got.iter().zip(want.iter()) {
        assert!((g - w).abs() < 1e-6, "got {g} want {w}");
    }
}

#[test]
fn scenario_3_count_star_where_vendor_ge_2() {
    let t = fixture::table();
    let out = t.sql("SELECT count(*) FROM t WHERE vendor >= 2").unwrap();
    assert_eq!(out.row(0), vec![Value::Int64(2)]);
}

#[test]
fn scenario_4_distinct_vendor() {
    let t = fixture::table();
    let out = t.sql("SELECT distinct vendor FROM t").unwrap();
    let mut got: Vec<i64> = (0..out.num_rows()).map(|i| out.row(i)[0].as_i64().unwrap()).collect();
    got.sort();
    assert_eq!(got, vec![1, 2, 3]);
}

#[test]
fn scenario_5_group_by_vendor_count_and_sum() {
    let t = fixture::table();
    let out = t.sql("SELECT vendor, count(*), sum(total) FROM t GROUP BY vendor ORDER BY vendor").unwrap();
    assert_eq!(out.num_rows(), 3);
    let rows: Vec<(i64, i64, f64)> = (0..3)
        .map(|i| {
            let r = out.row(i);
            (r[0].as_i64().unwrap(), r[1].as_i64().unwrap(), r[2].as_f64().unwrap())
        })
        .collect();
    assert_eq!(rows[0].0, 1);
    assert_eq!(rows[0].1, 2);
    assert!((rows[0].2 - 35.83).abs() < 1e-6);
    assert_eq!(rows[1].0, 2);
    assert_eq!(rows[1].1, 1);
    assert!((rows[1].2 - 143.15).abs() < 1e-6);
    assert_eq!(rows[2].0, 3);
    assert_eq!(rows[2].1, 1);
    assert!((rows[2].2 - 53.10).abs() < 1e-6);
}

#[test]
fn scenario_6_order_by_total_desc_limit_2() {
    let t = fixture::table();
    let out = t.sql("SELECT id FROM t ORDER BY total DESC LIMIT 2").unwrap();
    assert_eq!(out.num_rows(), 2);
    assert_eq!(out.row(0), vec![Value::Int64(2)]);
    assert_eq!(out.row(1), vec![Value::Int64(4)]);
}

#[test]
fn scenario_7_group_by_city_from_having_sum_tax_gt_1_6() {
    let t = fixture::table();
    let out = t
        .sql("SELECT city_from, sum(tax) FROM t GROUP BY city_from HAVING sum(tax) > 1.6 ORDER BY city_from")
        .unwrap();
    let cities: Vec<String> = (0..out.num_rows()).map(|i| out.row(i)[0].as_str().unwrap().to_string()).collect();
    assert_eq!(cities, vec!["Munich".to_string(), "San Francisco".to_string()]);
}

#[test]
fn scenario_8_name_like_jos_percent() {
    let t = fixture::table();
    let out = t.sql("SELECT id FROM t WHERE name LIKE 'Jos%'").unwrap();
    let ids: Vec<i64> = (0..out.num_rows()).map(|i| out.row(i)[0].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 4]);
}

#[test]
fn scenario_9_total_between_10_and_100() {
    let t = fixture::table();
    let out = t.sql("SELECT id FROM t WHERE total BETWEEN 10 AND 100").unwrap();
    let ids: Vec<i64> = (0..out.num_rows()).map(|i| out.row(i)[0].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![3, 4]);
}
