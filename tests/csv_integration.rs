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

//! End-to-end test of `Table::sql_stream` reading a real on-disk CSV file,
//! exercising `CsvStreamReader::from_path` beyond the in-memory fixtures.

use std::io::Write;

use vinum::{CsvStreamReader, DataType, Field, Schema, Table};

#[test]
fn sql_stream_reads_an_on_disk_csv_and_runs_a_group_by() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "vendor,total").unwrap();
    writeln!(file, "1,10").unwrap();
    writeln!(file, "1,20").unwrap();
    writeln!(file, "2,5").unwrap();
    file.flush().unwrap();

    let schema = Schema::new(vec![Field::new("vendor", DataType::Int64), Field::new("total", DataType::Int64)]);
    let reader = CsvStreamReader::from_path(file.path(), schema).unwrap();
    let out = Table::sql_stream("SELECT vendor, sum(total) as total FROM t GROUP BY vendor ORDER BY vendor", Box::new(reader)).unwrap();

    assert_eq!(out.num_rows(), 2);
    assert_eq!(out.row(0)[0].as_i64().unwrap(), 1);
    assert_eq!(out.row(0)[1].as_i64().unwrap(), 30);
    assert_eq!(out.row(1)[0].as_i64().unwrap(), 2);
    assert_eq!(out.row(1)[1].as_i64().unwrap(), 5);
}

#[test]
fn csv_stream_reader_treats_empty_fields_as_null() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "id,name").unwrap();
    writeln!(file, "1,alice").unwrap();
    writeln!(file, "2,").unwrap();
    file.flush().unwrap();

    let schema = Schema::new(vec![Field::new("id", DataType::Int64), Field::new("name", DataType::Utf8)]);
    let reader = CsvStreamReader::from_path(file.path(), schema).unwrap();
    let out = Table::sql_stream("SELECT id FROM t WHERE name IS NULL", Box::new(reader)).unwrap();
    assert_eq!(out.num_rows(), 1);
    assert_eq!(out.row(0)[0].as_i64().unwrap(), 2);
}
