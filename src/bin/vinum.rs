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

//! Loads a CSV file into a table and runs one SQL statement against it.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use vinum::{CsvStreamReader, DataType, Field, Schema, Table, Value};

#[derive(Parser)]
#[command(name = "vinum", version, about = "In-memory columnar SQL SELECT engine")]
struct Args {
    /// CSV file to load as the input table
    csv: PathBuf,
    /// SQL SELECT statement to run against it
    sql: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let schema = sniff_schema(&args.csv)?;
    let reader = CsvStreamReader::from_path(&args.csv, schema)?;
    let result = Table::sql_stream(&args.sql, Box::new(reader))?;
    print_table(&result);
    Ok(())
}

/// Infers a column's type from its header name and first data row: each
/// field is tried as `i64`, then `f64`, then passed through as `str`.
fn sniff_schema(path: &std::path::Path) -> Result<Schema, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|s| s.to_string()).collect();
    let first_row = reader.records().next().transpose()?;
    let fields = headers
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let cell = first_row.as_ref().and_then(|r| r.get(i)).unwrap_or("");
            Field::new(name.clone(), infer_cell_type(cell))
        })
        .collect();
    Ok(Schema::new(fields))
}

fn infer_cell_type(cell: &str) -> DataType {
    if cell.is_empty() {
        return DataType::Utf8;
    }
    if cell.parse::<i64>().is_ok() {
        DataType::Int64
    } else if cell.parse::<f64>().is_ok() {
        DataType::Float64
    } else if cell.parse::<bool>().is_ok() {
        DataType::Bool
    } else {
        DataType::Utf8
    }
}

fn print_table(table: &Table) {
    let names = table.schema().names();
    println!("{}", names.join(","));
    for i in 0..table.num_rows() {
        let row = table.row(i);
        let cells: Vec<String> = row.iter().map(format_value).collect();
        println!("{}", cells.join(","));
    }
}

fn format_value(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
