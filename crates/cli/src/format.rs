//! Result → human/json/raw string formatting.
//!
//! Three modes:
//! - **Human** (default): `"text"`, `(integer) 42`, `(nil)`, aligned tables
//! - **JSON** (`--json`): pretty-printed `serde_json`
//! - **Raw** (`--raw`): bare values, tab-separated rows

use std::fmt::Display;

use dbkit::{ColumnInfo, DataTable, Value};
use serde_json::json;

/// Output formatting mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
    Raw,
}

/// Format an error.
pub fn format_error(err: &dyn Display, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({ "error": err.to_string() })),
        OutputMode::Raw => err.to_string(),
        OutputMode::Human => format!("(error) {}", err),
    }
}

/// Format a buffered result table.
pub fn format_table(table: &DataTable, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => {
            let rows: Vec<serde_json::Value> = table
                .rows()
                .iter()
                .map(|row| {
                    let object: serde_json::Map<String, serde_json::Value> = table
                        .columns()
                        .iter()
                        .zip(row)
                        .map(|(column, value)| (column.name.clone(), value_to_json(value)))
                        .collect();
                    serde_json::Value::Object(object)
                })
                .collect();
            pretty(&serde_json::Value::Array(rows))
        }
        OutputMode::Raw => table
            .rows()
            .iter()
            .map(|row| row.iter().map(format_value_raw).collect::<Vec<_>>().join("\t"))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => format_table_human(table),
    }
}

/// Format the result of a scalar query.
pub fn format_scalar(value: Option<&Value>, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&value.map(value_to_json).unwrap_or(serde_json::Value::Null)),
        OutputMode::Raw => value.map(format_value_raw).unwrap_or_default(),
        OutputMode::Human => value.map_or_else(|| "(nil)".to_string(), format_value_human),
    }
}

/// Format an affected-row count.
pub fn format_affected(count: u64, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!({ "affected": count })),
        OutputMode::Raw => count.to_string(),
        OutputMode::Human => format!("(integer) {}", count),
    }
}

/// Format result column descriptions.
pub fn format_columns(columns: &[ColumnInfo], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&serde_json::Value::Array(
            columns
                .iter()
                .map(|c| json!({ "name": c.name, "type": c.data_type.name() }))
                .collect(),
        )),
        OutputMode::Raw => columns
            .iter()
            .map(|c| format!("{}\t{}", c.name, c.data_type))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputMode::Human => {
            if columns.is_empty() {
                return "(no columns)".to_string();
            }
            columns
                .iter()
                .enumerate()
                .map(|(i, c)| format!("{}) \"{}\" ({})", i + 1, c.name, c.data_type))
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Format a list of names, e.g. scopes or generated files.
pub fn format_names(items: &[String], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => pretty(&json!(items)),
        OutputMode::Raw => items.join("\n"),
        OutputMode::Human => {
            if items.is_empty() {
                "(empty list)".to_string()
            } else {
                items
                    .iter()
                    .enumerate()
                    .map(|(i, s)| format!("{}) \"{}\"", i + 1, s))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
        }
    }
}

fn pretty(value: &serde_json::Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}

fn value_to_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => json!(b),
        Value::Int(i) => json!(i),
        // Non-finite floats have no JSON number form
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or_else(|| json!(f.to_string())),
        Value::String(s) => json!(s),
        Value::Bytes(b) => json!(hex(b)),
    }
}

// =========================================================================
// Raw mode
// =========================================================================

fn format_value_raw(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::String(s) => s.clone(),
        Value::Bytes(b) => hex(b),
    }
}

// =========================================================================
// Human mode
// =========================================================================

fn format_value_human(v: &Value) -> String {
    match v {
        Value::Null => "(nil)".to_string(),
        Value::Bool(b) => format!("(boolean) {}", b),
        Value::Int(i) => format!("(integer) {}", i),
        Value::Float(f) => format!("(float) {}", f),
        Value::String(s) => format!("\"{}\"", s),
        Value::Bytes(b) => format!("(bytes) {}", hex(b)),
    }
}

fn format_cell(v: &Value) -> String {
    match v {
        Value::Null => "NULL".to_string(),
        Value::Bytes(b) => format!("x'{}'", hex(b)),
        other => format_value_raw(other),
    }
}

fn format_table_human(table: &DataTable) -> String {
    if table.columns().is_empty() {
        return "(empty result)".to_string();
    }

    let cells: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(format_cell).collect())
        .collect();

    let mut widths: Vec<usize> = table
        .columns()
        .iter()
        .map(|c| c.name.chars().count())
        .collect();
    for row in &cells {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = Vec::with_capacity(cells.len() + 3);
    lines.push(render_row(
        table.columns().iter().map(|c| c.name.as_str()),
        &widths,
    ));
    lines.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    for row in &cells {
        lines.push(render_row(row.iter().map(String::as_str), &widths));
    }
    lines.push(match table.len() {
        1 => "(1 row)".to_string(),
        n => format!("({} rows)", n),
    });
    lines.join("\n")
}

fn render_row<'a>(values: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    values
        .zip(widths)
        .map(|(value, width)| format!("{:<width$}", value, width = width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn hex(data: &[u8]) -> String {
    data.iter().map(|b| format!("{:02x}", b)).collect()
}
