//! CSV rendering of extracted tables.

use crate::database::models::TableRecord;
use anyhow::{Context, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Spreadsheet tools need the byte order mark to detect UTF-8.
const UTF8_BOM: &str = "\u{feff}";

/// Renders every record as its header row followed by its data rows, with a
/// blank line between records. Records whose content is not JSON are skipped.
pub fn records_to_csv(records: &[TableRecord]) -> String {
    let mut csv = String::new();
    for record in records {
        let Ok(content) = serde_json::from_str::<Value>(&record.content) else {
            tracing::warn!(record_id = record.id, "skipping record with unreadable content");
            continue;
        };
        if let Some(headers) = content.get("headers").and_then(Value::as_array) {
            push_row(&mut csv, headers);
        }
        if let Some(rows) = content.get("rows").and_then(Value::as_array) {
            for row in rows {
                push_row(&mut csv, row.as_array().map(Vec::as_slice).unwrap_or_default());
            }
        }
        csv.push('\n');
    }
    csv
}

pub fn write_csv(path: &Path, records: &[TableRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    let body = records_to_csv(records);
    fs::write(path, format!("{UTF8_BOM}{body}"))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn push_row(csv: &mut String, cells: &[Value]) {
    let line = cells
        .iter()
        .map(|cell| escape_cell(&cell_text(cell)))
        .collect::<Vec<_>>()
        .join(",");
    csv.push_str(&line);
    csv.push('\n');
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Line breaks inside a cell become spaces so each table row stays on one
/// CSV line.
fn escape_cell(cell: &str) -> String {
    let flat = cell.replace(['\r', '\n'], " ");
    if flat.contains(',') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}
