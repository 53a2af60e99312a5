use crate::table::ResultTable;
use anyhow::Result;
use csv::WriterBuilder;
use serde_json::{Map, Value};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Prefix cells that a spreadsheet would evaluate as a formula.
fn sanitize_cell(cell: &str) -> String {
    match cell.chars().next() {
        Some('=' | '+' | '@' | '\t' | '\r') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Save a table as CSV with header. Missing cells are written empty.
pub fn save_csv<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;
    wtr.write_record(table.columns())?;
    for row in table.rows() {
        wtr.write_record(
            row.iter()
                .map(|c| c.as_deref().map(sanitize_cell).unwrap_or_default()),
        )?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save a table as a pretty JSON array of objects keyed by column name.
pub fn save_json<P: AsRef<Path>>(table: &ResultTable, path: P) -> Result<()> {
    let records: Vec<Value> = table
        .rows()
        .iter()
        .map(|row| {
            let obj: Map<String, Value> = table
                .columns()
                .iter()
                .zip(row)
                .map(|(col, cell)| {
                    let v = cell.clone().map(Value::String).unwrap_or(Value::Null);
                    (col.clone(), v)
                })
                .collect();
            Value::Object(obj)
        })
        .collect();
    let mut f = File::create(path)?;
    let s = serde_json::to_string_pretty(&records)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}
