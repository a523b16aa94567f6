//! Rendering of an aligned matrix for downstream analysis tools.

use std::io::Write;
use std::path::Path;

use serde_json::{json, Value};

use crate::align::AlignedMatrix;
use crate::config::TIMESTAMP_COLUMN;
use crate::error::Result;
use crate::table::file::write_atomic;
use crate::types::{OddsValue, OutputFormat, TimestampFormat};

/// Writes the matrix as CSV: `timestamp,<columns...>`, blank for absent cells.
pub fn write_csv<W: Write>(matrix: &AlignedMatrix, ts_format: TimestampFormat, out: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header = Vec::with_capacity(matrix.columns.len() + 1);
    header.push(TIMESTAMP_COLUMN);
    header.extend(matrix.columns.iter().map(String::as_str));
    writer.write_record(&header)?;

    for row in &matrix.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 1);
        record.push(ts_format.render(row.timestamp));
        record.extend(
            row.cells
                .iter()
                .map(|c| c.as_ref().map(OddsValue::to_string).unwrap_or_default()),
        );
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

/// `{"columns": [...], "rows": [[ts, v, ...], ...]}` with `null` for absent cells.
pub fn to_json(matrix: &AlignedMatrix, ts_format: TimestampFormat) -> Value {
    let rows: Vec<Value> = matrix
        .rows
        .iter()
        .map(|row| {
            let ts = match ts_format {
                TimestampFormat::Epoch => json!(row.timestamp),
                TimestampFormat::Human => json!(ts_format.render(row.timestamp)),
            };
            let mut out = Vec::with_capacity(row.cells.len() + 1);
            out.push(ts);
            out.extend(row.cells.iter().map(|c| match c {
                Some(OddsValue::Number(n)) => Value::Number(n.clone()),
                Some(OddsValue::Text(s)) => Value::String(s.clone()),
                None => Value::Null,
            }));
            Value::Array(out)
        })
        .collect();

    json!({ "columns": matrix.columns, "rows": rows })
}

pub fn render<W: Write>(
    matrix: &AlignedMatrix,
    format: OutputFormat,
    ts_format: TimestampFormat,
    mut out: W,
) -> Result<()> {
    match format {
        OutputFormat::Csv => write_csv(matrix, ts_format, out),
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &to_json(matrix, ts_format))?;
            writeln!(out)?;
            Ok(())
        }
    }
}

/// Renders into `path`, replacing it in one rename.
pub fn write_matrix_file(
    path: &Path,
    matrix: &AlignedMatrix,
    format: OutputFormat,
    ts_format: TimestampFormat,
) -> Result<()> {
    write_atomic(path, |out| render(matrix, format, ts_format, out))
}
