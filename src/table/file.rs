use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::Result;

/// A table as it sits on disk: optional comment, header, positional rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredTable {
    pub comment: Option<String>,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl StoredTable {
    pub fn is_empty(&self) -> bool {
        self.header.is_empty() && self.rows.is_empty()
    }
}

/// Reads a table. A missing or zero-length file reads as an empty table.
/// Rows whose cells are all blank are discarded.
pub fn read_table(path: &Path) -> Result<StoredTable> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoredTable::default()),
        Err(e) => return Err(e.into()),
    };
    parse_table(&text)
}

fn parse_table(text: &str) -> Result<StoredTable> {
    let (comment, body) = match text.strip_prefix('#') {
        Some(_) => match text.split_once('\n') {
            Some((first, rest)) => (Some(first.trim_end_matches('\r').to_string()), rest),
            None => (Some(text.trim_end().to_string()), ""),
        },
        None => (None, text),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut records = reader.records();
    let header: Vec<String> = match records.next() {
        Some(first) => first?.iter().map(str::to_string).collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        if record.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(StoredTable { comment, header, rows })
}

/// Replaces `path` with `table`. The content goes to a temporary file in the
/// same directory first and is renamed over the target, so readers see either
/// the old table or the new one.
pub fn write_table(path: &Path, table: &StoredTable) -> Result<()> {
    write_atomic(path, |out| {
        if let Some(comment) = &table.comment {
            writeln!(out, "{comment}")?;
        }
        let mut writer = csv::Writer::from_writer(out);
        writer.write_record(&table.header)?;
        for row in &table.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    })
}

/// Writes through `fill` into a temp file beside `path`, then renames it into place.
/// Missing parent directories are created.
pub fn write_atomic<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    fill(&mut tmp)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    debug!(path = %path.display(), "table written");
    Ok(())
}
