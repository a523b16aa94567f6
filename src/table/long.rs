use std::path::Path;

use tracing::info;

use crate::error::Result;

use super::file::{read_table, write_table, StoredTable};
use super::{merge_header, realign, AppendSummary, Record};

/// Computes the long table that results from appending `rows` to `existing`.
///
/// The header keeps the existing order and appends unseen fields from `rows` in
/// first-seen order. Existing rows are re-keyed to the merged header, followed by
/// the new rows. Identical input appended twice yields two identical rows.
pub fn plan_long_append(
    existing: &StoredTable,
    comment: &str,
    rows: &[Record],
) -> (StoredTable, AppendSummary) {
    let (header, added_columns) =
        merge_header(&existing.header, rows.iter().flat_map(|r| r.keys()));

    let mut out_rows: Vec<Vec<String>> = existing
        .rows
        .iter()
        .map(|r| realign(&existing.header, r, &header))
        .collect();
    out_rows.extend(rows.iter().map(|r| r.project(&header)));

    let summary = AppendSummary {
        columns: header.len(),
        added_columns,
        existing_rows: existing.rows.len(),
        appended_rows: rows.len(),
    };
    let table = StoredTable {
        comment: Some(comment.to_string()),
        header,
        rows: out_rows,
    };
    (table, summary)
}

/// Appends `rows` to the long table at `path`, rewriting the whole file.
/// An empty `rows` leaves the file untouched.
pub fn append_long(path: &Path, comment: &str, rows: &[Record]) -> Result<AppendSummary> {
    if rows.is_empty() {
        return Ok(AppendSummary::default());
    }

    let existing = read_table(path)?;
    let (table, summary) = plan_long_append(&existing, comment, rows);
    write_table(path, &table)?;

    info!(
        path = %path.display(),
        columns = summary.columns,
        added = summary.added_columns.len(),
        "[TABLE] long: {} existing + {} new rows",
        summary.existing_rows,
        summary.appended_rows,
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMENT: &str = "# Match: A vs B (event 7)";

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_append_writes_comment_and_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        let rows = [Record::new().with("a", "1").with("b", "2")];

        append_long(&path, COMMENT, &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "# Match: A vs B (event 7)\na,b\n1,2\n");
    }

    #[test]
    fn new_fields_are_appended_and_old_rows_padded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");

        append_long(&path, COMMENT, &[Record::new().with("a", "1").with("b", "2")]).unwrap();
        let summary = append_long(
            &path,
            "# Match: A vs B (event 8)",
            &[Record::new().with("c", "9").with("a", "3")],
        )
        .unwrap();
        assert_eq!(summary.added_columns, strings(&["c"]));
        assert_eq!(summary.existing_rows, 1);

        let table = read_table(&path).unwrap();
        assert_eq!(table.comment.as_deref(), Some("# Match: A vs B (event 8)"));
        assert_eq!(table.header, strings(&["a", "b", "c"]));
        assert_eq!(table.rows, vec![strings(&["1", "2", ""]), strings(&["3", "", "9"])]);
    }

    #[test]
    fn repeated_identical_input_is_not_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        let rows = [Record::new().with("a", "1")];

        append_long(&path, COMMENT, &rows).unwrap();
        append_long(&path, COMMENT, &rows).unwrap();

        let table = read_table(&path).unwrap();
        assert_eq!(table.header, strings(&["a"]));
        assert_eq!(table.rows, vec![strings(&["1"]), strings(&["1"])]);
    }

    #[test]
    fn blank_existing_records_are_dropped() {
        let existing = StoredTable {
            comment: None,
            header: strings(&["a", "b"]),
            rows: vec![strings(&["1", "2"])],
        };
        let (table, _) = plan_long_append(&existing, COMMENT, &[Record::new().with("b", "5")]);
        assert_eq!(table.rows, vec![strings(&["1", "2"]), strings(&["", "5"])]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        std::fs::write(&path, "a,b\n1,2\n,\n").unwrap();
        append_long(&path, COMMENT, &[Record::new().with("a", "3")]).unwrap();
        assert_eq!(read_table(&path).unwrap().rows.len(), 2);
    }

    #[test]
    fn header_set_is_order_independent() {
        let a = [Record::new().with("x", "1").with("y", "1")];
        let b = [Record::new().with("z", "2").with("x", "2")];

        let (ab, _) = plan_long_append(&plan_long_append(&StoredTable::default(), COMMENT, &a).0, COMMENT, &b);
        let (ba, _) = plan_long_append(&plan_long_append(&StoredTable::default(), COMMENT, &b).0, COMMENT, &a);

        let mut ab_header = ab.header.clone();
        let mut ba_header = ba.header.clone();
        ab_header.sort();
        ba_header.sort();
        assert_eq!(ab_header, ba_header);
    }

    #[test]
    fn empty_input_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("long.csv");
        let summary = append_long(&path, COMMENT, &[]).unwrap();
        assert_eq!(summary, AppendSummary::default());
        assert!(!path.exists());
    }
}
