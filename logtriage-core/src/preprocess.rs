use std::collections::HashSet;

use tracing::{debug, info};

use crate::loader::LogTable;

/// Severity markers worth analyzing. A row survives the level filter when its
/// case-folded level value contains any of these.
pub const SEVERITY_MARKERS: [&str; 5] = ["ERROR", "WARN", "EXCEPTION", "FATAL", "CRITICAL"];

/// Roles a column can play in the projected table, in projection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Timestamp,
    Level,
    Message,
}

impl ColumnRole {
    /// Name substrings that identify a column for this role, in priority
    /// order. The first column (in declared order) matching the first
    /// predicate wins; later predicates are only consulted when earlier ones
    /// matched nothing.
    fn predicates(self) -> &'static [&'static str] {
        match self {
            ColumnRole::Timestamp => &["time", "date"],
            ColumnRole::Level => &["level", "severity"],
            ColumnRole::Message => &["message", "msg", "text"],
        }
    }
}

const ROLE_ORDER: [ColumnRole; 3] = [
    ColumnRole::Timestamp,
    ColumnRole::Level,
    ColumnRole::Message,
];

/// Outcome of preprocessing: the projected, deduplicated, severity-filtered,
/// row-capped table, plus which column index (post-projection) carried the
/// level, if any.
#[derive(Debug)]
pub struct FilteredTable {
    pub table: LogTable,
    pub level_column: Option<usize>,
}

impl FilteredTable {
    pub fn row_count(&self) -> usize {
        self.table.row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Find the column index for a role. Deterministic for a given header: the
/// match is by case-insensitive substring, scanning columns in declared order
/// for each predicate in turn.
fn select_column(columns: &[String], role: ColumnRole) -> Option<usize> {
    for predicate in role.predicates() {
        let found = columns
            .iter()
            .position(|name| name.to_lowercase().contains(predicate));
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Reduce a raw log table to the rows worth sending for analysis: project to
/// the timestamp/level/message-like columns, drop exact duplicates, keep only
/// severity-marked rows when a level column exists, and cap the row count.
pub fn preprocess(table: &LogTable, max_rows: usize) -> FilteredTable {
    // Selected source-column index per role, deduplicated across roles so a
    // column like "level_text" cannot serve as both level and message.
    let mut selected: Vec<(ColumnRole, usize)> = Vec::new();
    for role in ROLE_ORDER {
        if let Some(idx) = select_column(&table.columns, role) {
            if !selected.iter().any(|&(_, i)| i == idx) {
                selected.push((role, idx));
            }
        }
    }

    let (projection, level_column) = if selected.is_empty() {
        // No semantic match at all: fall back to the first three columns.
        // This heuristic is unvalidated and can misidentify data; it mirrors
        // what analysts do by hand with an unlabeled export.
        let width = table.columns.len().min(3);
        debug!("No timestamp/level/message-like columns, using first {}", width);
        ((0..width).collect::<Vec<usize>>(), None)
    } else {
        let projection: Vec<usize> = selected.iter().map(|&(_, i)| i).collect();
        let level_column = selected
            .iter()
            .position(|&(role, _)| role == ColumnRole::Level);
        (projection, level_column)
    };

    let columns: Vec<String> = projection
        .iter()
        .map(|&i| table.columns[i].clone())
        .collect();
    info!("Using columns: {:?}", columns);

    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut rows: Vec<Vec<String>> = Vec::new();
    for row in &table.rows {
        if rows.len() >= max_rows {
            break;
        }
        let projected: Vec<String> = projection
            .iter()
            .map(|&i| row.get(i).cloned().unwrap_or_default())
            .collect();

        if let Some(level_idx) = level_column {
            if !is_severe(&projected[level_idx]) {
                continue;
            }
        }
        if seen.insert(projected.clone()) {
            rows.push(projected);
        }
    }

    if level_column.is_some() {
        info!("Filtered to {} error/warning rows", rows.len());
    }

    FilteredTable {
        table: LogTable { columns, rows },
        level_column,
    }
}

/// Rows with an empty or unrecognized level value are dropped while the
/// severity filter is active.
fn is_severe(level_value: &str) -> bool {
    let folded = level_value.to_uppercase();
    SEVERITY_MARKERS.iter().any(|m| folded.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(columns: &[&str], rows: &[&[&str]]) -> LogTable {
        LogTable {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| v.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_column_selection_by_substring() {
        let t = table(
            &["@timestamp", "log.level", "host", "message"],
            &[&["2024-01-20", "ERROR", "api-1", "boom"]],
        );
        let filtered = preprocess(&t, 50);
        assert_eq!(
            filtered.table.columns,
            vec!["@timestamp", "log.level", "message"]
        );
        assert_eq!(filtered.level_column, Some(1));
    }

    #[test]
    fn test_column_selection_is_deterministic() {
        let t = table(
            &["Date", "Severity", "text_payload"],
            &[&["2024-01-20", "critical", "disk full"]],
        );
        let first = preprocess(&t, 50);
        let second = preprocess(&t, 50);
        assert_eq!(first.table.columns, second.table.columns);
        // Secondary predicates: "date" for timestamp, "severity" for level.
        assert_eq!(first.table.columns, vec!["Date", "Severity", "text_payload"]);
    }

    #[test]
    fn test_fallback_to_first_three_columns() {
        let t = table(
            &["a", "b", "c", "d"],
            &[&["1", "2", "3", "4"], &["5", "6", "7", "8"]],
        );
        let filtered = preprocess(&t, 50);
        assert_eq!(filtered.table.columns, vec!["a", "b", "c"]);
        assert_eq!(filtered.level_column, None);
        // No level column means no severity filtering.
        assert_eq!(filtered.row_count(), 2);
    }

    #[test]
    fn test_severity_filter_case_insensitive_contains() {
        let t = table(
            &["level", "message"],
            &[
                &["error", "a"],
                &["[WARNING]", "b"],
                &["info", "c"],
                &["FaTaL", "d"],
                &["", "e"],
            ],
        );
        let filtered = preprocess(&t, 50);
        let levels: Vec<&str> = filtered
            .table
            .rows
            .iter()
            .map(|r| r[0].as_str())
            .collect();
        assert_eq!(levels, vec!["error", "[WARNING]", "FaTaL"]);
    }

    #[test]
    fn test_duplicates_removed_order_preserved() {
        let t = table(
            &["level", "message"],
            &[
                &["ERROR", "first"],
                &["ERROR", "second"],
                &["ERROR", "first"],
                &["WARN", "third"],
            ],
        );
        let filtered = preprocess(&t, 50);
        let messages: Vec<&str> = filtered
            .table
            .rows
            .iter()
            .map(|r| r[1].as_str())
            .collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_row_cap() {
        let rows: Vec<Vec<String>> = (0..200)
            .map(|i| vec!["ERROR".to_string(), format!("failure {}", i)])
            .collect();
        let t = LogTable {
            columns: vec!["level".to_string(), "message".to_string()],
            rows,
        };
        let filtered = preprocess(&t, 50);
        assert_eq!(filtered.row_count(), 50);
        assert_eq!(filtered.table.rows[0][1], "failure 0");
    }

    #[test]
    fn test_no_surviving_rows() {
        let t = table(
            &["level", "message"],
            &[&["INFO", "all good"], &["DEBUG", "noise"]],
        );
        let filtered = preprocess(&t, 50);
        assert!(filtered.is_empty());
    }

    #[test]
    fn test_column_not_reused_across_roles() {
        // "datetime" contains "time"; make sure one column cannot fill two
        // roles when predicates overlap.
        let t = table(
            &["datetime", "message_text"],
            &[&["2024-01-20", "it broke"]],
        );
        let filtered = preprocess(&t, 50);
        assert_eq!(filtered.table.columns, vec!["datetime", "message_text"]);
        assert_eq!(filtered.level_column, None);
    }
}
