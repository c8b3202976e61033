use tracing::info;

use crate::loader::LogTable;

/// Render one row as `column: value` pairs joined by " | ", newline-terminated.
/// This is the exact text the analysis provider sees.
pub fn serialize_row(columns: &[String], row: &[String]) -> String {
    let mut text = columns
        .iter()
        .zip(row.iter())
        .map(|(col, val)| format!("{}: {}", col, val))
        .collect::<Vec<String>>()
        .join(" | ");
    text.push('\n');
    text
}

/// Split a table into ordered text chunks bounded by `max_chars`.
///
/// Greedy packing: a chunk is sealed when appending the next serialized row
/// would push it past the budget. Boundaries fall between rows only; a single
/// row longer than the budget becomes its own oversized chunk rather than
/// being cut mid-row.
pub fn chunk_rows(table: &LogTable, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for row in &table.rows {
        let row_text = serialize_row(&table.columns, row);
        if !current.is_empty() && current.len() + row_text.len() > max_chars {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(&row_text);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    info!("Split {} rows into {} chunks", table.row_count(), chunks.len());
    chunks
}
