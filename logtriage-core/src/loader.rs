use std::fs;
use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

/// A row-oriented log export. Columns are discovered from the source file,
/// no schema is imposed. Row values are aligned to `columns` by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl LogTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("unsupported file format: {0} (expected .csv or .json)")]
    UnsupportedFormat(String),
    #[error("malformed {format} content: {message}")]
    Malformed { format: &'static str, message: String },
    #[error("failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Read a CSV or JSON log export into a [`LogTable`]. The parse strategy is
/// selected by file extension; anything else is rejected up front.
pub fn load_log_table(path: &Path) -> Result<LogTable, LoadError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    let data = fs::read(path)?;
    let text = decode_bytes(&data);

    let table = match extension.as_str() {
        "csv" => parse_csv(&text)?,
        "json" => parse_json(&text)?,
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    info!(
        "Loaded {} rows, {} columns from {}",
        table.row_count(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

/// Decode raw file bytes to text. Kibana exports are not reliably UTF-8:
/// sniff BOMs first, then fall back from strict UTF-8 to Windows-1252
/// (a superset of ISO-8859-1, common in older log shippers).
fn decode_bytes(data: &[u8]) -> String {
    use encoding_rs::{UTF_8, WINDOWS_1252};

    if let Some((encoding, _bom_len)) = encoding_rs::Encoding::for_bom(data) {
        let (text, _, _) = encoding.decode(data);
        debug!("Decoded input as {} via BOM", encoding.name());
        return text.into_owned();
    }

    let (text, encoding, had_errors) = UTF_8.decode(data);
    if !had_errors {
        return text.into_owned();
    }
    debug!(
        "Input is not valid {}, retrying as {}",
        encoding.name(),
        WINDOWS_1252.name()
    );
    let (text, _, _) = WINDOWS_1252.decode(data);
    text.into_owned()
}

fn parse_csv(text: &str) -> Result<LogTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| LoadError::Malformed {
            format: "CSV",
            message: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut table = LogTable::new(columns);
    for record in reader.records() {
        let record = record.map_err(|e| LoadError::Malformed {
            format: "CSV",
            message: e.to_string(),
        })?;
        let mut row: Vec<String> = record.iter().map(|v| v.to_string()).collect();
        // Ragged rows are padded or clipped to the header width.
        row.resize(table.columns.len(), String::new());
        table.rows.push(row);
    }
    Ok(table)
}

fn parse_json(text: &str) -> Result<LogTable, LoadError> {
    let records: Vec<Value> = serde_json::from_str(text).map_err(|e| LoadError::Malformed {
        format: "JSON",
        message: e.to_string(),
    })?;

    // Columns are the union of record keys in first-seen order. serde_json is
    // built with preserve_order, so per-record key order survives parsing.
    let mut columns: Vec<String> = Vec::new();
    for record in &records {
        let object = record.as_object().ok_or_else(|| LoadError::Malformed {
            format: "JSON",
            message: "expected an array of flat objects".to_string(),
        })?;
        for key in object.keys() {
            if !columns.iter().any(|c| c == key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = LogTable::new(columns);
    for record in &records {
        let object = record.as_object().expect("validated above");
        let row = table
            .columns
            .iter()
            .map(|col| object.get(col).map(render_value).unwrap_or_default())
            .collect();
        table.rows.push(row);
    }
    Ok(table)
}

/// Render a JSON scalar the way it would appear in a flat export. Nested
/// values are kept as compact JSON rather than being rejected.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "timestamp,level,message").unwrap();
        writeln!(file, "2024-01-20T10:00:00,ERROR,db connection refused").unwrap();
        writeln!(file, "2024-01-20T10:00:05,INFO,retrying").unwrap();

        let table = load_log_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["timestamp", "level", "message"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][2], "db connection refused");
    }

    #[test]
    fn test_load_json_preserves_key_order() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"ts": "2024-01-20", "level": "ERROR", "msg": "boom", "code": 500}},
               {{"ts": "2024-01-21", "level": "WARN", "msg": "slow", "host": "api-1"}}]"#
        )
        .unwrap();

        let table = load_log_table(file.path()).unwrap();
        assert_eq!(table.columns, vec!["ts", "level", "msg", "code", "host"]);
        assert_eq!(table.rows[0], vec!["2024-01-20", "ERROR", "boom", "500", ""]);
        assert_eq!(table.rows[1][4], "api-1");
    }

    #[test]
    fn test_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        let err = load_log_table(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedFormat(ext) if ext == "txt"));
    }

    #[test]
    fn test_malformed_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{{not an array").unwrap();
        let err = load_log_table(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { format: "JSON", .. }));
    }

    #[test]
    fn test_json_array_of_scalars_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "[1, 2, 3]").unwrap();
        let err = load_log_table(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::Malformed { format: "JSON", .. }));
    }

    #[test]
    fn test_csv_with_utf8_bom() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(&[0xEF, 0xBB, 0xBF]).unwrap();
        writeln!(file, "level,message").unwrap();
        writeln!(file, "ERROR,caf\u{e9} crashed").unwrap();

        let table = load_log_table(file.path()).unwrap();
        assert_eq!(table.columns[0], "level");
        assert!(table.rows[0][1].contains("café"));
    }

    #[test]
    fn test_csv_windows_1252_fallback() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"level,message\n").unwrap();
        // "número" in Windows-1252, invalid as UTF-8
        file.write_all(b"ERROR,n\xFAmero 123\n").unwrap();

        let table = load_log_table(file.path()).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.rows[0][1].contains("mero 123"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_log_table(Path::new("/nonexistent/logs.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
