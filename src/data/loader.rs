use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::model::Row;

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load sheet rows from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json` – the same body the sheet endpoint serves (array of arrays)
/// * `.csv`  – one record per row, the first record being the header
pub fn load_file(path: &Path) -> Result<Vec<Row>> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_json(&text)
        }
        "csv" => load_csv(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
}

// ---------------------------------------------------------------------------
// JSON
// ---------------------------------------------------------------------------

/// Parse the sheet endpoint body:
///
/// ```json
/// [
///   ["Docket No", "Route ID", "Route Name", "Fault Date/Time", ...],
///   ["D-101", "R-7", "North Ring", "2024-03-01 10:15", ...],
///   ...
/// ]
/// ```
///
/// Cells may be strings, numbers, booleans or `null` (absent).
pub fn parse_json(text: &str) -> Result<Vec<Row>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array of rows")?;

    records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let cells = rec
                .as_array()
                .with_context(|| format!("Row {i} is not a JSON array"))?;
            Ok(Row(cells.iter().map(json_to_cell).collect()))
        })
        .collect()
}

fn json_to_cell(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV
// ---------------------------------------------------------------------------

/// Headerless, flexible reader: the header is just row 0 like the JSON form,
/// and ragged records are kept as-is.
fn load_csv(path: &Path) -> Result<Vec<Row>> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Row>> {
    reader
        .records()
        .enumerate()
        .map(|(row_no, result)| {
            let record = result.with_context(|| format!("CSV row {row_no}"))?;
            Ok(record.iter().collect())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_mixed_cells() {
        let rows = parse_json(
            r#"[["ID","Route","Count","Open"],[1,"Alpha",2.5,true],["2",null]]"#,
        )
        .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cell(1), Some("Route"));
        assert_eq!(rows[1].cell(0), Some("1"));
        assert_eq!(rows[1].cell(2), Some("2.5"));
        assert_eq!(rows[1].cell(3), Some("true"));
        assert_eq!(rows[2].cell(1), None);
        assert_eq!(rows[2].len(), 2);
    }

    #[test]
    fn empty_array_is_an_empty_sheet() {
        assert!(parse_json("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_tabular_bodies() {
        assert!(parse_json(r#"{"error":"quota"}"#).is_err());
        assert!(parse_json(r#"[["a"], "b"]"#).is_err());
        assert!(parse_json("<html>").is_err());
    }

    #[test]
    fn loads_ragged_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "ID,Route,Status").unwrap();
        writeln!(file, "1,Alpha Line,Restored").unwrap();
        writeln!(file, "2,Beta Line").unwrap();

        let rows = load_file(file.path()).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].cell(2), Some("Status"));
        assert_eq!(rows[2].cell(1), Some("Beta Line"));
        assert_eq!(rows[2].cell(2), None);
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[["ID"],["1"]]"#).unwrap();
        assert_eq!(load_file(file.path()).unwrap().len(), 2);
    }

    #[test]
    fn unsupported_extension_is_an_error() {
        let err = load_file(Path::new("faults.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
