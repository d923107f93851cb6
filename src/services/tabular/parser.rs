use serde_json::Value;

use crate::error::AppError;

use super::types::{Cell, Table};

/// File formats the loader understands. Markdown is opaque preformatted text,
/// never parsed into a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Json,
    Markdown,
}

impl SourceFormat {
    pub fn from_path(path: &str) -> Result<Self, AppError> {
        let ext = path
            .rsplit('.')
            .next()
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "md" | "markdown" => Ok(SourceFormat::Markdown),
            other => Err(AppError::UnsupportedFormat(format!(
                "unsupported file extension: .{}",
                other
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Markdown => "markdown",
        }
    }
}

/// Trim and strip one pair of surrounding double quotes. Embedded commas and
/// escaped quotes are deliberately not handled; the exporter is the
/// round-trip-safe side of the pair.
fn clean_field(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        trimmed[1..trimmed.len() - 1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Header-first CSV into a rectangular table. Malformed lines degrade to
/// best-effort rows: short rows are padded with empty text, long rows are
/// truncated to the header width. Blank lines are skipped.
pub fn parse_csv(text: &str) -> Table {
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());

    let columns: Vec<String> = match lines.next() {
        Some(header) => header.split(',').map(clean_field).collect(),
        None => return Table::default(),
    };

    let rows: Vec<Vec<Cell>> = lines
        .map(|line| line.split(',').map(|f| Cell::Text(clean_field(f))).collect())
        .collect();

    Table::new(columns, rows)
}

fn cell_from_value(value: &Value) -> Cell {
    match value {
        Value::Null => Cell::Null,
        Value::Bool(b) => Cell::Bool(*b),
        Value::Number(n) => n
            .as_f64()
            .map(Cell::Number)
            .unwrap_or_else(|| Cell::Text(n.to_string())),
        Value::String(s) => Cell::Text(s.clone()),
        nested => Cell::Nested(nested.to_string()),
    }
}

fn stringify_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON into a rectangular table. An array becomes one row per element, with
/// the column set being the union of object keys in first-encounter order;
/// non-object elements are wrapped into a single `data` column. A root object
/// flattens into (key, value) pairs, which loses the nested structure of its
/// values; a known representational constraint.
pub fn parse_json(value: &Value) -> Table {
    match value {
        Value::Array(items) => {
            let mut columns: Vec<String> = Vec::new();
            for item in items {
                if let Value::Object(map) = item {
                    for key in map.keys() {
                        if !columns.iter().any(|c| c == key) {
                            columns.push(key.clone());
                        }
                    }
                } else if !columns.iter().any(|c| c == "data") {
                    columns.push("data".to_string());
                }
            }

            let rows: Vec<Vec<Cell>> = items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => columns
                        .iter()
                        .map(|col| {
                            map.get(col)
                                .map(cell_from_value)
                                .unwrap_or_else(|| Cell::Text(String::new()))
                        })
                        .collect(),
                    other => {
                        let mut row = vec![Cell::Text(String::new()); columns.len()];
                        if let Some(idx) = columns.iter().position(|c| c == "data") {
                            row[idx] = cell_from_value(other);
                        }
                        row
                    }
                })
                .collect();

            Table::new(columns, rows)
        }
        Value::Object(map) => {
            let columns = vec!["key".to_string(), "value".to_string()];
            let rows = map
                .iter()
                .map(|(k, v)| vec![Cell::Text(k.clone()), Cell::Text(stringify_value(v))])
                .collect();
            Table::new(columns, rows)
        }
        other => Table::new(
            vec!["data".to_string()],
            vec![vec![cell_from_value(other)]],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn csv_row_count_is_lines_minus_header() {
        let table = parse_csv("a,b\n1,x\n2,y\n,z\n");
        assert_eq!(table.columns, vec!["a", "b"]);
        assert_eq!(table.row_count(), 3);
        for row in &table.rows {
            assert_eq!(row.len(), 2);
        }
    }

    #[test]
    fn csv_short_rows_pad_with_empty_text() {
        let table = parse_csv("a,b,c\n1,2\n");
        assert_eq!(table.rows[0][2], Cell::Text(String::new()));
    }

    #[test]
    fn csv_strips_surrounding_quotes_and_whitespace() {
        let table = parse_csv("name,note\n\"alice\" ,  hi\n");
        assert_eq!(table.rows[0][0], Cell::Text("alice".into()));
        assert_eq!(table.rows[0][1], Cell::Text("hi".into()));
    }

    #[test]
    fn csv_without_data_lines_is_empty() {
        let table = parse_csv("a,b\n");
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn json_array_of_objects_unions_keys_in_order() {
        let table = parse_json(&json!([
            {"a": 1, "b": "x"},
            {"b": "y", "c": null}
        ]));
        assert_eq!(table.columns, vec!["a", "b", "c"]);
        assert_eq!(table.rows[0][0], Cell::Number(1.0));
        assert_eq!(table.rows[1][0], Cell::Text(String::new()));
        assert_eq!(table.rows[1][2], Cell::Null);
    }

    #[test]
    fn json_non_object_elements_wrap_as_data_column() {
        let table = parse_json(&json!([1, "two", true]));
        assert_eq!(table.columns, vec!["data"]);
        assert_eq!(table.rows[0][0], Cell::Number(1.0));
        assert_eq!(table.rows[1][0], Cell::Text("two".into()));
        assert_eq!(table.rows[2][0], Cell::Bool(true));
    }

    #[test]
    fn json_nested_values_serialize_into_cells() {
        let table = parse_json(&json!([{"a": {"x": 1}}]));
        assert_eq!(table.rows[0][0], Cell::Nested("{\"x\":1}".into()));
    }

    #[test]
    fn json_root_object_becomes_key_value_table() {
        let table = parse_json(&json!({"name": "model", "layers": [1, 2]}));
        assert_eq!(table.columns, vec!["key", "value"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows[0][0], Cell::Text("name".into()));
        assert_eq!(table.rows[0][1], Cell::Text("model".into()));
        assert_eq!(table.rows[1][1], Cell::Text("[1,2]".into()));
    }

    #[test]
    fn extension_dispatch() {
        assert_eq!(SourceFormat::from_path("data/a.CSV").unwrap(), SourceFormat::Csv);
        assert_eq!(SourceFormat::from_path("b.json").unwrap(), SourceFormat::Json);
        assert_eq!(SourceFormat::from_path("notes.md").unwrap(), SourceFormat::Markdown);
        assert!(matches!(
            SourceFormat::from_path("model.bin"),
            Err(AppError::UnsupportedFormat(_))
        ));
    }
}
