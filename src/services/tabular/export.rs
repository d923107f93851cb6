use serde_json::{Map, Value};

use crate::error::AppError;

use super::parser::SourceFormat;
use super::types::{Cell, ExportFile, Table};

/// One-based page slice of the table's rows. Pages past the end come back
/// empty rather than failing.
pub fn paginate(table: &Table, page: usize, page_size: usize) -> &[Vec<Cell>] {
    if page == 0 || page_size == 0 {
        return &[];
    }
    let start = (page - 1).saturating_mul(page_size);
    if start >= table.rows.len() {
        return &[];
    }
    let end = (start + page_size).min(table.rows.len());
    &table.rows[start..end]
}

pub fn total_pages(table: &Table, page_size: usize) -> usize {
    if page_size == 0 {
        0
    } else {
        table.rows.len().div_ceil(page_size)
    }
}

fn cell_to_json(cell: &Cell) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Bool(b) => Value::Bool(*b),
        Cell::Number(n) => serde_json::Number::from_f64(*n)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Cell::Text(s) => Value::String(s.clone()),
        Cell::Nested(s) => serde_json::from_str(s).unwrap_or_else(|_| Value::String(s.clone())),
    }
}

/// Standard CSV escaping: fields containing a comma, quote or newline are
/// quote-wrapped with internal quotes doubled. The encoder is round-trip safe
/// even though the decoder only strips simple quotes; the asymmetry is a
/// documented scope decision, not an oversight.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn to_csv(table: &Table) -> String {
    let mut out = String::new();
    out.push_str(
        &table
            .columns
            .iter()
            .map(|c| escape_csv_field(c))
            .collect::<Vec<_>>()
            .join(","),
    );
    out.push('\n');
    for row in &table.rows {
        out.push_str(
            &row.iter()
                .map(|cell| escape_csv_field(&cell.to_text()))
                .collect::<Vec<_>>()
                .join(","),
        );
        out.push('\n');
    }
    out
}

fn to_json(table: &Table) -> Result<String, AppError> {
    let rows: Vec<Value> = table
        .rows
        .iter()
        .map(|row| {
            let mut map = Map::new();
            for (col, cell) in table.columns.iter().zip(row) {
                map.insert(col.clone(), cell_to_json(cell));
            }
            Value::Object(map)
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

fn file_stem(name: &str) -> &str {
    name.rsplit('/')
        .next()
        .map(|base| base.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(base))
        .unwrap_or(name)
}

/// Re-serialize the table for download. JSON sources round-trip as pretty
/// JSON, everything else becomes CSV.
pub fn export_table(
    table: &Table,
    source_name: &str,
    format: SourceFormat,
) -> Result<ExportFile, AppError> {
    let stem = file_stem(source_name);
    match format {
        SourceFormat::Json => Ok(ExportFile {
            filename: format!("exported_{}.json", stem),
            mime_type: "application/json".to_string(),
            content: to_json(table)?,
        }),
        _ => Ok(ExportFile {
            filename: format!("exported_{}.csv", stem),
            mime_type: "text/csv".to_string(),
            content: to_csv(table),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tabular::parser::{parse_csv, parse_json};
    use serde_json::json;

    fn sample() -> Table {
        parse_csv("a,b\n1,x\n2,y\n3,z\n4,w\n5,v\n")
    }

    #[test]
    fn pages_slice_in_order() {
        let table = sample();
        let page1 = paginate(&table, 1, 2);
        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0][0], Cell::Text("1".into()));
        let page3 = paginate(&table, 3, 2);
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0][0], Cell::Text("5".into()));
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let table = sample();
        assert!(paginate(&table, 4, 2).is_empty());
        assert!(paginate(&table, 100, 10).is_empty());
        assert_eq!(total_pages(&table, 2), 3);
    }

    #[test]
    fn csv_export_escapes_commas_and_quotes() {
        let table = parse_json(&json!([
            {"name": "a,b", "note": "say \"hi\""}
        ]));
        let file = export_table(&table, "notes.csv", SourceFormat::Csv).unwrap();
        assert_eq!(file.mime_type, "text/csv");
        assert_eq!(file.filename, "exported_notes.csv");
        assert_eq!(file.content, "name,note\n\"a,b\",\"say \"\"hi\"\"\"\n");
    }

    #[test]
    fn json_export_round_trips() {
        let original = json!([
            {"a": 1.0, "b": "x"},
            {"a": 2.5, "b": "y"}
        ]);
        let table = parse_json(&original);
        let file = export_table(&table, "data/preds.json", SourceFormat::Json).unwrap();
        assert_eq!(file.mime_type, "application/json");
        assert_eq!(file.filename, "exported_preds.json");
        let reparsed: serde_json::Value = serde_json::from_str(&file.content).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn nested_cells_export_as_json_values() {
        let original = json!([{"cfg": {"lr": 0.1}}]);
        let table = parse_json(&original);
        let file = export_table(&table, "m.json", SourceFormat::Json).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&file.content).unwrap();
        assert_eq!(reparsed, original);
    }

    #[test]
    fn markdown_sources_export_as_csv() {
        let table = sample();
        let file = export_table(&table, "report.md", SourceFormat::Markdown).unwrap();
        assert_eq!(file.filename, "exported_report.csv");
    }
}
