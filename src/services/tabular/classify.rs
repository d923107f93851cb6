use rayon::prelude::*;

use super::types::{ColumnKind, ColumnPartition, Table, TYPE_DETECTION_ROWS};

/// Kind of a single column, sampled over the first `TYPE_DETECTION_ROWS` rows.
///
/// A column is Numeric as soon as one sampled non-missing value parses as a
/// finite number. Deliberately lenient: switching to a majority vote would
/// change which columns get numeric statistics, so callers rely on this
/// staying as-is.
pub fn classify_column(table: &Table, idx: usize) -> ColumnKind {
    let numeric = table
        .rows
        .iter()
        .take(TYPE_DETECTION_ROWS)
        .filter_map(|row| row.get(idx))
        .filter(|cell| !cell.is_missing())
        .any(|cell| cell.as_number().is_some());
    if numeric {
        ColumnKind::Numeric
    } else {
        ColumnKind::Text
    }
}

/// Partition all columns into numeric and text, preserving column order.
pub fn classify_columns(table: &Table) -> ColumnPartition {
    let kinds: Vec<(String, ColumnKind)> = table
        .columns
        .par_iter()
        .enumerate()
        .map(|(idx, name)| (name.clone(), classify_column(table, idx)))
        .collect();

    let mut partition = ColumnPartition::default();
    for (name, kind) in kinds {
        match kind {
            ColumnKind::Numeric => partition.numeric.push(name),
            ColumnKind::Text => partition.text.push(name),
        }
    }
    partition
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::tabular::parser::parse_csv;

    #[test]
    fn majority_numeric_column_is_numeric() {
        let table = parse_csv("a,b\n1,x\n2,y\n,z\n");
        let partition = classify_columns(&table);
        assert_eq!(partition.numeric, vec!["a"]);
        assert_eq!(partition.text, vec!["b"]);
    }

    #[test]
    fn single_numeric_value_flips_a_column() {
        // One parseable value in the sample is enough.
        let table = parse_csv("v\nfoo\nbar\n42\nbaz\n");
        let partition = classify_columns(&table);
        assert_eq!(partition.numeric, vec!["v"]);
    }

    #[test]
    fn all_text_column_is_text() {
        let table = parse_csv("v\nfoo\nbar\n");
        let partition = classify_columns(&table);
        assert!(partition.numeric.is_empty());
        assert_eq!(partition.text, vec!["v"]);
    }

    #[test]
    fn empty_table_partitions_to_nothing() {
        let table = parse_csv("");
        let partition = classify_columns(&table);
        assert!(partition.numeric.is_empty());
        assert!(partition.text.is_empty());
    }
}
