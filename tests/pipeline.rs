use dataset_services::services::dataset_loader::DatasetLoader;
use dataset_services::services::tabular::{
    assess_quality, classify_columns, export::paginate, export_table, parse_csv,
    parser::SourceFormat, quality::quality_band, stats::profile_column, types::ColumnKind,
    viz::correlation_matrix, viz::histogram_bins,
};
use dataset_services::config::Config;

const PREDICTIONS_CSV: &str = "\
date,symbol,close,predicted_close,confidence
2026-01-02,AAPL,187.21,189.05,0.81
2026-01-03,AAPL,188.64,190.12,0.78
2026-01-04,AAPL,186.99,188.4,0.8
2026-01-05,AAPL,189.3,191.22,0.83
2026-01-06,AAPL,190.05,191.9,0.79
2026-01-07,AAPL,191.44,192.85,0.82
";

#[test]
fn csv_flows_through_the_whole_engine() {
    let table = parse_csv(PREDICTIONS_CSV);
    assert_eq!(table.row_count(), 6);
    assert_eq!(table.column_count(), 5);

    let partition = classify_columns(&table);
    assert_eq!(partition.numeric, vec!["close", "predicted_close", "confidence"]);
    assert_eq!(partition.text, vec!["date", "symbol"]);

    let close_idx = table.column_index("close").unwrap();
    let profile = profile_column("close", ColumnKind::Numeric, &table.column_cells(close_idx));
    let summary = profile.numeric.unwrap();
    assert!(summary.min <= summary.mean && summary.mean <= summary.max);
    assert_eq!(profile.null_count, 0);

    let quality = assess_quality(&table);
    assert_eq!(quality.completeness, 100.0);
    assert_eq!(quality.uniqueness, 100.0);
    assert_eq!(quality.consistency, 100.0);
    assert_eq!(quality.validity, 100.0);
    assert_eq!(quality.overall_score, 100);
    assert_eq!(quality_band(quality.overall_score as f64), "excellent");

    let page = paginate(&table, 2, 4);
    assert_eq!(page.len(), 2);

    let closes: Vec<f64> = table
        .rows
        .iter()
        .filter_map(|row| row[close_idx].as_number())
        .collect();
    let hist = histogram_bins(&closes, 20);
    assert_eq!(hist.counts.iter().sum::<usize>(), 6);
    assert_eq!(hist.counts.len(), 3);

    let matrix = correlation_matrix(&table, &partition.numeric);
    assert_eq!(matrix.len(), 3);
    for (i, row) in matrix.iter().enumerate() {
        assert_eq!(row[i], 1.0);
    }
    // close and predicted_close track each other closely in this sample
    assert!(matrix[0][1] > 0.9);

    let export = export_table(&table, "predictions.csv", SourceFormat::Csv).unwrap();
    assert_eq!(export.filename, "exported_predictions.csv");
    let reparsed = parse_csv(&export.content);
    assert_eq!(reparsed.columns, table.columns);
    assert_eq!(reparsed.row_count(), table.row_count());
}

#[tokio::test]
async fn loader_serves_disk_files_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("predictions.csv"), PREDICTIONS_CSV).unwrap();

    let config = Config {
        max_file_size: 1024 * 1024,
        dataset_base: Some(dir.path().to_string_lossy().into_owned()),
        fallback_to_mock: false,
        cache_capacity: 8,
        port: 0,
    };
    let loader = DatasetLoader::new(&config);

    let dataset = loader.load("predictions.csv").await.unwrap();
    let table = dataset.table().unwrap();
    assert_eq!(table.row_count(), 6);

    let quality = assess_quality(table);
    assert_eq!(quality.overall_score, 100);
}
