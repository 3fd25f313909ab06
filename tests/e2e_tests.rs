//! End-to-end integration tests
//!
//! These tests drive complete runs through the library entry point the binary
//! uses. Fixture tests:
//! 1. Read input.txt from a fixture directory
//! 2. Run parse, validate, filter, analyze and enrich with the catalog offline
//! 3. Write the enriched data file and report into a temporary directory
//! 4. Compare the enriched file with expected.txt
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Malformed lines and rule violations of every kind
//! - Command-line filtering

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::Parser;
    use rstest::rstest;
    use rust_decimal::Decimal;
    use sales_analytics::cli::CliArgs;
    use sales_analytics::config::{AnalyticsConfig, ColumnLayout, ParserConfig};
    use sales_analytics::core::{FilterSet, PipelineOutput, Predicate, SalesPipeline};
    use sales_analytics::runner::run_with;
    use sales_analytics::types::ProductCatalog;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    /// Run the binary flow over `input` with offline enrichment
    fn run_file(input: &Path, out: &TempDir, extra: &[&str]) -> PipelineOutput {
        let mut argv = vec![
            "sales-analytics".to_string(),
            input.display().to_string(),
            "--offline".to_string(),
            "--as-of".to_string(),
            "2024-12-31".to_string(),
            "--report".to_string(),
            out.path().join("report.txt").display().to_string(),
            "--enriched-output".to_string(),
            out.path().join("enriched.txt").display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        let args = CliArgs::try_parse_from(argv).expect("Failed to parse arguments");

        run_with(&args, &mut Cursor::new(Vec::new()), &mut Vec::new())
            .unwrap_or_else(|e| panic!("Run failed: {}", e))
    }

    /// Run a fixture and compare the enriched output with expected.txt
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - Output doesn't match expected
    fn run_test_fixture(fixture_name: &str, extra: &[&str]) -> PipelineOutput {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.txt", fixture_dir);
        let expected_path = format!("{}/expected.txt", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );

        let out = tempfile::tempdir().expect("Failed to create temp dir");
        let output = run_file(Path::new(&input_path), &out, extra);

        let actual_output = fs::read_to_string(out.path().join("enriched.txt"))
            .unwrap_or_else(|e| panic!("Failed to read enriched output: {}", e));
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {}\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, actual_output, expected_output
        );
        assert!(out.path().join("report.txt").exists());

        output
    }

    #[rstest]
    #[case::happy_path("happy_path", &[], 4, 0)]
    #[case::malformed_data("malformed_data", &[], 2, 8)]
    #[case::regional_filter("regional_filter", &["--region", "North"], 4, 0)]
    fn test_fixtures(
        #[case] fixture: &str,
        #[case] extra: &[&str],
        #[case] valid: usize,
        #[case] invalid: usize,
    ) {
        let output = run_test_fixture(fixture, extra);
        assert_eq!(output.ingest.valid.len(), valid);
        assert_eq!(output.ingest.invalid_count(), invalid);
    }

    #[test]
    fn test_malformed_data_reasons() {
        let output = run_test_fixture("malformed_data", &[]);
        let counts = output.ingest.failure_counts();

        assert_eq!(counts.get("duplicate_id"), Some(&1));
        assert_eq!(counts.get("non_positive_quantity"), Some(&1));
        assert_eq!(counts.get("unparseable_date"), Some(&1));
        assert_eq!(counts.get("wrong_field_count"), Some(&1));
        assert_eq!(counts.get("future_date"), Some(&1));
        assert_eq!(counts.get("empty_product_id"), Some(&1));
        assert_eq!(counts.get("negative_quantity"), Some(&1));
        assert_eq!(counts.get("non_numeric_price"), Some(&1));
        assert_eq!(output.ingest.blank_lines, 1);
        assert_eq!(output.ingest.data_lines(), 10);
    }

    #[test]
    fn test_happy_path_analytics() {
        let output = run_test_fixture("happy_path", &[]);
        let summary = &output.summary;

        assert_eq!(summary.total_revenue, Decimal::new(142_000, 0));
        assert_eq!(summary.transaction_count, 4);
        assert_eq!(summary.top_products_by_revenue[0].product_id, "P101");
        assert_eq!(summary.top_products_by_quantity[0].product_id, "P102");
        assert_eq!(summary.by_region[0].name, "North");
        assert_eq!(
            summary.peak_day.as_ref().map(|d| d.date),
            NaiveDate::from_ymd_opt(2024, 12, 1)
        );
        assert_eq!(summary.customers[0].customer_id, "C001");
    }

    fn pipeline() -> SalesPipeline {
        SalesPipeline::new(
            ParserConfig::new(',', ColumnLayout::minimal()),
            AnalyticsConfig::default(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap()
    }

    // Example scenarios on the minimal comma-separated layout

    #[test]
    fn test_two_valid_lines() {
        let lines = ["T1,2024-01-01,P1,2,10.00", "T2,2024-01-02,P2,1,5.50"];
        let output = pipeline()
            .run(lines, &FilterSet::new(), &ProductCatalog::new())
            .unwrap();

        assert_eq!(output.ingest.valid.len(), 2);
        assert_eq!(output.summary.total_revenue, Decimal::new(2550, 2));
        assert_eq!(
            output.summary.average_order_value,
            Some(Decimal::new(1275, 2))
        );
    }

    #[test]
    fn test_filtered_subset_is_subset_of_valid() {
        let lines = [
            "T1,2024-01-01,P1,2,10.00",
            "T2,2024-01-02,P2,1,5.50",
            "T3,2024-02-01,P3,10,1.00",
        ];
        let filters = FilterSet::new().with(Predicate::DateRange {
            from: NaiveDate::from_ymd_opt(2024, 1, 2),
            to: NaiveDate::from_ymd_opt(2024, 1, 31),
        });
        let output = pipeline()
            .run(lines, &filters, &ProductCatalog::new())
            .unwrap();

        assert_eq!(output.working_count, 1);
        assert!(output
            .enriched
            .records
            .iter()
            .all(|r| output.ingest.valid.contains(r)));
    }

    #[rstest]
    #[case::all_good(&["T1,2024-01-01,P1,2,10.00", "T2,2024-01-02,P2,1,5.50"])]
    #[case::mixed(&[
        "T1,2024-01-01,P1,2,10.00",
        "",
        "T1,2024-01-01,P1,2,10.00",
        "T2,2024-01-01,P1,0,10.00",
        "T3,not-a-date,P1,1,1",
        "T4,2024-01-01,P1",
    ])]
    #[case::nothing_valid(&["x", "y,z", "T1,2099-01-01,P1,1,1"])]
    fn test_every_line_is_accounted_for(#[case] lines: &[&str]) {
        let output = pipeline()
            .run(lines.iter().copied(), &FilterSet::new(), &ProductCatalog::new())
            .unwrap();
        let ingest = &output.ingest;

        let non_blank = lines.iter().filter(|l| !l.trim().is_empty()).count();
        assert_eq!(ingest.valid.len() + ingest.invalid_count(), non_blank);
        assert_eq!(ingest.blank_lines, lines.len() - non_blank);
    }

    #[test]
    fn test_runs_are_deterministic() {
        let input = Path::new("tests/fixtures/malformed_data/input.txt");
        let first_dir = tempfile::tempdir().unwrap();
        let second_dir = tempfile::tempdir().unwrap();

        let first = run_file(input, &first_dir, &[]);
        let second = run_file(input, &second_dir, &[]);

        assert_eq!(first, second);
        assert_eq!(
            fs::read_to_string(first_dir.path().join("enriched.txt")).unwrap(),
            fs::read_to_string(second_dir.path().join("enriched.txt")).unwrap()
        );
    }
}
