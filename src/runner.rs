//! End-to-end run
//!
//! Turns parsed command-line arguments into one complete run:
//!
//! 1. Build and validate the pipeline from the arguments
//! 2. Read the sales file and ingest it (parse + validate)
//! 3. Optionally prompt for extra filters
//! 4. Load the product catalog from the chosen source
//! 5. Filter, analyze and enrich
//! 6. Write the enriched data file, the report and the optional JSON summary
//!
//! Fatal problems (missing input, bad configuration, unwritable outputs) stop
//! the run with a `SalesError`. Bad lines and an unreachable catalog do not.

use crate::catalog::{create_source, fetch_or_empty};
use crate::cli::{prompt_filters, CliArgs};
use crate::core::filter::filter_options;
use crate::core::{PipelineOutput, SalesPipeline};
use crate::io::{read_sales_lines, write_enriched_file, write_report_file, write_summary_json, ReportContext};
use crate::types::SalesError;
use chrono::Local;
use std::io::{self, BufRead, Write};
use tracing::info;

/// Run with stdin/stderr for the interactive prompt
///
/// # Errors
///
/// See [`run_with`].
pub fn run(args: &CliArgs) -> Result<PipelineOutput, SalesError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut prompt_output = io::stderr();
    run_with(args, &mut input, &mut prompt_output)
}

/// Run with explicit prompt handles
///
/// # Arguments
///
/// * `args` - Parsed command-line arguments
/// * `input` - Source of interactive answers (only read with `--interactive`)
/// * `prompt_output` - Where interactive questions are written
///
/// # Returns
///
/// The pipeline results, after every output file has been written.
///
/// # Errors
///
/// Returns an error if:
/// - The parser, analytics or filter configuration is invalid
/// - The input file is missing or unreadable
/// - An output file cannot be written
pub fn run_with(
    args: &CliArgs,
    input: &mut dyn BufRead,
    prompt_output: &mut dyn Write,
) -> Result<PipelineOutput, SalesError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let pipeline = SalesPipeline::new(args.to_parser_config(), args.to_analytics_config(), as_of)?;

    let mut filters = args.to_filter_set();
    filters.validate()?;

    info!("Reading {}", args.input_file.display());
    let lines = read_sales_lines(&args.input_file)?;
    let ingest = pipeline.ingest(&lines);

    if args.interactive {
        let chosen = prompt_filters(input, prompt_output, &filter_options(&ingest.valid))?;
        for predicate in chosen.predicates() {
            filters.push(predicate.clone());
        }
    }

    let source = create_source(args.catalog_source(), args.to_catalog_config());
    let catalog = fetch_or_empty(source.as_ref());

    let output = pipeline.complete(ingest, &filters, &catalog)?;

    write_enriched_file(&output.enriched.records, &args.enriched_output)?;
    info!("Enriched data written to {}", args.enriched_output.display());

    let source_name = args.input_file.display().to_string();
    let context = ReportContext {
        generated_at: Local::now().naive_local(),
        source: &source_name,
        ingest: &output.ingest,
        filters: &filters,
        working_count: output.working_count,
        summary: &output.summary,
        coverage: &output.enriched.coverage,
    };
    write_report_file(&context, &args.report)?;
    info!("Report written to {}", args.report.display());

    if let Some(path) = &args.summary_json {
        write_summary_json(&output.summary, path)?;
        info!("Summary JSON written to {}", path.display());
    }

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ConfigError;
    use clap::Parser;
    use std::fs;
    use std::io::Cursor;
    use std::path::Path;
    use tempfile::TempDir;

    const SALES: &str = "\
TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region
T001|2024-12-01|P101|Laptop|2|45000|C001|North
T002|2024-12-01|P102|Mouse|5|500|C002|South
T003|2024-12-02|P101|Laptop|1|45000|C003|North
T003|2024-12-02|P101|Laptop|1|45000|C003|North
T004|2024-12-03|P103|Keyboard|zero|1500|C001|East
";

    fn setup() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("sales.txt"), SALES).unwrap();
        dir
    }

    fn args(dir: &Path, extra: &[&str]) -> CliArgs {
        let mut argv = vec![
            "program".to_string(),
            dir.join("sales.txt").display().to_string(),
            "--offline".to_string(),
            "--as-of".to_string(),
            "2024-12-31".to_string(),
            "--report".to_string(),
            dir.join("out").join("report.txt").display().to_string(),
            "--enriched-output".to_string(),
            dir.join("out").join("enriched.txt").display().to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        CliArgs::try_parse_from(argv).unwrap()
    }

    fn run_quietly(args: &CliArgs) -> Result<PipelineOutput, SalesError> {
        run_with(args, &mut Cursor::new(Vec::new()), &mut Vec::new())
    }

    #[test]
    fn test_run_writes_all_outputs() {
        let dir = setup();
        let json = dir.path().join("out").join("summary.json");
        let args = args(dir.path(), &["--summary-json", json.to_str().unwrap()]);

        let output = run_quietly(&args).unwrap();

        assert_eq!(output.ingest.valid.len(), 3);
        assert_eq!(output.ingest.invalid_count(), 2);
        assert_eq!(output.summary.total_revenue.to_string(), "137500");

        let enriched = fs::read_to_string(dir.path().join("out").join("enriched.txt")).unwrap();
        assert_eq!(enriched.lines().count(), 4);
        assert!(enriched.lines().nth(1).unwrap().ends_with("|false"));

        let report = fs::read_to_string(dir.path().join("out").join("report.txt")).unwrap();
        assert!(report.contains("Total Revenue:        137500.00"));
        assert!(json.exists());
    }

    #[test]
    fn test_file_catalog_enriches_records() {
        let dir = setup();
        let catalog = dir.path().join("products.json");
        fs::write(
            &catalog,
            r#"{"products":[{"id":101,"title":"Laptop Pro","category":"laptops","brand":"Apple","rating":4.5}]}"#,
        )
        .unwrap();
        let mut args = args(dir.path(), &[]);
        args.offline = false;
        args.catalog_file = Some(catalog);

        let output = run_quietly(&args).unwrap();

        assert_eq!(output.enriched.coverage.enriched, 2);
        assert_eq!(output.enriched.coverage.unmatched_products, vec!["P102"]);
    }

    #[test]
    fn test_command_line_filters_apply() {
        let dir = setup();
        let output = run_quietly(&args(dir.path(), &["--region", "North"])).unwrap();

        assert_eq!(output.working_count, 2);
        assert_eq!(output.ingest.valid.len(), 3);
    }

    #[test]
    fn test_interactive_filters_add_to_command_line_filters() {
        let dir = setup();
        let args = args(dir.path(), &["--interactive", "--from", "2024-12-01"]);
        let mut answers = Cursor::new(b"y\nsouth\n\n\n".to_vec());
        let mut questions = Vec::new();

        let output = run_with(&args, &mut answers, &mut questions).unwrap();

        assert_eq!(output.working_count, 1);
        assert_eq!(output.summary.by_region[0].name, "South");
        assert!(String::from_utf8(questions)
            .unwrap()
            .contains("Available regions: North, South"));
    }

    #[test]
    fn test_missing_input_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_quietly(&args(dir.path(), &[]));
        assert!(matches!(result, Err(SalesError::FileNotFound { .. })));
    }

    #[test]
    fn test_contradictory_filters_stop_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), &["--from", "2024-12-31", "--to", "2024-12-01"]);
        let result = run_quietly(&args);
        assert!(matches!(
            result,
            Err(SalesError::Config(ConfigError::InvertedDateRange { .. }))
        ));
    }

    #[test]
    fn test_zero_top_n_is_a_config_error() {
        let dir = setup();
        let result = run_quietly(&args(dir.path(), &["--top-n", "0"]));
        assert_eq!(result.unwrap_err(), SalesError::Config(ConfigError::ZeroTopN));
    }
}
