//! Sales Analytics CLI
//!
//! Command-line interface for analyzing a sales transaction export.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- data/sales_data.txt
//! cargo run -- --region North --min-amount 1000 data/sales_data.txt
//! cargo run -- --offline --summary-json output/summary.json
//! cargo run -- --delimiter , --columns id,date,product_id,quantity,price --no-header sales.csv
//! cargo run -- --interactive
//! ```
//!
//! The program reads the sales file, validates every line, applies the
//! requested filters, enriches the result from the product catalog, and
//! writes the enriched data file and a text report. Progress and skipped
//! lines are logged to stderr.
//!
//! # Exit Codes
//!
//! - 0: Success (including runs where some lines were invalid)
//! - 1: Error (file not found, invalid configuration, unwritable output, etc.)

use sales_analytics::{cli, runner};
use std::io::stderr;
use std::process;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::fmt;

fn setup_logging(level: LevelFilter) {
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}

fn main() {
    let args = cli::parse_args();
    setup_logging(args.log_level.into());

    match runner::run(&args) {
        Ok(output) => {
            println!(
                "Processed {} records: {} valid, {} invalid. Report: {}",
                output.ingest.data_lines(),
                output.ingest.valid.len(),
                output.ingest.invalid_count(),
                args.report.display()
            );
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
