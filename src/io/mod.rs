//! I/O module
//!
//! Everything that touches the filesystem lives here; the core only sees lines
//! and records.
//!
//! # Components
//!
//! - `reader` - Sales file loading and encoding fallback
//! - `csv_format` - Enriched data output (pipe-delimited)
//! - `report` - Plain-text analytics report

pub mod csv_format;
pub mod reader;
pub mod report;

pub use csv_format::{write_enriched_file, write_enriched_records};
pub use reader::read_sales_lines;
pub use report::{write_report, write_report_file, write_summary_json, ReportContext};
