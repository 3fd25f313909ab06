use crate::catalog::CatalogSource;
use crate::config::{
    AnalyticsConfig, CatalogConfig, ColumnLayout, ParserConfig, DEFAULT_DELIMITER,
    DEFAULT_LOW_PERFORMER_THRESHOLD, DEFAULT_TOP_N,
};
use crate::core::{FilterSet, Predicate};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;

/// Analyze a sales transaction export
#[derive(Parser, Debug)]
#[command(name = "sales-analytics")]
#[command(
    about = "Parse, validate, filter, analyze and enrich sales transactions",
    long_about = None
)]
pub struct CliArgs {
    /// Input file path containing one transaction per line
    #[arg(
        value_name = "INPUT",
        default_value = "data/sales_data.txt",
        help = "Path to the sales data file"
    )]
    pub input_file: PathBuf,

    #[arg(long, value_name = "CHAR", default_value_t = DEFAULT_DELIMITER, help = "Field separator")]
    pub delimiter: char,

    /// Comma-separated column names in field order
    #[arg(
        long,
        value_name = "NAMES",
        help = "Column layout, e.g. 'id,date,product_id,quantity,price' ('-' skips a field)"
    )]
    pub columns: Option<ColumnLayout>,

    #[arg(
        long = "expected-fields",
        value_name = "COUNT",
        help = "Exact field count per line (default: layout width)"
    )]
    pub expected_fields: Option<usize>,

    #[arg(long = "no-header", help = "Treat the first line as data")]
    pub no_header: bool,

    #[arg(
        long = "date-format",
        value_name = "FORMAT",
        help = "chrono date format, repeatable, tried in order (default: %Y-%m-%d)"
    )]
    pub date_formats: Vec<String>,

    #[arg(long, help = "Keep only this region")]
    pub region: Option<String>,

    #[arg(long, help = "Keep only this category")]
    pub category: Option<String>,

    #[arg(long, help = "Keep only this store")]
    pub store: Option<String>,

    #[arg(long, value_name = "DATE", help = "Keep records on or after this date")]
    pub from: Option<NaiveDate>,

    #[arg(long, value_name = "DATE", help = "Keep records on or before this date")]
    pub to: Option<NaiveDate>,

    #[arg(long = "min-amount", value_name = "AMOUNT", help = "Minimum line total")]
    pub min_amount: Option<Decimal>,

    #[arg(long = "max-amount", value_name = "AMOUNT", help = "Maximum line total")]
    pub max_amount: Option<Decimal>,

    #[arg(long, help = "Ask for region and amount filters on stdin")]
    pub interactive: bool,

    #[arg(long = "top-n", value_name = "N", default_value_t = DEFAULT_TOP_N)]
    pub top_n: usize,

    #[arg(
        long = "low-performer-threshold",
        value_name = "QUANTITY",
        default_value_t = DEFAULT_LOW_PERFORMER_THRESHOLD,
        help = "Products selling fewer units than this are flagged"
    )]
    pub low_performer_threshold: u64,

    #[arg(long = "catalog-url", value_name = "URL", help = "Products endpoint")]
    pub catalog_url: Option<String>,

    #[arg(
        long = "catalog-file",
        value_name = "PATH",
        conflicts_with = "offline",
        help = "Read product metadata from a saved JSON response"
    )]
    pub catalog_file: Option<PathBuf>,

    #[arg(
        long = "catalog-timeout",
        value_name = "SECONDS",
        default_value_t = 10,
        help = "HTTP timeout for the products endpoint"
    )]
    pub catalog_timeout: u64,

    #[arg(long, help = "Skip product enrichment")]
    pub offline: bool,

    #[arg(long, value_name = "PATH", default_value = "output/sales_report.txt")]
    pub report: PathBuf,

    #[arg(
        long = "enriched-output",
        value_name = "PATH",
        default_value = "data/enriched_sales_data.txt"
    )]
    pub enriched_output: PathBuf,

    #[arg(long = "summary-json", value_name = "PATH", help = "Also write the summary as JSON")]
    pub summary_json: Option<PathBuf>,

    #[arg(
        long = "as-of",
        value_name = "DATE",
        help = "Reference date for rejecting future transactions (default: today)"
    )]
    pub as_of: Option<NaiveDate>,

    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: LogLevel,
}

/// Verbosity of the stderr log
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl CliArgs {
    /// Build the parser configuration
    ///
    /// Without `--columns` the default sales export layout is used. The field
    /// count follows the layout width unless `--expected-fields` overrides it.
    /// The result is not validated here; the pipeline does that.
    pub fn to_parser_config(&self) -> ParserConfig {
        let layout = self.columns.clone().unwrap_or_default();
        let mut config = ParserConfig::new(self.delimiter, layout).with_header(!self.no_header);

        if let Some(expected) = self.expected_fields {
            config = config.with_expected_fields(expected);
        }
        if !self.date_formats.is_empty() {
            config = config.with_date_formats(self.date_formats.clone());
        }

        config
    }

    pub fn to_analytics_config(&self) -> AnalyticsConfig {
        AnalyticsConfig {
            top_n: self.top_n,
            low_performer_threshold: self.low_performer_threshold,
        }
    }

    pub fn to_catalog_config(&self) -> CatalogConfig {
        let default = CatalogConfig::default();
        CatalogConfig {
            base_url: self.catalog_url.clone().unwrap_or(default.base_url),
            timeout: Duration::from_secs(self.catalog_timeout),
            ..default
        }
    }

    pub fn catalog_source(&self) -> CatalogSource {
        match (&self.catalog_file, self.offline) {
            (_, true) => CatalogSource::Offline,
            (Some(path), false) => CatalogSource::File(path.clone()),
            (None, false) => CatalogSource::Http,
        }
    }

    /// Filters given on the command line, in a fixed order
    pub fn to_filter_set(&self) -> FilterSet {
        let mut filters = FilterSet::new();

        if self.from.is_some() || self.to.is_some() {
            filters.push(Predicate::DateRange {
                from: self.from,
                to: self.to,
            });
        }
        if let Some(category) = &self.category {
            filters.push(Predicate::Category(category.clone()));
        }
        if let Some(region) = &self.region {
            filters.push(Predicate::Region(region.clone()));
        }
        if let Some(store) = &self.store {
            filters.push(Predicate::Store(store.clone()));
        }
        if let Some(min) = self.min_amount {
            filters.push(Predicate::MinAmount(min));
        }
        if let Some(max) = self.max_amount {
            filters.push(Predicate::MaxAmount(max));
        }

        filters
    }
}
