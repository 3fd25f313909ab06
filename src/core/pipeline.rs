//! Sales pipeline
//!
//! Wires the core components together for one run:
//!
//! ```text
//! lines -> RecordParser -> Validator -> FilterSet -> AnalyticsEngine -> AnalyticsSummary
//!                                           \-> merge(catalog)  -> EnrichedBatch
//! ```
//!
//! The pipeline owns only configuration. Everything that accumulates during a
//! run (the validator's seen ids, the failure lists) is created inside
//! [`SalesPipeline::ingest`] and handed back in the [`IngestReport`], so the
//! same pipeline value can process any number of batches independently.

use crate::config::{AnalyticsConfig, ParserConfig};
use crate::core::analytics::{AnalyticsEngine, AnalyticsSummary};
use crate::core::enrichment::{merge, EnrichedBatch};
use crate::core::filter::FilterSet;
use crate::core::parser::RecordParser;
use crate::core::validator::Validator;
use crate::types::{
    ConfigError, LineNumber, ParseFailure, ProductCatalog, TransactionRecord, ValidationFailure,
    Verdict,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// A line the parser could not turn into a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineFailure {
    pub line: LineNumber,
    pub failure: ParseFailure,
}

/// A parsed record the validator rejected
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRecord {
    pub line: LineNumber,
    pub record: TransactionRecord,
    pub failure: ValidationFailure,
}

/// Parsing and validation results for one batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Records that passed every rule, in input order
    pub valid: Vec<TransactionRecord>,
    pub parse_failures: Vec<LineFailure>,
    pub validation_failures: Vec<RejectedRecord>,
    /// Blank lines skipped; not counted as data lines
    pub blank_lines: usize,
    /// Records whose source total disagreed with the computed total
    pub total_mismatches: usize,
}

impl IngestReport {
    /// Non-blank data lines seen (header excluded)
    pub fn data_lines(&self) -> usize {
        self.valid.len() + self.validation_failures.len() + self.parse_failures.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.validation_failures.len() + self.parse_failures.len()
    }

    /// Failure counts keyed by reason code, parse and validation reasons together
    pub fn failure_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for failure in &self.parse_failures {
            *counts.entry(failure.failure.code()).or_insert(0) += 1;
        }
        for rejected in &self.validation_failures {
            *counts.entry(rejected.failure.code()).or_insert(0) += 1;
        }
        counts
    }
}

/// Everything one full run produces
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
    pub ingest: IngestReport,
    /// Size of the working subset after filtering
    pub working_count: usize,
    pub summary: AnalyticsSummary,
    pub enriched: EnrichedBatch,
}

/// Configured parse/validate/analyze pipeline
#[derive(Debug, Clone)]
pub struct SalesPipeline {
    parser: ParserConfig,
    analytics: AnalyticsEngine,
    as_of: NaiveDate,
}

impl SalesPipeline {
    /// Create a pipeline after checking both configurations
    ///
    /// # Arguments
    ///
    /// * `parser` - Line format settings
    /// * `analytics` - Ranking sizes and thresholds
    /// * `as_of` - Reference date for the future-date rule, usually today
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found in either configuration.
    pub fn new(
        parser: ParserConfig,
        analytics: AnalyticsConfig,
        as_of: NaiveDate,
    ) -> Result<Self, ConfigError> {
        parser.validate()?;
        analytics.validate()?;
        Ok(SalesPipeline {
            parser,
            analytics: AnalyticsEngine::new(analytics),
            as_of,
        })
    }

    pub fn parser_config(&self) -> &ParserConfig {
        &self.parser
    }

    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Parse and validate a batch of lines
    ///
    /// Never fails: every data problem ends up in the returned report.
    pub fn ingest<L, S>(&self, lines: L) -> IngestReport
    where
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parser = RecordParser::from_validated(&self.parser, lines);
        let mut validator = Validator::new(self.as_of);
        let mut report = IngestReport::default();

        for (line, result) in parser.by_ref() {
            match result {
                Ok(record) => {
                    let outcome = validator.validate(line, record);
                    match outcome.verdict {
                        Verdict::Valid => report.valid.push(outcome.record),
                        Verdict::Invalid(failure) => report.validation_failures.push(RejectedRecord {
                            line,
                            record: outcome.record,
                            failure,
                        }),
                    }
                }
                Err(ParseFailure::EmptyLine) => report.blank_lines += 1,
                Err(failure) => {
                    warn!("Line {}: skipped, {}", line, failure);
                    report.parse_failures.push(LineFailure { line, failure });
                }
            }
        }
        report.total_mismatches = parser.total_mismatches();

        info!(
            "Ingested {} data lines: {} valid, {} rejected, {} unparseable",
            report.data_lines(),
            report.valid.len(),
            report.validation_failures.len(),
            report.parse_failures.len()
        );

        report
    }

    /// Summarize a working subset
    pub fn analyze<'a, I>(&self, records: I) -> AnalyticsSummary
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        self.analytics.summarize(records)
    }

    /// Ingest, filter, analyze, and enrich in one call
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the filters are contradictory. Data problems
    /// never cause an error.
    pub fn run<L, S>(
        &self,
        lines: L,
        filters: &FilterSet,
        catalog: &ProductCatalog,
    ) -> Result<PipelineOutput, ConfigError>
    where
        L: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.complete(self.ingest(lines), filters, catalog)
    }

    /// Filter, analyze, and enrich an already ingested batch
    ///
    /// Split out of [`run`](Self::run) so filters can be chosen after looking
    /// at the valid records.
    pub fn complete(
        &self,
        ingest: IngestReport,
        filters: &FilterSet,
        catalog: &ProductCatalog,
    ) -> Result<PipelineOutput, ConfigError> {
        filters.validate()?;

        let working = filters.apply(&ingest.valid);
        if !filters.is_empty() {
            info!(
                "Filters kept {} of {} valid records",
                working.len(),
                ingest.valid.len()
            );
        }

        let summary = self.analyze(working.iter().copied());
        let enriched = merge(working.iter().copied(), catalog);
        let working_count = working.len();

        Ok(PipelineOutput {
            ingest,
            working_count,
            summary,
            enriched,
        })
    }
}
