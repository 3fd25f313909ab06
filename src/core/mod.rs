//! Core business logic module
//!
//! This module contains the sales processing components, leaves first:
//! - `parser` - Raw text lines to transaction records
//! - `validator` - Business rules and per-run duplicate detection
//! - `filter` - Optional predicates producing the working subset
//! - `analytics` - Aggregate and per-dimension statistics
//! - `enrichment` - Catalog metadata join and coverage
//! - `pipeline` - One-run orchestration of the above
//!
//! Nothing in here performs file or network I/O.

pub mod analytics;
pub mod enrichment;
pub mod filter;
pub mod parser;
pub mod pipeline;
pub mod validator;

pub use analytics::{AnalyticsEngine, AnalyticsSummary};
pub use enrichment::{merge, EnrichedBatch, EnrichmentCoverage};
pub use filter::{FilterOptions, FilterSet, Predicate};
pub use parser::RecordParser;
pub use pipeline::{IngestReport, PipelineOutput, SalesPipeline};
pub use validator::Validator;
