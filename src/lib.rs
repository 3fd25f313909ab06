//! Sales Analytics Library
//! # Overview
//!
//! This library turns a delimited sales transaction export into validated
//! records, filtered working subsets, aggregate analytics, and catalog-enriched
//! output.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (records, catalog, failures, errors)
//! - [`config`] - Parser, analytics and catalog settings
//! - [`core`] - Business logic components, all free of I/O:
//!   - [`core::parser`] - Lines to typed records
//!   - [`core::validator`] - Business rules and duplicate detection
//!   - [`core::filter`] - Composable record predicates
//!   - [`core::analytics`] - Revenue, rankings, trends and customers
//!   - [`core::enrichment`] - Catalog join and coverage
//!   - [`core::pipeline`] - One run of the above
//! - [`catalog`] - Product metadata sources (HTTP, file, offline)
//! - [`io`] - Sales file reading, enriched data and report writing
//! - [`cli`] - CLI arguments parsing and the interactive prompt
//! - [`runner`] - End-to-end orchestration used by the binary
//!
//! # Record Lifecycle
//!
//! Every non-blank data line ends up in exactly one place:
//!
//! - **Parse failure**: the line could not be split or converted
//! - **Validation failure**: the record broke a business rule
//! - **Valid**: the record is eligible for filtering and analytics
//!
//! Monetary values use `rust_decimal::Decimal` throughout; a record's total is
//! always `quantity * unit_price`, computed on demand.

pub mod catalog;
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod runner;
pub mod types;

pub use config::{AnalyticsConfig, CatalogConfig, ColumnLayout, ParserConfig};
pub use core::{AnalyticsSummary, FilterSet, Predicate, SalesPipeline};
pub use types::{
    ConfigError, ParseFailure, ProductCatalog, ProductMetadata, SalesError, TransactionRecord,
    ValidationFailure,
};
