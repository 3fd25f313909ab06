//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `transaction`: Sales records, product metadata, and validation outcomes
//! - `catalog`: The product-key to metadata lookup consumed by enrichment
//! - `error`: Data failures, configuration errors, and fatal run errors

pub mod catalog;
pub mod error;
pub mod transaction;

pub use catalog::ProductCatalog;
pub use error::{ConfigError, ParseFailure, SalesError, ValidationFailure};
pub use transaction::{
    LineNumber, ProductMetadata, TransactionRecord, ValidationOutcome, Verdict,
};
