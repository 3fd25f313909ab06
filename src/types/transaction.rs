//! Transaction-related types for the sales analytics engine
//!
//! This module defines the parsed sales record, the product metadata that can
//! be attached to it after enrichment, and the per-record validation outcome.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ValidationFailure;

/// 1-based physical line number in the source text
pub type LineNumber = usize;

/// A single parsed sales transaction
///
/// Optional source columns are modelled as `Option` so the validator and the
/// analytics engine can match on presence explicitly. The monetary total is
/// never stored: it is always derived from quantity and unit price.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    /// Transaction identifier, unique within one batch once validated
    pub transaction_id: String,

    /// Calendar date of the sale
    pub date: NaiveDate,

    /// Product key used for the enrichment join
    pub product_id: String,

    /// Product display name; may be empty until enrichment
    pub product_name: String,

    pub category: Option<String>,

    /// Units sold
    pub quantity: u32,

    /// Price per unit, never negative for parsed records
    pub unit_price: Decimal,

    pub customer_id: Option<String>,
    pub store_id: Option<String>,
    pub region: Option<String>,

    /// Catalog metadata attached by the enrichment merger
    ///
    /// Always `None` for records coming straight out of the parser.
    pub enrichment: Option<ProductMetadata>,
}

impl TransactionRecord {
    /// Create a record with only the mandatory attributes set
    ///
    /// Optional attributes start out empty and can be filled in with the
    /// `with_*` builders.
    pub fn new(
        transaction_id: impl Into<String>,
        date: NaiveDate,
        product_id: impl Into<String>,
        quantity: u32,
        unit_price: Decimal,
    ) -> Self {
        TransactionRecord {
            transaction_id: transaction_id.into(),
            date,
            product_id: product_id.into(),
            product_name: String::new(),
            category: None,
            quantity,
            unit_price,
            customer_id: None,
            store_id: None,
            region: None,
            enrichment: None,
        }
    }

    pub fn with_product_name(mut self, name: impl Into<String>) -> Self {
        self.product_name = name.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_customer(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_store(mut self, store_id: impl Into<String>) -> Self {
        self.store_id = Some(store_id.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Line total, `quantity * unit_price`
    ///
    /// Computed on every call so it can never disagree with the two inputs.
    /// Saturates at `Decimal::MAX`; records from the parser stay far below it.
    pub fn total_amount(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.unit_price)
    }

    /// Whether catalog metadata has been attached to this record
    pub fn is_enriched(&self) -> bool {
        self.enrichment.is_some()
    }
}

/// Product metadata supplied by an external catalog
///
/// The schema is fixed: any field the catalog does not know is `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductMetadata {
    pub title: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub rating: Option<f64>,
}

/// Result of running the validator over one record
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Valid,
    Invalid(ValidationFailure),
}

/// A record paired with the line it came from and its verdict
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub line: LineNumber,
    pub record: TransactionRecord,
    pub verdict: Verdict,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self.verdict, Verdict::Valid)
    }
}
