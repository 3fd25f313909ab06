//! Enrichment merger
//!
//! Joins catalog metadata onto records by exact product id. The merge is a
//! pure function of its two inputs: it copies each record, sets `enrichment`
//! when the catalog has the product, and reports how many records it could
//! enrich. A product missing from the catalog is a coverage gap, not an error.

use crate::types::{ProductCatalog, TransactionRecord};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::info;

/// How much of a record set the catalog could enrich
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnrichmentCoverage {
    pub enriched: usize,
    pub total: usize,
    /// Product ids with no catalog entry, ascending
    pub unmatched_products: Vec<String>,
}

impl EnrichmentCoverage {
    /// Enriched share in percent, `None` for an empty record set
    pub fn percentage(&self) -> Option<Decimal> {
        if self.total == 0 {
            None
        } else {
            Some(Decimal::from(self.enriched) * Decimal::ONE_HUNDRED / Decimal::from(self.total))
        }
    }

    pub fn gaps(&self) -> usize {
        self.total - self.enriched
    }
}

/// Enriched copies of the input records plus coverage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnrichedBatch {
    pub records: Vec<TransactionRecord>,
    pub coverage: EnrichmentCoverage,
}

/// Attach catalog metadata to copies of `records`
///
/// Input order is preserved. Records whose product id is absent from the
/// catalog come back unchanged apart from `enrichment` being `None`.
pub fn merge<'a, I>(records: I, catalog: &ProductCatalog) -> EnrichedBatch
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut unmatched = BTreeSet::new();
    let mut enriched_count = 0;

    let records: Vec<TransactionRecord> = records
        .into_iter()
        .map(|record| {
            let enrichment = catalog.get(&record.product_id).cloned();
            match enrichment {
                Some(_) => enriched_count += 1,
                None => {
                    unmatched.insert(record.product_id.clone());
                }
            }
            TransactionRecord {
                enrichment,
                ..record.clone()
            }
        })
        .collect();

    let coverage = EnrichmentCoverage {
        enriched: enriched_count,
        total: records.len(),
        unmatched_products: unmatched.into_iter().collect(),
    };

    info!(
        "Enriched {}/{} records, {} products without catalog data",
        coverage.enriched,
        coverage.total,
        coverage.unmatched_products.len()
    );

    EnrichedBatch { records, coverage }
}
