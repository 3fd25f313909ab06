//! Product catalog lookup
//!
//! A `ProductCatalog` is the plain mapping the enrichment merger joins against.
//! It knows nothing about where the metadata came from; see `crate::catalog`
//! for the sources that build one.

use super::transaction::ProductMetadata;
use std::collections::HashMap;

/// Mapping from product id to catalog metadata
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductCatalog {
    entries: HashMap<String, ProductMetadata>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the metadata for a product id
    pub fn insert(&mut self, product_id: impl Into<String>, metadata: ProductMetadata) {
        self.entries.insert(product_id.into(), metadata);
    }

    /// Exact-key lookup
    pub fn get(&self, product_id: &str) -> Option<&ProductMetadata> {
        self.entries.get(product_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ProductMetadata)> for ProductCatalog {
    fn from_iter<I: IntoIterator<Item = (String, ProductMetadata)>>(iter: I) -> Self {
        ProductCatalog {
            entries: iter.into_iter().collect(),
        }
    }
}
