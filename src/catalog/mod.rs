//! Product metadata sources
//!
//! The enrichment merger only needs a [`ProductCatalog`]. This module defines
//! where one comes from, behind the [`MetadataSource`] trait, so the runner can
//! pick a source at startup:
//!
//! - [`HttpCatalog`] - the remote products endpoint (blocking `reqwest`)
//! - [`FileCatalog`] - a saved copy of the same JSON response
//! - [`OfflineCatalog`] - no metadata at all
//!
//! All sources understand the products response shape:
//!
//! ```json
//! {"products": [{"id": 1, "title": "...", "category": "...", "brand": "...", "rating": 4.9}]}
//! ```
//!
//! Numeric ids become sales product ids by prepending the configured prefix,
//! so with prefix `P` the catalog entry `101` enriches product `P101`.

use crate::config::CatalogConfig;
use crate::types::{ProductCatalog, ProductMetadata, SalesError};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{info, warn};

pub mod file;
pub mod http;

pub use file::FileCatalog;
pub use http::HttpCatalog;

/// A place product metadata can be loaded from
pub trait MetadataSource {
    /// Load the full catalog
    ///
    /// # Errors
    ///
    /// Returns `SalesError::Catalog` when the source cannot be reached, or
    /// `SalesError::JsonError` when its response is not the products shape.
    fn fetch(&self) -> Result<ProductCatalog, SalesError>;

    /// Human-readable origin, used in log lines
    fn describe(&self) -> String;
}

/// Source that never has metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineCatalog;

impl MetadataSource for OfflineCatalog {
    fn fetch(&self) -> Result<ProductCatalog, SalesError> {
        Ok(ProductCatalog::new())
    }

    fn describe(&self) -> String {
        "offline".to_string()
    }
}

/// Which metadata source a run uses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    Http,
    File(PathBuf),
    Offline,
}

/// Create the metadata source for a run
///
/// # Arguments
///
/// * `source` - Which kind of source to build
/// * `config` - Endpoint, timeout and id prefix settings
pub fn create_source(source: CatalogSource, config: CatalogConfig) -> Box<dyn MetadataSource> {
    match source {
        CatalogSource::Http => Box::new(HttpCatalog::new(config)),
        CatalogSource::File(path) => Box::new(FileCatalog::new(path, config.key_prefix)),
        CatalogSource::Offline => Box::new(OfflineCatalog),
    }
}

/// Fetch from `source`, degrading to an empty catalog on failure
///
/// Enrichment is optional: a run without metadata still produces every
/// analytics result, just with zero coverage.
pub fn fetch_or_empty(source: &dyn MetadataSource) -> ProductCatalog {
    match source.fetch() {
        Ok(catalog) => {
            info!("Loaded {} products from {}", catalog.len(), source.describe());
            catalog
        }
        Err(e) => {
            warn!(
                "Product catalog unavailable from {}: {}; continuing without enrichment",
                source.describe(),
                e
            );
            ProductCatalog::new()
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<CatalogProduct>,
}

#[derive(Debug, Deserialize)]
struct CatalogProduct {
    id: u64,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    rating: Option<f64>,
}

/// Build a catalog from a products response body
///
/// Fields other than title, category, brand and rating are ignored. A later
/// entry with the same id replaces an earlier one.
pub fn parse_catalog(body: &str, key_prefix: &str) -> Result<ProductCatalog, SalesError> {
    let response: ProductsResponse = serde_json::from_str(body)?;
    Ok(response
        .products
        .into_iter()
        .map(|product| {
            (
                format!("{}{}", key_prefix, product.id),
                ProductMetadata {
                    title: product.title,
                    category: product.category,
                    brand: product.brand,
                    rating: product.rating,
                },
            )
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"{
        "products": [
            {"id": 1, "title": "Essence Mascara Lash Princess", "category": "beauty",
             "brand": "Essence", "price": 9.99, "rating": 4.94, "stock": 5},
            {"id": 101, "title": "Apple AirPods Max Silver", "category": "mobile-accessories",
             "price": 549.99, "rating": 3.47}
        ],
        "total": 194, "skip": 0, "limit": 2
    }"#;

    struct FailingSource;

    impl MetadataSource for FailingSource {
        fn fetch(&self) -> Result<ProductCatalog, SalesError> {
            Err(SalesError::catalog("connection refused"))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    #[test]
    fn test_parse_catalog_prefixes_ids() {
        let catalog = parse_catalog(BODY, "P").unwrap();

        assert_eq!(catalog.len(), 2);
        let mascara = catalog.get("P1").unwrap();
        assert_eq!(mascara.brand.as_deref(), Some("Essence"));
        assert_eq!(mascara.rating, Some(4.94));
        assert!(catalog.get("1").is_none());
    }

    #[test]
    fn test_missing_brand_is_none() {
        let catalog = parse_catalog(BODY, "P").unwrap();
        let airpods = catalog.get("P101").unwrap();
        assert_eq!(airpods.brand, None);
        assert_eq!(airpods.category.as_deref(), Some("mobile-accessories"));
    }

    #[test]
    fn test_parse_catalog_rejects_other_shapes() {
        let result = parse_catalog(r#"{"items": []}"#, "P");
        assert!(matches!(result, Err(SalesError::JsonError { .. })));
    }

    #[test]
    fn test_failing_source_degrades_to_empty_catalog() {
        assert!(fetch_or_empty(&FailingSource).is_empty());
    }

    #[test]
    fn test_offline_source_is_empty() {
        let source = create_source(CatalogSource::Offline, CatalogConfig::default());
        assert!(fetch_or_empty(source.as_ref()).is_empty());
        assert_eq!(source.describe(), "offline");
    }
}
