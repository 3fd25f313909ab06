//! Catalog fetched from the remote products endpoint

use super::{parse_catalog, MetadataSource};
use crate::config::CatalogConfig;
use crate::types::{ProductCatalog, SalesError};
use tracing::debug;

/// Blocking HTTP client for the products endpoint
///
/// One request per fetch, `GET {base_url}?limit={limit}`, bounded by the
/// configured timeout. There is no retry.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    config: CatalogConfig,
}

impl HttpCatalog {
    pub fn new(config: CatalogConfig) -> Self {
        HttpCatalog { config }
    }

    pub fn url(&self) -> String {
        format!("{}?limit={}", self.config.base_url, self.config.limit)
    }
}

impl MetadataSource for HttpCatalog {
    fn fetch(&self) -> Result<ProductCatalog, SalesError> {
        let url = self.url();
        debug!("Requesting product catalog from {}", url);

        let client = reqwest::blocking::Client::builder()
            .timeout(self.config.timeout)
            .build()?;
        let body = client.get(&url).send()?.error_for_status()?.text()?;

        parse_catalog(&body, &self.config.key_prefix)
    }

    fn describe(&self) -> String {
        self.config.base_url.clone()
    }
}
