//! Catalog loaded from a saved products response

use super::{parse_catalog, MetadataSource};
use crate::types::{ProductCatalog, SalesError};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

/// Products JSON read from disk
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
    key_prefix: String,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>, key_prefix: impl Into<String>) -> Self {
        FileCatalog {
            path: path.into(),
            key_prefix: key_prefix.into(),
        }
    }
}

impl MetadataSource for FileCatalog {
    fn fetch(&self) -> Result<ProductCatalog, SalesError> {
        let body = fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SalesError::file_not_found(&self.path),
            _ => SalesError::catalog(format!("Failed to read '{}': {}", self.path.display(), e)),
        })?;
        parse_catalog(&body, &self.key_prefix)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_reads_products_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"products":[{{"id":7,"title":"Desk Lamp","category":"home-decoration","brand":"Lumen","rating":4.1}}]}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let catalog = FileCatalog::new(file.path(), "SKU-").fetch().unwrap();
        assert_eq!(
            catalog.get("SKU-7").and_then(|m| m.title.as_deref()),
            Some("Desk Lamp")
        );
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = FileCatalog::new("no_such_catalog.json", "P").fetch();
        assert!(matches!(result, Err(SalesError::FileNotFound { .. })));
    }
}
