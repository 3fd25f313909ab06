//! Engine configuration
//!
//! Every tunable the engine needs arrives as one of these typed values, already
//! parsed by the CLI layer. Each struct has a `Default` matching the classic
//! pipe-delimited sales export and a `validate` method that rejects settings
//! the engine cannot honour.

use crate::types::ConfigError;
use std::str::FromStr;
use std::time::Duration;

/// Default delimiter of the sales export
pub const DEFAULT_DELIMITER: char = '|';

/// Default date format (ISO 8601 calendar date)
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Default number of products in each top-N ranking
pub const DEFAULT_TOP_N: usize = 5;

/// Products selling fewer units than this are flagged as low performers
pub const DEFAULT_LOW_PERFORMER_THRESHOLD: u64 = 10;

/// Field positions of each attribute on a raw line
///
/// Required attributes hold a plain index; optional ones are `None` when the
/// source has no such column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub transaction_id: usize,
    pub date: usize,
    pub product_id: usize,
    pub quantity: usize,
    pub unit_price: usize,
    pub product_name: Option<usize>,
    pub category: Option<usize>,
    /// Source-supplied line total, used only as a cross-check
    pub total: Option<usize>,
    pub customer_id: Option<usize>,
    pub store_id: Option<usize>,
    pub region: Option<usize>,
}

impl ColumnLayout {
    /// Five-column layout: `transaction_id,date,product_id,quantity,unit_price`
    pub fn minimal() -> Self {
        ColumnLayout {
            transaction_id: 0,
            date: 1,
            product_id: 2,
            quantity: 3,
            unit_price: 4,
            product_name: None,
            category: None,
            total: None,
            customer_id: None,
            store_id: None,
            region: None,
        }
    }

    /// All mapped columns as `(name, index)` pairs
    pub fn columns(&self) -> Vec<(&'static str, usize)> {
        let mut columns = vec![
            ("transaction_id", self.transaction_id),
            ("date", self.date),
            ("product_id", self.product_id),
            ("quantity", self.quantity),
            ("unit_price", self.unit_price),
        ];
        let optional = [
            ("product_name", self.product_name),
            ("category", self.category),
            ("total", self.total),
            ("customer_id", self.customer_id),
            ("store_id", self.store_id),
            ("region", self.region),
        ];
        columns.extend(
            optional
                .into_iter()
                .filter_map(|(name, index)| index.map(|i| (name, i))),
        );
        columns
    }

    /// Minimum number of fields a line needs to cover every mapped column
    pub fn width(&self) -> usize {
        self.columns()
            .iter()
            .map(|(_, index)| index + 1)
            .max()
            .unwrap_or(0)
    }
}

impl Default for ColumnLayout {
    /// `TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region`
    fn default() -> Self {
        ColumnLayout {
            transaction_id: 0,
            date: 1,
            product_id: 2,
            product_name: Some(3),
            quantity: 4,
            unit_price: 5,
            customer_id: Some(6),
            region: Some(7),
            category: None,
            total: None,
            store_id: None,
        }
    }
}

impl FromStr for ColumnLayout {
    type Err = ConfigError;

    /// Parse a comma-separated list of column names in field order
    ///
    /// `-` (or an empty name) marks a field that is present but ignored.
    fn from_str(names: &str) -> Result<Self, Self::Err> {
        let mut slots: [Option<usize>; 11] = [None; 11];
        const NAMES: [&str; 11] = [
            "transaction_id",
            "date",
            "product_id",
            "quantity",
            "unit_price",
            "product_name",
            "category",
            "total",
            "customer_id",
            "store_id",
            "region",
        ];

        for (index, raw) in names.split(',').enumerate() {
            let name = raw.trim().to_ascii_lowercase();
            let slot = match name.as_str() {
                "" | "-" => continue,
                "transaction_id" | "id" => 0,
                "date" => 1,
                "product_id" => 2,
                "quantity" | "qty" => 3,
                "unit_price" | "price" => 4,
                "product_name" => 5,
                "category" => 6,
                "total" | "total_amount" => 7,
                "customer_id" => 8,
                "store_id" | "store" => 9,
                "region" => 10,
                _ => return Err(ConfigError::UnknownColumn { column: name }),
            };
            if slots[slot].replace(index).is_some() {
                return Err(ConfigError::DuplicateColumn {
                    column: NAMES[slot].to_string(),
                });
            }
        }

        let required = |slot: usize| {
            slots[slot].ok_or(ConfigError::MissingColumn {
                column: NAMES[slot],
            })
        };

        Ok(ColumnLayout {
            transaction_id: required(0)?,
            date: required(1)?,
            product_id: required(2)?,
            quantity: required(3)?,
            unit_price: required(4)?,
            product_name: slots[5],
            category: slots[6],
            total: slots[7],
            customer_id: slots[8],
            store_id: slots[9],
            region: slots[10],
        })
    }
}

/// Record parser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Field separator
    pub delimiter: char,

    /// Exact number of fields every data line must have
    pub expected_fields: usize,

    /// Whether the first line is a header to skip
    pub has_header: bool,

    /// Where each attribute lives on a line
    pub layout: ColumnLayout,

    /// `chrono` format strings tried in order when parsing dates
    pub date_formats: Vec<String>,
}

impl ParserConfig {
    /// Create a header-less config whose field count matches the layout width
    pub fn new(delimiter: char, layout: ColumnLayout) -> Self {
        ParserConfig {
            delimiter,
            expected_fields: layout.width(),
            has_header: false,
            layout,
            date_formats: vec![DEFAULT_DATE_FORMAT.to_string()],
        }
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_expected_fields(mut self, expected_fields: usize) -> Self {
        self.expected_fields = expected_fields;
        self
    }

    pub fn with_date_formats(mut self, formats: Vec<String>) -> Self {
        self.date_formats = formats;
        self
    }

    /// Check the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if:
    /// - The expected field count is zero
    /// - A mapped column lies beyond the expected field count
    /// - The delimiter would collide with line breaks, dates, or decimals
    /// - No date format is configured
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_fields == 0 {
            return Err(ConfigError::ZeroFieldCount);
        }

        if let Some((column, index)) = self
            .layout
            .columns()
            .into_iter()
            .find(|(_, index)| *index >= self.expected_fields)
        {
            return Err(ConfigError::ColumnOutOfRange {
                column,
                index,
                expected: self.expected_fields,
            });
        }

        if matches!(self.delimiter, '\n' | '\r' | '.' | '-') || self.delimiter.is_ascii_digit() {
            return Err(ConfigError::InvalidDelimiter {
                delimiter: self.delimiter,
            });
        }

        if self.date_formats.is_empty() {
            return Err(ConfigError::NoDateFormats);
        }

        Ok(())
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig::new(DEFAULT_DELIMITER, ColumnLayout::default()).with_header(true)
    }
}

/// Analytics engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsConfig {
    /// Length of the top-products rankings
    pub top_n: usize,

    /// Total quantity below which a product counts as low performing
    pub low_performer_threshold: u64,
}

impl AnalyticsConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        Ok(())
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        AnalyticsConfig {
            top_n: DEFAULT_TOP_N,
            low_performer_threshold: DEFAULT_LOW_PERFORMER_THRESHOLD,
        }
    }
}

/// Remote product catalog settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConfig {
    /// Products endpoint
    pub base_url: String,

    /// Page size requested from the endpoint
    pub limit: usize,

    pub timeout: Duration,

    /// Prefix turning a numeric catalog id into a sales product id (`101` -> `P101`)
    pub key_prefix: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            base_url: "https://dummyjson.com/products".to_string(),
            limit: 100,
            timeout: Duration::from_secs(10),
            key_prefix: "P".to_string(),
        }
    }
}
