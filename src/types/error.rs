//! Error types for the sales analytics engine
//!
//! Errors fall into two groups:
//!
//! - **Data errors** ([`ParseFailure`], [`ValidationFailure`]): a single line or
//!   record is bad. These are collected and reported, never fatal to a batch.
//! - **Fatal errors** ([`ConfigError`], [`SalesError`]): the caller handed the
//!   engine an unusable configuration, or an input/output step failed.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Reason a raw line could not be turned into a record
///
/// Every variant is recoverable: the line is reported and the batch goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    /// Line is empty or whitespace only
    ///
    /// Counted separately from failures by the pipeline.
    #[error("empty line")]
    EmptyLine,

    /// Line does not split into the configured number of fields
    #[error("wrong field count: expected {expected}, found {found}")]
    WrongFieldCount {
        /// Number of fields the configuration expects
        expected: usize,
        /// Number of fields actually present on the line
        found: usize,
    },

    /// Quantity is not an integer
    #[error("non-numeric quantity '{value}'")]
    NonNumericQuantity {
        /// The raw quantity field
        value: String,
    },

    /// Unit price is not a decimal number
    #[error("non-numeric unit price '{value}'")]
    NonNumericPrice {
        /// The raw price field
        value: String,
    },

    /// Quantity parsed but is below zero
    #[error("negative quantity '{value}'")]
    NegativeQuantity {
        /// The raw quantity field
        value: String,
    },

    /// Unit price parsed but is below zero
    #[error("negative unit price '{value}'")]
    NegativePrice {
        /// The raw price field
        value: String,
    },

    /// Date matches none of the configured formats
    #[error("unparseable date '{value}'")]
    UnparseableDate {
        /// The raw date field
        value: String,
    },

    /// Quantity times unit price exceeds the accepted line total
    #[error("line total of {quantity} x {unit_price} is out of range")]
    AmountOutOfRange {
        /// Parsed quantity
        quantity: u32,
        /// Parsed unit price, as text
        unit_price: String,
    },
}

impl ParseFailure {
    /// Stable snake_case reason code
    pub fn code(&self) -> &'static str {
        match self {
            ParseFailure::EmptyLine => "empty_line",
            ParseFailure::WrongFieldCount { .. } => "wrong_field_count",
            ParseFailure::NonNumericQuantity { .. } => "non_numeric_quantity",
            ParseFailure::NonNumericPrice { .. } => "non_numeric_price",
            ParseFailure::NegativeQuantity { .. } => "negative_quantity",
            ParseFailure::NegativePrice { .. } => "negative_price",
            ParseFailure::UnparseableDate { .. } => "unparseable_date",
            ParseFailure::AmountOutOfRange { .. } => "amount_out_of_range",
        }
    }

    pub fn wrong_field_count(expected: usize, found: usize) -> Self {
        ParseFailure::WrongFieldCount { expected, found }
    }

    pub fn non_numeric_quantity(value: &str) -> Self {
        ParseFailure::NonNumericQuantity {
            value: value.to_string(),
        }
    }

    pub fn non_numeric_price(value: &str) -> Self {
        ParseFailure::NonNumericPrice {
            value: value.to_string(),
        }
    }

    pub fn negative_quantity(value: &str) -> Self {
        ParseFailure::NegativeQuantity {
            value: value.to_string(),
        }
    }

    pub fn negative_price(value: &str) -> Self {
        ParseFailure::NegativePrice {
            value: value.to_string(),
        }
    }

    pub fn unparseable_date(value: &str) -> Self {
        ParseFailure::UnparseableDate {
            value: value.to_string(),
        }
    }

    pub fn amount_out_of_range(quantity: u32, unit_price: Decimal) -> Self {
        ParseFailure::AmountOutOfRange {
            quantity,
            unit_price: unit_price.to_string(),
        }
    }
}

/// Business rule a well-formed record violated
///
/// Variants are listed in the order the validator checks them. All are
/// recoverable: the record is rejected and the batch goes on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationFailure {
    /// Quantity is zero
    #[error("quantity must be greater than zero")]
    NonPositiveQuantity,

    /// Unit price is below zero
    #[error("unit price must not be negative")]
    NegativePrice,

    /// Sale date is after the run's reference date
    #[error("date {date} is after {as_of}")]
    FutureDate {
        /// Date on the record
        date: NaiveDate,
        /// Reference date of the run
        as_of: NaiveDate,
    },

    /// Product id is blank
    #[error("product id is empty")]
    EmptyProductId,

    /// Transaction id was already accepted earlier in the batch
    #[error("transaction id '{transaction_id}' already seen in this batch")]
    DuplicateId {
        /// The repeated id
        transaction_id: String,
    },
}

impl ValidationFailure {
    /// Stable snake_case reason code
    pub fn code(&self) -> &'static str {
        match self {
            ValidationFailure::NonPositiveQuantity => "non_positive_quantity",
            ValidationFailure::NegativePrice => "negative_price",
            ValidationFailure::FutureDate { .. } => "future_date",
            ValidationFailure::EmptyProductId => "empty_product_id",
            ValidationFailure::DuplicateId { .. } => "duplicate_id",
        }
    }
}

/// Caller contract violation in the engine configuration
///
/// Unlike data errors these stop the run before any line is read. Every
/// variant is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Expected field count is zero
    #[error("expected field count must be greater than zero")]
    ZeroFieldCount,

    /// A column index does not fit in the expected field count
    #[error("column '{column}' is at index {index} but lines only have {expected} fields")]
    ColumnOutOfRange {
        /// Column name
        column: &'static str,
        /// Zero-based index the layout assigns it
        index: usize,
        /// Configured field count
        expected: usize,
    },

    /// A required column is absent from a named layout
    #[error("required column '{column}' is missing from the layout")]
    MissingColumn {
        /// Column name
        column: &'static str,
    },

    /// A column name appears twice in a named layout
    #[error("column '{column}' appears more than once in the layout")]
    DuplicateColumn {
        /// Column name
        column: String,
    },

    /// A named layout contains a name that is not a known column
    #[error("unknown column name '{column}'")]
    UnknownColumn {
        /// The unrecognized name
        column: String,
    },

    /// Delimiter is a character that cannot separate fields
    #[error("invalid delimiter {delimiter:?}")]
    InvalidDelimiter {
        /// The rejected delimiter
        delimiter: char,
    },

    /// No date format was configured
    #[error("at least one date format is required")]
    NoDateFormats,

    /// Ranking size is zero
    #[error("top-N must be greater than zero")]
    ZeroTopN,

    /// Date filter starts after it ends
    #[error("date range is inverted: {from} is after {to}")]
    InvertedDateRange {
        /// Start of the range
        from: NaiveDate,
        /// End of the range
        to: NaiveDate,
    },

    /// Amount filter minimum is above its maximum
    #[error("amount range is inverted: {min} is greater than {max}")]
    InvertedAmountRange {
        /// Minimum amount, as text
        min: String,
        /// Maximum amount, as text
        max: String,
    },
}

/// Fatal error for a whole run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SalesError {
    /// Input file does not exist
    ///
    /// Fatal: nothing can be processed.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The missing path
        path: String,
    },

    /// Reading input or writing an output failed
    ///
    /// Fatal.
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Configuration rejected before the run started
    ///
    /// Fatal.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Product catalog could not be fetched or decoded
    ///
    /// Recoverable: the runner logs it and continues with an empty catalog.
    #[error("Catalog error: {message}")]
    Catalog {
        /// Description of the failure
        message: String,
    },

    /// Writing the enriched data file failed
    ///
    /// Fatal.
    #[error("CSV write error: {message}")]
    CsvError {
        /// Description of the CSV error
        message: String,
    },

    /// Encoding or decoding JSON failed
    ///
    /// Fatal when writing the summary, recoverable when decoding a catalog.
    #[error("JSON error: {message}")]
    JsonError {
        /// Description of the JSON error
        message: String,
    },
}

impl From<std::io::Error> for SalesError {
    fn from(error: std::io::Error) -> Self {
        SalesError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for SalesError {
    fn from(error: csv::Error) -> Self {
        SalesError::CsvError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for SalesError {
    fn from(error: serde_json::Error) -> Self {
        SalesError::JsonError {
            message: error.to_string(),
        }
    }
}

impl From<reqwest::Error> for SalesError {
    fn from(error: reqwest::Error) -> Self {
        SalesError::Catalog {
            message: error.to_string(),
        }
    }
}

impl SalesError {
    pub fn file_not_found(path: &std::path::Path) -> Self {
        SalesError::FileNotFound {
            path: path.display().to_string(),
        }
    }

    pub fn catalog(message: impl Into<String>) -> Self {
        SalesError::Catalog {
            message: message.into(),
        }
    }
}
