//! Enriched data output format
//!
//! Serializes enriched records back to the pipe-delimited layout of the
//! sales export, with the catalog columns appended:
//!
//! ```text
//! TransactionID|Date|ProductID|ProductName|Quantity|UnitPrice|CustomerID|Region|API_Category|API_Brand|API_Rating|API_Match
//! ```
//!
//! Absent values are written as empty fields.

use crate::types::{SalesError, TransactionRecord};
use csv::WriterBuilder;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Column headers of the enriched output
pub const ENRICHED_HEADERS: [&str; 12] = [
    "TransactionID",
    "Date",
    "ProductID",
    "ProductName",
    "Quantity",
    "UnitPrice",
    "CustomerID",
    "Region",
    "API_Category",
    "API_Brand",
    "API_Rating",
    "API_Match",
];

/// Convert one record into output fields, in `ENRICHED_HEADERS` order
pub fn enriched_row(record: &TransactionRecord) -> [String; 12] {
    let metadata = record.enrichment.as_ref();
    [
        record.transaction_id.clone(),
        record.date.format("%Y-%m-%d").to_string(),
        record.product_id.clone(),
        record.product_name.clone(),
        record.quantity.to_string(),
        record.unit_price.to_string(),
        record.customer_id.clone().unwrap_or_default(),
        record.region.clone().unwrap_or_default(),
        metadata
            .and_then(|m| m.category.clone())
            .unwrap_or_default(),
        metadata.and_then(|m| m.brand.clone()).unwrap_or_default(),
        metadata
            .and_then(|m| m.rating)
            .map(|r| r.to_string())
            .unwrap_or_default(),
        record.is_enriched().to_string(),
    ]
}

/// Write enriched records with a header row
///
/// # Arguments
///
/// * `records` - Records to write, in output order
/// * `output` - Destination writer
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(SalesError)` if a write error occurred
pub fn write_enriched_records(
    records: &[TransactionRecord],
    output: &mut dyn Write,
) -> Result<(), SalesError> {
    let mut writer = WriterBuilder::new().delimiter(b'|').from_writer(output);

    writer.write_record(ENRICHED_HEADERS)?;
    for record in records {
        writer.write_record(enriched_row(record))?;
    }

    writer.flush()?;
    Ok(())
}

/// Write enriched records to a file, creating parent directories as needed
pub fn write_enriched_file(records: &[TransactionRecord], path: &Path) -> Result<(), SalesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut file = File::create(path)?;
    write_enriched_records(records, &mut file)
}
