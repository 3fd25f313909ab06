//! Record parser
//!
//! Turns raw text lines into [`TransactionRecord`]s. The parser is a lazy
//! iterator adapter over any sequence of lines: every data line yields exactly
//! one `(line_number, ParseResult)` pair, and a malformed line is reported as a
//! [`ParseFailure`] without stopping the batch.
//!
//! # Line Format
//!
//! Field positions, delimiter, header handling, and accepted date formats all
//! come from [`ParserConfig`]. Fields are trimmed before interpretation. When
//! the delimiter is not a comma, commas inside numeric fields are treated as
//! thousands separators (`1,500` is fifteen hundred).
//!
//! # Source Totals
//!
//! A total column, when mapped, is never trusted. The record total is always
//! `quantity * unit_price`; the source value is only compared against it and
//! any disagreement is logged and counted.
//!
//! # Amount Bound
//!
//! A line whose total would exceed [`MAX_LINE_AMOUNT`] is rejected with
//! `AmountOutOfRange`. The bound keeps every parsed total, and any in-memory
//! sum of them, inside the `Decimal` range.

use crate::config::ParserConfig;
use crate::types::{ConfigError, LineNumber, ParseFailure, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::borrow::Cow;
use std::iter::Enumerate;
use std::str::FromStr;
use tracing::{debug, warn};

/// Outcome of parsing one line
pub type ParseResult = Result<TransactionRecord, ParseFailure>;

/// Largest accepted line total (10^18)
///
/// `Decimal` tops out near 7.9 * 10^28, so summing parsed totals cannot
/// overflow before ten billion lines.
pub const MAX_LINE_AMOUNT: i64 = 1_000_000_000_000_000_000;

/// Lazy line-to-record parser
///
/// # Examples
///
/// ```
/// use sales_analytics::config::{ColumnLayout, ParserConfig};
/// use sales_analytics::core::parser::RecordParser;
///
/// let config = ParserConfig::new(',', ColumnLayout::minimal());
/// let lines = ["T1,2024-01-01,P1,2,10.00", "T2,not-a-date,P2,1,5.00"];
/// let results: Vec<_> = RecordParser::new(&config, lines).unwrap().collect();
///
/// assert_eq!(results.len(), 2);
/// assert!(results[0].1.is_ok());
/// assert!(results[1].1.is_err());
/// ```
#[derive(Debug)]
pub struct RecordParser<'c, I> {
    config: &'c ParserConfig,
    lines: Enumerate<I>,
    skip_header: bool,
    total_mismatches: usize,
}

impl<'c, I, S> RecordParser<'c, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    /// Wrap a sequence of lines after checking the configuration
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` from [`ParserConfig::validate`]; no line is
    /// read in that case.
    pub fn new<L>(config: &'c ParserConfig, lines: L) -> Result<Self, ConfigError>
    where
        L: IntoIterator<IntoIter = I, Item = S>,
    {
        config.validate()?;
        Ok(Self::from_validated(config, lines))
    }

    /// Wrap a sequence of lines with a configuration already validated
    pub(crate) fn from_validated<L>(config: &'c ParserConfig, lines: L) -> Self
    where
        L: IntoIterator<IntoIter = I, Item = S>,
    {
        RecordParser {
            config,
            lines: lines.into_iter().enumerate(),
            skip_header: config.has_header,
            total_mismatches: 0,
        }
    }

    /// Number of lines whose source total disagreed with the computed total
    pub fn total_mismatches(&self) -> usize {
        self.total_mismatches
    }
}

impl<I, S> Iterator for RecordParser<'_, I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = (LineNumber, ParseResult);

    fn next(&mut self) -> Option<Self::Item> {
        let (index, line) = self.lines.next()?;

        let (index, line) = if self.skip_header {
            self.skip_header = false;
            debug!("Skipping header: {}", line.as_ref());
            self.lines.next()?
        } else {
            (index, line)
        };
        let line_number = index + 1;

        let result = match parse_fields(self.config, line.as_ref()) {
            Ok((record, source_total)) => {
                if let Some(raw) = source_total {
                    if !source_total_matches(self.config, raw, &record, line_number) {
                        self.total_mismatches += 1;
                    }
                }
                Ok(record)
            }
            Err(failure) => Err(failure),
        };

        Some((line_number, result))
    }
}

/// Parse a single line in isolation
///
/// Header handling does not apply here; the line is always treated as data.
///
/// # Returns
///
/// * `Ok(ParseResult)` - the data outcome for the line
/// * `Err(ConfigError)` - the configuration is unusable
pub fn parse_line(config: &ParserConfig, line: &str) -> Result<ParseResult, ConfigError> {
    config.validate()?;
    Ok(parse_fields(config, line).map(|(record, _)| record))
}

/// Parse a line into a record plus the raw source total, if the layout has one
fn parse_fields<'l>(
    config: &ParserConfig,
    line: &'l str,
) -> Result<(TransactionRecord, Option<&'l str>), ParseFailure> {
    if line.trim().is_empty() {
        return Err(ParseFailure::EmptyLine);
    }

    let fields: Vec<&str> = line.split(config.delimiter).map(str::trim).collect();
    if fields.len() != config.expected_fields {
        return Err(ParseFailure::wrong_field_count(
            config.expected_fields,
            fields.len(),
        ));
    }

    let layout = &config.layout;
    let date = parse_date(&config.date_formats, fields[layout.date])?;
    let quantity = parse_quantity(config.delimiter, fields[layout.quantity])?;
    let unit_price = parse_price(config.delimiter, fields[layout.unit_price])?;
    check_line_amount(quantity, unit_price)?;

    let optional = |index: Option<usize>| {
        index
            .map(|i| fields[i])
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    };

    let record = TransactionRecord {
        transaction_id: fields[layout.transaction_id].to_string(),
        date,
        product_id: fields[layout.product_id].to_string(),
        product_name: optional(layout.product_name).unwrap_or_default(),
        category: optional(layout.category),
        quantity,
        unit_price,
        customer_id: optional(layout.customer_id),
        store_id: optional(layout.store_id),
        region: optional(layout.region),
        enrichment: None,
    };

    Ok((record, layout.total.map(|i| fields[i])))
}

fn parse_date(formats: &[String], raw: &str) -> Result<NaiveDate, ParseFailure> {
    formats
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
        .ok_or_else(|| ParseFailure::unparseable_date(raw))
}

fn parse_quantity(delimiter: char, raw: &str) -> Result<u32, ParseFailure> {
    let cleaned = strip_thousands(delimiter, raw);
    match cleaned.parse::<i64>() {
        Ok(value) if value < 0 => Err(ParseFailure::negative_quantity(raw)),
        Ok(value) => u32::try_from(value).map_err(|_| ParseFailure::non_numeric_quantity(raw)),
        Err(_) => Err(ParseFailure::non_numeric_quantity(raw)),
    }
}

fn parse_price(delimiter: char, raw: &str) -> Result<Decimal, ParseFailure> {
    let price = parse_decimal(delimiter, raw).ok_or_else(|| ParseFailure::non_numeric_price(raw))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(ParseFailure::negative_price(raw));
    }
    Ok(price)
}

fn check_line_amount(quantity: u32, unit_price: Decimal) -> Result<(), ParseFailure> {
    match Decimal::from(quantity).checked_mul(unit_price) {
        Some(total) if total <= Decimal::from(MAX_LINE_AMOUNT) => Ok(()),
        _ => Err(ParseFailure::amount_out_of_range(quantity, unit_price)),
    }
}

fn parse_decimal(delimiter: char, raw: &str) -> Option<Decimal> {
    Decimal::from_str(&strip_thousands(delimiter, raw)).ok()
}

fn strip_thousands(delimiter: char, raw: &str) -> Cow<'_, str> {
    if delimiter != ',' && raw.contains(',') {
        Cow::Owned(raw.replace(',', ""))
    } else {
        Cow::Borrowed(raw)
    }
}

/// Compare a source total with the computed one, logging any disagreement
fn source_total_matches(
    config: &ParserConfig,
    raw: &str,
    record: &TransactionRecord,
    line_number: LineNumber,
) -> bool {
    if raw.is_empty() {
        return true;
    }
    let computed = record.total_amount();
    match parse_decimal(config.delimiter, raw) {
        Some(source) if source == computed => true,
        Some(source) => {
            warn!(
                "Line {}: source total {} differs from computed total {} for {}",
                line_number, source, computed, record.transaction_id
            );
            false
        }
        None => {
            warn!(
                "Line {}: unparseable source total '{}' for {}",
                line_number, raw, record.transaction_id
            );
            false
        }
    }
}
