//! Record validator
//!
//! Applies the business rules to parsed records. Rules are checked in a fixed
//! order and the first one that fails decides the reason:
//!
//! 1. Quantity is greater than zero
//! 2. Unit price is not negative
//! 3. Date is not after the run's reference date
//! 4. Product id is not empty
//! 5. Transaction id has not been seen earlier in the batch
//!
//! Rules 1-4 are pure functions of the record. Rule 5 needs the set of ids
//! already accepted, which lives in the `Validator` value for one run. An id
//! is registered when its record reaches rule 5, so the first occurrence of an
//! otherwise valid record wins.

use crate::types::{
    LineNumber, TransactionRecord, ValidationFailure, ValidationOutcome, Verdict,
};
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::debug;

/// Per-run validator
///
/// Create one per batch; reusing a validator across batches would make ids
/// from the previous batch count as duplicates.
#[derive(Debug, Clone)]
pub struct Validator {
    as_of: NaiveDate,
    seen_ids: HashSet<String>,
}

impl Validator {
    /// Create a validator that treats dates after `as_of` as future dates
    pub fn new(as_of: NaiveDate) -> Self {
        Validator {
            as_of,
            seen_ids: HashSet::new(),
        }
    }

    /// Reference date for the future-date rule
    pub fn as_of(&self) -> NaiveDate {
        self.as_of
    }

    /// Check one record against every rule, registering its id if it passes
    pub fn check(&mut self, record: &TransactionRecord) -> Result<(), ValidationFailure> {
        check_record_rules(record, self.as_of)?;

        if !self.seen_ids.insert(record.transaction_id.clone()) {
            return Err(ValidationFailure::DuplicateId {
                transaction_id: record.transaction_id.clone(),
            });
        }

        Ok(())
    }

    /// Check a record and wrap it with its line number and verdict
    pub fn validate(&mut self, line: LineNumber, record: TransactionRecord) -> ValidationOutcome {
        let verdict = match self.check(&record) {
            Ok(()) => Verdict::Valid,
            Err(failure) => {
                debug!(
                    "Line {}: transaction {} rejected: {}",
                    line, record.transaction_id, failure
                );
                Verdict::Invalid(failure)
            }
        };

        ValidationOutcome {
            line,
            record,
            verdict,
        }
    }
}

/// The order-independent rules (1-4)
pub fn check_record_rules(
    record: &TransactionRecord,
    as_of: NaiveDate,
) -> Result<(), ValidationFailure> {
    if record.quantity == 0 {
        return Err(ValidationFailure::NonPositiveQuantity);
    }
    if record.unit_price.is_sign_negative() && !record.unit_price.is_zero() {
        return Err(ValidationFailure::NegativePrice);
    }
    if record.date > as_of {
        return Err(ValidationFailure::FutureDate {
            date: record.date,
            as_of,
        });
    }
    if record.product_id.trim().is_empty() {
        return Err(ValidationFailure::EmptyProductId);
    }
    Ok(())
}

/// Validate a whole batch in order, splitting it into valid records and rejects
pub fn validate_all<I>(
    records: I,
    as_of: NaiveDate,
) -> (Vec<TransactionRecord>, Vec<(TransactionRecord, ValidationFailure)>)
where
    I: IntoIterator<Item = TransactionRecord>,
{
    let mut validator = Validator::new(as_of);
    let mut valid = Vec::new();
    let mut invalid = Vec::new();

    for record in records {
        match validator.check(&record) {
            Ok(()) => valid.push(record),
            Err(failure) => invalid.push((record, failure)),
        }
    }

    (valid, invalid)
}
