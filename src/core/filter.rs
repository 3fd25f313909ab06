//! Filter engine
//!
//! Narrows the valid record set to the working subset used for analytics.
//! Predicates combine with AND; an empty [`FilterSet`] keeps every record.
//! Filtering only borrows: the result is a new vector of references into the
//! input, so it is always a subset of what was passed in.

use crate::types::{ConfigError, TransactionRecord};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

/// A single record predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Inclusive date range; an open end is unbounded
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    /// Category equals the value (records without a category never match)
    Category(String),
    /// Region equals the value (records without a region never match)
    Region(String),
    /// Store equals the value (records without a store never match)
    Store(String),
    /// Line total is at least the value
    MinAmount(Decimal),
    /// Line total is at most the value
    MaxAmount(Decimal),
}

impl Predicate {
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        match self {
            Predicate::DateRange { from, to } => {
                from.map_or(true, |from| record.date >= from)
                    && to.map_or(true, |to| record.date <= to)
            }
            Predicate::Category(category) => record.category.as_deref() == Some(category.as_str()),
            Predicate::Region(region) => record.region.as_deref() == Some(region.as_str()),
            Predicate::Store(store) => record.store_id.as_deref() == Some(store.as_str()),
            Predicate::MinAmount(min) => record.total_amount() >= *min,
            Predicate::MaxAmount(max) => record.total_amount() <= *max,
        }
    }
}

/// Conjunction of predicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    predicates: Vec<Predicate>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predicate, builder style
    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn push(&mut self, predicate: Predicate) {
        self.predicates.push(predicate);
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Reject predicate combinations that can never match anything
    ///
    /// # Errors
    ///
    /// - `InvertedDateRange` if a date range starts after it ends
    /// - `InvertedAmountRange` if a minimum amount exceeds a maximum amount
    pub fn validate(&self) -> Result<(), ConfigError> {
        for predicate in &self.predicates {
            if let Predicate::DateRange {
                from: Some(from),
                to: Some(to),
            } = predicate
            {
                if from > to {
                    return Err(ConfigError::InvertedDateRange {
                        from: *from,
                        to: *to,
                    });
                }
            }
        }

        let mins = self.predicates.iter().filter_map(|p| match p {
            Predicate::MinAmount(min) => Some(*min),
            _ => None,
        });
        let max = self
            .predicates
            .iter()
            .filter_map(|p| match p {
                Predicate::MaxAmount(max) => Some(*max),
                _ => None,
            })
            .min();

        if let (Some(min), Some(max)) = (mins.max(), max) {
            if min > max {
                return Err(ConfigError::InvertedAmountRange {
                    min: min.to_string(),
                    max: max.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Whether a record satisfies every predicate
    pub fn matches(&self, record: &TransactionRecord) -> bool {
        self.predicates.iter().all(|p| p.matches(record))
    }

    /// Keep the records that satisfy every predicate, preserving input order
    pub fn apply<'a, I>(&self, records: I) -> Vec<&'a TransactionRecord>
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }
}

/// Values present in a record set, for presenting filter choices
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub categories: Vec<String>,
    pub stores: Vec<String>,
    pub min_amount: Option<Decimal>,
    pub max_amount: Option<Decimal>,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

/// Collect the distinct dimension values and the amount/date ranges of a set
pub fn filter_options<'a, I>(records: I) -> FilterOptions
where
    I: IntoIterator<Item = &'a TransactionRecord>,
{
    let mut regions = BTreeSet::new();
    let mut categories = BTreeSet::new();
    let mut stores = BTreeSet::new();
    let mut options = FilterOptions::default();

    for record in records {
        regions.extend(record.region.clone());
        categories.extend(record.category.clone());
        stores.extend(record.store_id.clone());

        let amount = record.total_amount();
        options.min_amount = Some(options.min_amount.map_or(amount, |m| m.min(amount)));
        options.max_amount = Some(options.max_amount.map_or(amount, |m| m.max(amount)));
        options.first_date = Some(options.first_date.map_or(record.date, |d| d.min(record.date)));
        options.last_date = Some(options.last_date.map_or(record.date, |d| d.max(record.date)));
    }

    options.regions = regions.into_iter().collect();
    options.categories = categories.into_iter().collect();
    options.stores = stores.into_iter().collect();
    options
}
