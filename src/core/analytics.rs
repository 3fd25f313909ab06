//! Analytics engine
//!
//! Computes the [`AnalyticsSummary`] for a working subset of records.
//!
//! # Determinism
//!
//! The summary depends only on the multiset of records, never on their order:
//! money is summed exactly in `Decimal`, grouping goes through ordered maps,
//! and every ranking has a total order (value first, then name or id
//! ascending). Rounding happens only when a value is displayed, via
//! [`round_money`].
//!
//! # Overflow
//!
//! Parsed line totals are bounded (see [`crate::core::parser::MAX_LINE_AMOUNT`]),
//! so sums over parsed records stay exact. Records built by hand can exceed
//! that; their sums saturate at `Decimal::MAX` and a warning is logged.

use crate::config::AnalyticsConfig;
use crate::types::TransactionRecord;
use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Group label for records that lack a dimension value
pub const UNSPECIFIED: &str = "Unspecified";

/// Text shown in place of a ratio over an empty set
pub const NO_DATA: &str = "no data";

/// Round a monetary value for display: 2 places, half to even
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Display form of a monetary value, always with two decimals
pub fn format_money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// Add `amount` to `sum`, saturating instead of overflowing
///
/// Sets `saturated` when the exact sum is out of range.
fn add_money(sum: &mut Decimal, amount: Decimal, saturated: &mut bool) {
    let next = match sum.checked_add(amount) {
        Some(next) => next,
        None => {
            *saturated = true;
            sum.saturating_add(amount)
        }
    };
    *sum = next;
}

/// Revenue and volume for one value of a dimension (a category, a region)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DimensionStat {
    pub name: String,
    pub revenue: Decimal,
    pub count: usize,
    /// Share of total revenue, in percent (unrounded)
    pub percentage: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductStat {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: Decimal,
    pub transactions: usize,
    pub unique_customers: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerStat {
    pub customer_id: String,
    pub total_spent: Decimal,
    pub purchase_count: usize,
    pub average_order_value: Decimal,
    /// Distinct product ids bought, ascending
    pub products: Vec<String>,
}

/// Aggregate statistics over a working subset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsSummary {
    pub total_revenue: Decimal,
    pub transaction_count: usize,
    /// `None` when there are no transactions
    pub average_order_value: Option<Decimal>,
    pub by_category: Vec<DimensionStat>,
    pub by_region: Vec<DimensionStat>,
    pub top_products_by_revenue: Vec<ProductStat>,
    pub top_products_by_quantity: Vec<ProductStat>,
    /// One entry per date, ascending
    pub daily_trend: Vec<DailySales>,
    pub peak_day: Option<DailySales>,
    /// Products below the configured quantity threshold, ascending quantity
    pub low_performers: Vec<ProductStat>,
    /// Customers by total spend, descending
    pub customers: Vec<CustomerStat>,
}

impl AnalyticsSummary {
    pub fn is_empty(&self) -> bool {
        self.transaction_count == 0
    }

    /// Average order value for display, or `"no data"`
    pub fn average_order_value_display(&self) -> String {
        self.average_order_value
            .map(format_money)
            .unwrap_or_else(|| NO_DATA.to_string())
    }
}

#[derive(Default)]
struct DimensionAcc {
    revenue: Decimal,
    count: usize,
}

#[derive(Default)]
struct ProductAcc {
    name: Option<String>,
    quantity: u64,
    revenue: Decimal,
}

#[derive(Default)]
struct DailyAcc<'a> {
    revenue: Decimal,
    transactions: usize,
    customers: BTreeSet<&'a str>,
}

#[derive(Default)]
struct CustomerAcc<'a> {
    total_spent: Decimal,
    purchase_count: usize,
    products: BTreeSet<&'a str>,
}

/// Stateless aggregation over record sets
#[derive(Debug, Clone, Copy, Default)]
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
}

impl AnalyticsEngine {
    pub fn new(config: AnalyticsConfig) -> Self {
        AnalyticsEngine { config }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    /// Compute every statistic in a single pass over `records`
    pub fn summarize<'a, I>(&self, records: I) -> AnalyticsSummary
    where
        I: IntoIterator<Item = &'a TransactionRecord>,
    {
        let mut total_revenue = Decimal::ZERO;
        let mut transaction_count = 0usize;
        let mut categories: BTreeMap<&str, DimensionAcc> = BTreeMap::new();
        let mut regions: BTreeMap<&str, DimensionAcc> = BTreeMap::new();
        let mut products: BTreeMap<&str, ProductAcc> = BTreeMap::new();
        let mut days: BTreeMap<NaiveDate, DailyAcc> = BTreeMap::new();
        let mut customers: BTreeMap<&str, CustomerAcc> = BTreeMap::new();
        let mut saturated = false;

        for record in records {
            let amount = record.total_amount();
            add_money(&mut total_revenue, amount, &mut saturated);
            transaction_count += 1;

            let category = categories
                .entry(record.category.as_deref().unwrap_or(UNSPECIFIED))
                .or_default();
            add_money(&mut category.revenue, amount, &mut saturated);
            category.count += 1;

            let region = regions
                .entry(record.region.as_deref().unwrap_or(UNSPECIFIED))
                .or_default();
            add_money(&mut region.revenue, amount, &mut saturated);
            region.count += 1;

            let product = products.entry(record.product_id.as_str()).or_default();
            product.quantity = product.quantity.saturating_add(u64::from(record.quantity));
            add_money(&mut product.revenue, amount, &mut saturated);
            if !record.product_name.is_empty() {
                // Smallest name wins so the label does not depend on input order
                let keep_current = product
                    .name
                    .as_deref()
                    .is_some_and(|current| current <= record.product_name.as_str());
                if !keep_current {
                    product.name = Some(record.product_name.clone());
                }
            }

            let day = days.entry(record.date).or_default();
            add_money(&mut day.revenue, amount, &mut saturated);
            day.transactions += 1;

            if let Some(customer_id) = record.customer_id.as_deref() {
                day.customers.insert(customer_id);

                let customer = customers.entry(customer_id).or_default();
                add_money(&mut customer.total_spent, amount, &mut saturated);
                customer.purchase_count += 1;
                customer.products.insert(record.product_id.as_str());
            }
        }

        if saturated {
            warn!("Revenue sums exceeded the decimal range and were capped");
        }

        let average_order_value = if transaction_count == 0 {
            None
        } else {
            Some(total_revenue / Decimal::from(transaction_count))
        };

        let product_stats: Vec<ProductStat> = products
            .into_iter()
            .map(|(product_id, acc)| ProductStat {
                product_id: product_id.to_string(),
                product_name: acc.name.unwrap_or_default(),
                quantity: acc.quantity,
                revenue: acc.revenue,
            })
            .collect();

        let daily_trend: Vec<DailySales> = days
            .into_iter()
            .map(|(date, acc)| DailySales {
                date,
                revenue: acc.revenue,
                transactions: acc.transactions,
                unique_customers: acc.customers.len(),
            })
            .collect();

        AnalyticsSummary {
            total_revenue,
            transaction_count,
            average_order_value,
            by_category: dimension_breakdown(categories, total_revenue),
            by_region: dimension_breakdown(regions, total_revenue),
            top_products_by_revenue: top_products(&product_stats, self.config.top_n, |a, b| {
                b.revenue.cmp(&a.revenue)
            }),
            top_products_by_quantity: top_products(&product_stats, self.config.top_n, |a, b| {
                b.quantity.cmp(&a.quantity)
            }),
            peak_day: peak_day(&daily_trend),
            daily_trend,
            low_performers: low_performers(&product_stats, self.config.low_performer_threshold),
            customers: customer_breakdown(customers),
        }
    }
}

fn dimension_breakdown(
    groups: BTreeMap<&str, DimensionAcc>,
    total_revenue: Decimal,
) -> Vec<DimensionStat> {
    let mut stats: Vec<DimensionStat> = groups
        .into_iter()
        .map(|(name, acc)| DimensionStat {
            name: name.to_string(),
            percentage: percentage_of(acc.revenue, total_revenue),
            revenue: acc.revenue,
            count: acc.count,
        })
        .collect();

    stats.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.name.cmp(&b.name)));
    stats
}

/// `part` as a percentage of `whole`; zero when `whole` is zero
fn percentage_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(whole))
        .or_else(|| {
            part.checked_div(whole)
                .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        })
        .unwrap_or(Decimal::ZERO)
}

/// Rank products with `by`, breaking ties on ascending product id
fn top_products<F>(stats: &[ProductStat], n: usize, by: F) -> Vec<ProductStat>
where
    F: Fn(&ProductStat, &ProductStat) -> Ordering,
{
    let mut ranked = stats.to_vec();
    ranked.sort_by(|a, b| by(a, b).then_with(|| a.product_id.cmp(&b.product_id)));
    ranked.truncate(n);
    ranked
}

/// Highest-revenue day; the earliest date wins a tie
fn peak_day(daily_trend: &[DailySales]) -> Option<DailySales> {
    let mut peak: Option<&DailySales> = None;
    for day in daily_trend {
        if peak.map_or(true, |best| day.revenue > best.revenue) {
            peak = Some(day);
        }
    }
    peak.cloned()
}

fn low_performers(stats: &[ProductStat], threshold: u64) -> Vec<ProductStat> {
    let mut low: Vec<ProductStat> = stats
        .iter()
        .filter(|p| p.quantity < threshold)
        .cloned()
        .collect();
    low.sort_by(|a, b| {
        a.quantity
            .cmp(&b.quantity)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    low
}

fn customer_breakdown(customers: BTreeMap<&str, CustomerAcc>) -> Vec<CustomerStat> {
    let mut stats: Vec<CustomerStat> = customers
        .into_iter()
        .map(|(customer_id, acc)| CustomerStat {
            customer_id: customer_id.to_string(),
            average_order_value: acc.total_spent / Decimal::from(acc.purchase_count),
            total_spent: acc.total_spent,
            purchase_count: acc.purchase_count,
            products: acc.products.into_iter().map(str::to_string).collect(),
        })
        .collect();

    stats.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.customer_id.cmp(&b.customer_id))
    });
    stats
}
