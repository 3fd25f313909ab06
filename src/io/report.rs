//! Plain-text sales report
//!
//! Renders the results of one run for a human reader. The report writer only
//! formats: every number it prints was computed by the core, and monetary
//! values are rounded for display with [`format_money`].

use crate::core::analytics::{format_money, AnalyticsSummary, DimensionStat, ProductStat};
use crate::core::enrichment::EnrichmentCoverage;
use crate::core::filter::{FilterSet, Predicate};
use crate::core::pipeline::IngestReport;
use crate::types::SalesError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

const RULE: &str = "============================================================";
const THIN_RULE: &str = "------------------------------------------------------------";
const MAX_CUSTOMER_ROWS: usize = 10;

/// Everything the report shows, borrowed from the run results
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    pub generated_at: NaiveDateTime,
    /// Where the records came from, shown in the header
    pub source: &'a str,
    pub ingest: &'a IngestReport,
    pub filters: &'a FilterSet,
    pub working_count: usize,
    pub summary: &'a AnalyticsSummary,
    pub coverage: &'a EnrichmentCoverage,
}

fn percent(value: Decimal) -> String {
    format!("{}%", format_money(value))
}

fn describe(predicate: &Predicate) -> String {
    match predicate {
        Predicate::DateRange { from, to } => format!(
            "date {} to {}",
            from.map_or_else(|| "start".to_string(), |d| d.to_string()),
            to.map_or_else(|| "end".to_string(), |d| d.to_string())
        ),
        Predicate::Category(category) => format!("category = {category}"),
        Predicate::Region(region) => format!("region = {region}"),
        Predicate::Store(store) => format!("store = {store}"),
        Predicate::MinAmount(min) => format!("amount >= {}", format_money(*min)),
        Predicate::MaxAmount(max) => format!("amount <= {}", format_money(*max)),
    }
}

fn section(output: &mut dyn Write, title: &str) -> std::io::Result<()> {
    writeln!(output)?;
    writeln!(output, "{title}")?;
    writeln!(output, "{THIN_RULE}")
}

fn write_dimension_table(
    output: &mut dyn Write,
    label: &str,
    stats: &[DimensionStat],
) -> std::io::Result<()> {
    writeln!(
        output,
        "{:<20} {:>14} {:>8} {:>10}",
        label, "Revenue", "Count", "Share"
    )?;
    for stat in stats {
        writeln!(
            output,
            "{:<20} {:>14} {:>8} {:>10}",
            stat.name,
            format_money(stat.revenue),
            stat.count,
            percent(stat.percentage)
        )?;
    }
    Ok(())
}

fn write_product_table(output: &mut dyn Write, products: &[ProductStat]) -> std::io::Result<()> {
    writeln!(
        output,
        "{:<4} {:<10} {:<24} {:>8} {:>14}",
        "Rank", "Product", "Name", "Quantity", "Revenue"
    )?;
    for (rank, product) in products.iter().enumerate() {
        writeln!(
            output,
            "{:<4} {:<10} {:<24} {:>8} {:>14}",
            rank + 1,
            product.product_id,
            product.product_name,
            product.quantity,
            format_money(product.revenue)
        )?;
    }
    Ok(())
}

/// Render the full report
pub fn write_report(context: &ReportContext<'_>, output: &mut dyn Write) -> Result<(), SalesError> {
    let ReportContext {
        generated_at,
        source,
        ingest,
        filters,
        working_count,
        summary,
        coverage,
    } = *context;

    writeln!(output, "{RULE}")?;
    writeln!(output, "SALES ANALYTICS REPORT")?;
    writeln!(output, "Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
    writeln!(output, "Source: {source}")?;
    writeln!(output, "Records processed: {}", ingest.data_lines())?;
    writeln!(output, "{RULE}")?;

    section(output, "OVERALL SUMMARY")?;
    writeln!(output, "Total Revenue:        {}", format_money(summary.total_revenue))?;
    writeln!(output, "Total Transactions:   {}", summary.transaction_count)?;
    writeln!(output, "Average Order Value:  {}", summary.average_order_value_display())?;
    match (summary.daily_trend.first(), summary.daily_trend.last()) {
        (Some(first), Some(last)) => {
            writeln!(output, "Date Range:           {} to {}", first.date, last.date)?
        }
        _ => writeln!(output, "Date Range:           no data")?,
    }
    if filters.is_empty() {
        writeln!(output, "Filters:              none")?;
    } else {
        let applied: Vec<String> = filters.predicates().iter().map(describe).collect();
        writeln!(output, "Filters:              {}", applied.join(", "))?;
        writeln!(
            output,
            "Working Subset:       {} of {} valid records",
            working_count,
            ingest.valid.len()
        )?;
    }

    section(output, "REGION-WISE PERFORMANCE")?;
    write_dimension_table(output, "Region", &summary.by_region)?;

    section(output, "CATEGORY PERFORMANCE")?;
    write_dimension_table(output, "Category", &summary.by_category)?;

    section(output, "TOP PRODUCTS BY REVENUE")?;
    write_product_table(output, &summary.top_products_by_revenue)?;

    section(output, "TOP PRODUCTS BY QUANTITY")?;
    write_product_table(output, &summary.top_products_by_quantity)?;

    section(output, "TOP CUSTOMERS")?;
    writeln!(
        output,
        "{:<4} {:<10} {:>14} {:>8} {:>14}",
        "Rank", "Customer", "Total Spent", "Orders", "Avg Order"
    )?;
    for (rank, customer) in summary.customers.iter().take(MAX_CUSTOMER_ROWS).enumerate() {
        writeln!(
            output,
            "{:<4} {:<10} {:>14} {:>8} {:>14}",
            rank + 1,
            customer.customer_id,
            format_money(customer.total_spent),
            customer.purchase_count,
            format_money(customer.average_order_value)
        )?;
    }

    section(output, "DAILY SALES TREND")?;
    writeln!(
        output,
        "{:<12} {:>14} {:>8} {:>10}",
        "Date", "Revenue", "Orders", "Customers"
    )?;
    for day in &summary.daily_trend {
        writeln!(
            output,
            "{:<12} {:>14} {:>8} {:>10}",
            day.date.to_string(),
            format_money(day.revenue),
            day.transactions,
            day.unique_customers
        )?;
    }

    section(output, "PRODUCT PERFORMANCE ANALYSIS")?;
    match &summary.peak_day {
        Some(peak) => writeln!(
            output,
            "Best Selling Day: {} ({} across {} transactions)",
            peak.date,
            format_money(peak.revenue),
            peak.transactions
        )?,
        None => writeln!(output, "Best Selling Day: no data")?,
    }
    if summary.low_performers.is_empty() {
        writeln!(output, "Low Performing Products: none")?;
    } else {
        writeln!(output, "Low Performing Products:")?;
        for product in &summary.low_performers {
            writeln!(
                output,
                "  {} {} ({} units, {})",
                product.product_id,
                product.product_name,
                product.quantity,
                format_money(product.revenue)
            )?;
        }
    }

    section(output, "API ENRICHMENT SUMMARY")?;
    writeln!(output, "Records Enriched:     {}/{}", coverage.enriched, coverage.total)?;
    writeln!(
        output,
        "Success Rate:         {}",
        coverage
            .percentage()
            .map(percent)
            .unwrap_or_else(|| "no data".to_string())
    )?;
    if !coverage.unmatched_products.is_empty() {
        writeln!(
            output,
            "Products Not Enriched: {}",
            coverage.unmatched_products.join(", ")
        )?;
    }

    section(output, "DATA QUALITY")?;
    writeln!(output, "Valid Records:        {}", ingest.valid.len())?;
    writeln!(output, "Invalid Records:      {}", ingest.invalid_count())?;
    writeln!(output, "Blank Lines Skipped:  {}", ingest.blank_lines)?;
    writeln!(output, "Total Mismatches:     {}", ingest.total_mismatches)?;
    for (code, count) in ingest.failure_counts() {
        writeln!(output, "  {code:<22} {count}")?;
    }

    writeln!(output)?;
    writeln!(output, "{RULE}")?;
    output.flush()?;
    Ok(())
}

/// Render the report into a file, creating parent directories as needed
pub fn write_report_file(context: &ReportContext<'_>, path: &Path) -> Result<(), SalesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut output = BufWriter::new(File::create(path)?);
    write_report(context, &mut output)
}

/// Write the analytics summary as pretty-printed JSON
///
/// Amounts are serialized as decimal strings so no precision is lost.
pub fn write_summary_json(summary: &AnalyticsSummary, path: &Path) -> Result<(), SalesError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let mut output = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut output, summary)?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalyticsConfig, ColumnLayout, ParserConfig};
    use crate::core::pipeline::SalesPipeline;
    use crate::types::ProductCatalog;
    use chrono::NaiveDate;

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 1)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    fn render(lines: &[&str], filters: FilterSet) -> String {
        let pipeline = SalesPipeline::new(
            ParserConfig::new(
                ',',
                "id,date,product_id,product_name,quantity,price,customer_id,region"
                    .parse::<ColumnLayout>()
                    .unwrap(),
            ),
            AnalyticsConfig::default(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
        )
        .unwrap();
        let output = pipeline
            .run(lines.iter().copied(), &filters, &ProductCatalog::new())
            .unwrap();

        let context = ReportContext {
            generated_at: generated_at(),
            source: "test.txt",
            ingest: &output.ingest,
            filters: &filters,
            working_count: output.working_count,
            summary: &output.summary,
            coverage: &output.enriched.coverage,
        };
        let mut buffer = Vec::new();
        write_report(&context, &mut buffer).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_report_contains_headline_numbers() {
        let report = render(
            &[
                "T1,2024-01-01,P1,Mouse,2,10.005,C1,North",
                "T2,2024-01-02,P2,Pen,1,5.00,C2,South",
                "T2,2024-01-02,P2,Pen,1,5.00,C2,South",
                "T3,2024-01-02,P2,Pen,x,5.00,C2,South",
            ],
            FilterSet::new(),
        );

        assert!(report.contains("Generated: 2024-07-01 09:30:00"));
        assert!(report.contains("Total Revenue:        25.01"));
        assert!(report.contains("Total Transactions:   2"));
        assert!(report.contains("Average Order Value:  12.50"));
        assert!(report.contains("Date Range:           2024-01-01 to 2024-01-02"));
        assert!(report.contains("Filters:              none"));
        assert!(report.contains("Records Enriched:     0/2"));
        assert!(report.contains("Products Not Enriched: P1, P2"));
        assert!(report.contains("duplicate_id"));
        assert!(report.contains("non_numeric_quantity"));
        assert!(report.contains("Best Selling Day: 2024-01-01"));
    }

    #[test]
    fn test_report_over_empty_set_says_no_data() {
        let report = render(&[], FilterSet::new());

        assert!(report.contains("Average Order Value:  no data"));
        assert!(report.contains("Date Range:           no data"));
        assert!(report.contains("Best Selling Day: no data"));
        assert!(report.contains("Success Rate:         no data"));
    }

    #[test]
    fn test_report_lists_applied_filters() {
        let filters = FilterSet::new().with(Predicate::Region("North".into()));
        let report = render(
            &[
                "T1,2024-01-01,P1,Mouse,2,10.00,C1,North",
                "T2,2024-01-02,P2,Pen,1,5.00,C2,South",
            ],
            filters,
        );

        assert!(report.contains("Filters:              region = North"));
        assert!(report.contains("Working Subset:       1 of 2 valid records"));
    }

    #[test]
    fn test_report_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output").join("sales_report.txt");
        let ingest = IngestReport::default();
        let filters = FilterSet::new();
        let summary = crate::core::AnalyticsEngine::default()
            .summarize(&Vec::<crate::types::TransactionRecord>::new());
        let coverage = EnrichmentCoverage::default();

        let context = ReportContext {
            generated_at: generated_at(),
            source: "empty",
            ingest: &ingest,
            filters: &filters,
            working_count: 0,
            summary: &summary,
            coverage: &coverage,
        };
        write_report_file(&context, &path).unwrap();

        assert!(std::fs::read_to_string(&path)
            .unwrap()
            .starts_with(RULE));
    }

    #[test]
    fn test_summary_json_keeps_decimal_strings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let record = crate::types::TransactionRecord::new(
            "T1",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            "P1",
            3,
            Decimal::new(1999, 2),
        );
        let summary = crate::core::AnalyticsEngine::default().summarize([&record]);

        write_summary_json(&summary, &path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["total_revenue"], "59.97");
        assert_eq!(json["transaction_count"], 1);
    }
}
