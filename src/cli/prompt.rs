//! Interactive filter prompt
//!
//! Asks whether to filter, then for a region and an amount range. Any answer
//! may be left blank. Input and output are plain `BufRead`/`Write` handles so
//! the runner can pass stdin/stderr and tests can pass buffers.

use crate::core::analytics::format_money;
use crate::core::filter::{FilterOptions, FilterSet, Predicate};
use crate::types::SalesError;
use rust_decimal::Decimal;
use std::io::{BufRead, Write};

/// Read one trimmed answer; end of input counts as a blank answer
fn ask(input: &mut dyn BufRead, output: &mut dyn Write, question: &str) -> Result<String, SalesError> {
    write!(output, "{question}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

/// Ask for an amount until the answer is blank or a number
fn ask_amount(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    question: &str,
) -> Result<Option<Decimal>, SalesError> {
    loop {
        let answer = ask(input, output, question)?;
        if answer.is_empty() {
            return Ok(None);
        }
        match answer.parse::<Decimal>() {
            Ok(amount) => return Ok(Some(amount)),
            Err(_) => writeln!(output, "'{answer}' is not an amount, try again or leave blank")?,
        }
    }
}

/// Prompt for filters
///
/// The region answer is matched case-insensitively against `options.regions`
/// and replaced by the stored spelling when one matches.
///
/// # Arguments
///
/// * `input` - Where answers are read from
/// * `output` - Where questions are written to
/// * `options` - Values present in the valid records, shown as hints
///
/// # Returns
///
/// The chosen filters; empty if the user declines.
///
/// # Errors
///
/// Returns `SalesError::IoError` if reading or writing fails.
pub fn prompt_filters(
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    options: &FilterOptions,
) -> Result<FilterSet, SalesError> {
    if !options.regions.is_empty() {
        writeln!(output, "Available regions: {}", options.regions.join(", "))?;
    }
    if let (Some(min), Some(max)) = (options.min_amount, options.max_amount) {
        writeln!(
            output,
            "Transaction amounts range from {} to {}",
            format_money(min),
            format_money(max)
        )?;
    }

    let answer = ask(input, output, "Do you want to filter data? (y/n): ")?;
    if !answer.eq_ignore_ascii_case("y") && !answer.eq_ignore_ascii_case("yes") {
        return Ok(FilterSet::new());
    }

    let mut filters = FilterSet::new();

    let region = ask(input, output, "Region (blank for all): ")?;
    if !region.is_empty() {
        let region = options
            .regions
            .iter()
            .find(|known| known.eq_ignore_ascii_case(&region))
            .cloned()
            .unwrap_or(region);
        filters.push(Predicate::Region(region));
    }

    if let Some(min) = ask_amount(input, output, "Minimum amount (blank for none): ")? {
        filters.push(Predicate::MinAmount(min));
    }
    if let Some(max) = ask_amount(input, output, "Maximum amount (blank for none): ")? {
        filters.push(Predicate::MaxAmount(max));
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Cursor;

    fn options() -> FilterOptions {
        FilterOptions {
            regions: vec!["East".to_string(), "North".to_string()],
            min_amount: Some(Decimal::new(500, 0)),
            max_amount: Some(Decimal::new(90000, 0)),
            ..Default::default()
        }
    }

    fn run(answers: &str) -> (FilterSet, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let filters = prompt_filters(&mut input, &mut output, &options()).unwrap();
        (filters, String::from_utf8(output).unwrap())
    }

    #[rstest]
    #[case::no("n\n")]
    #[case::blank("\n")]
    #[case::end_of_input("")]
    fn test_declining_gives_no_filters(#[case] answers: &str) {
        let (filters, _) = run(answers);
        assert!(filters.is_empty());
    }

    #[test]
    fn test_shows_hints() {
        let (_, shown) = run("n\n");
        assert!(shown.contains("Available regions: East, North"));
        assert!(shown.contains("from 500.00 to 90000.00"));
    }

    #[test]
    fn test_collects_region_and_amounts() {
        let (filters, _) = run("y\nnorth\n1000\n50000.50\n");
        assert_eq!(
            filters.predicates(),
            &[
                Predicate::Region("North".to_string()),
                Predicate::MinAmount(Decimal::new(1000, 0)),
                Predicate::MaxAmount(Decimal::new(5000050, 2)),
            ]
        );
    }

    #[test]
    fn test_blank_answers_are_skipped() {
        let (filters, _) = run("yes\n\n\n20000\n");
        assert_eq!(
            filters.predicates(),
            &[Predicate::MaxAmount(Decimal::new(20000, 0))]
        );
    }

    #[test]
    fn test_invalid_amount_is_asked_again() {
        let (filters, shown) = run("y\nWest\nlots\n250\n\n");
        assert!(shown.contains("'lots' is not an amount"));
        assert_eq!(
            filters.predicates(),
            &[
                Predicate::Region("West".to_string()),
                Predicate::MinAmount(Decimal::new(250, 0)),
            ]
        );
    }
}
