// Assertions - text expectations and the sort-order oracle
//
// Text expectations delegate to playwright_rs::expect, which retries until
// the text matches or the settle budget runs out. Ordering checks compare
// the observed names against the same names sorted locally.

use crate::error::{Error, Result};
use crate::locator::ElementRef;
use crate::session::PageSession;
use playwright_rs::expect;
use std::fmt::Write as _;
use std::time::Duration;

/// Default budget for text expectations (matches Playwright)
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Sort direction for the ordering oracle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// The oracle: `names` sorted lexicographically in `direction`.
pub fn expected_order(names: &[String], direction: SortDirection) -> Vec<String> {
    let mut sorted = names.to_vec();
    sorted.sort();
    if direction == SortDirection::Descending {
        sorted.reverse();
    }
    sorted
}

/// Fails unless `observed` is already in `direction` order.
pub fn assert_sorted(observed: &[String], direction: SortDirection) -> Result<()> {
    let expected = expected_order(observed, direction);
    assert_same_sequence(&expected, observed)
}

/// Fails with a positional diff unless both sequences are identical.
pub fn assert_same_sequence(expected: &[String], actual: &[String]) -> Result<()> {
    if expected == actual {
        return Ok(());
    }
    Err(Error::AssertionFailed(sequence_diff(expected, actual)))
}

fn sequence_diff(expected: &[String], actual: &[String]) -> String {
    let mut out = format!(
        "sequences differ (expected {} items, got {})",
        expected.len(),
        actual.len()
    );
    for i in 0..expected.len().max(actual.len()) {
        let e = expected.get(i).map(String::as_str);
        let a = actual.get(i).map(String::as_str);
        if e == a {
            continue;
        }
        let _ = write!(
            out,
            "\n  [{i}] - {}\n  [{i}] + {}",
            e.unwrap_or("<missing>"),
            a.unwrap_or("<missing>")
        );
    }
    out
}

/// Waits until `element` shows text containing `literal`.
///
/// The literal is matched as a substring, the way a `/literal/` regex would.
pub async fn expect_text(
    session: &PageSession,
    element: &ElementRef,
    literal: &str,
    timeout: Duration,
) -> Result<()> {
    let locator = session.locator(element).await;
    expect(locator)
        .with_timeout(timeout)
        .to_have_text_regex(&regex::escape(literal))
        .await
        .map_err(|e| Error::AssertionFailed(format!("'{}': {}", element.name(), e)))
}

/// Waits until `element` is visible.
pub async fn expect_visible(
    session: &PageSession,
    element: &ElementRef,
    timeout: Duration,
) -> Result<()> {
    let locator = session.locator(element).await;
    expect(locator)
        .with_timeout(timeout)
        .to_be_visible()
        .await
        .map_err(|e| Error::AssertionFailed(format!("'{}': {}", element.name(), e)))
}

/// Waits until `element` is hidden or absent.
pub async fn expect_hidden(
    session: &PageSession,
    element: &ElementRef,
    timeout: Duration,
) -> Result<()> {
    let locator = session.locator(element).await;
    expect(locator)
        .with_timeout(timeout)
        .to_be_hidden()
        .await
        .map_err(|e| Error::AssertionFailed(format!("'{}': {}", element.name(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_expected_order_both_directions() {
        let observed = names(&[
            "Mango, chickpea & turmeric wrap",
            "Grind Flat White Coffee",
            "Wolfys Creamy Honey Porridge 50g",
        ]);

        assert_eq!(
            expected_order(&observed, SortDirection::Ascending),
            names(&[
                "Grind Flat White Coffee",
                "Mango, chickpea & turmeric wrap",
                "Wolfys Creamy Honey Porridge 50g",
            ])
        );
        assert_eq!(
            expected_order(&observed, SortDirection::Descending),
            names(&[
                "Wolfys Creamy Honey Porridge 50g",
                "Mango, chickpea & turmeric wrap",
                "Grind Flat White Coffee",
            ])
        );
    }

    #[test]
    fn test_oracle_is_byte_wise_not_locale_aware() {
        // Uppercase sorts before lowercase, as in a plain JavaScript sort()
        let observed = names(&["apple", "Banana"]);
        assert_eq!(
            expected_order(&observed, SortDirection::Ascending),
            names(&["Banana", "apple"])
        );
    }

    #[test]
    fn test_assert_sorted_accepts_sorted_and_empty() {
        assert!(assert_sorted(&names(&["a", "b", "c"]), SortDirection::Ascending).is_ok());
        assert!(assert_sorted(&names(&["c", "b", "a"]), SortDirection::Descending).is_ok());
        assert!(assert_sorted(&[], SortDirection::Descending).is_ok());
        assert!(assert_sorted(&names(&["b", "b"]), SortDirection::Descending).is_ok());
    }

    #[test]
    fn test_assert_sorted_reports_positional_diff() {
        let err = assert_sorted(&names(&["a", "c", "b"]), SortDirection::Ascending).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Assertion failed: sequences differ"));
        assert!(msg.contains("[1] - b"));
        assert!(msg.contains("[1] + c"));
        assert!(msg.contains("[2] - c"));
        assert!(msg.contains("[2] + b"));
        assert!(!msg.contains("[0]"));
    }

    #[test]
    fn test_sequence_diff_marks_missing_items() {
        let err = assert_same_sequence(&names(&["a", "b"]), &names(&["a"])).unwrap_err();
        assert!(err.to_string().contains("[1] + <missing>"));
    }
}
