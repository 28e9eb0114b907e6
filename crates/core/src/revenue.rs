// crates/core/src/revenue.rs
//! Revenue string extraction.
//!
//! Company revenue arrives as free text such as `"$1B to $5B (USD)"` or
//! `"Less than $1M (USD)"`. Only the first `$<number><M|B>` match is used.

use std::sync::OnceLock;

use regex_lite::Regex;

static REVENUE_RE: OnceLock<Regex> = OnceLock::new();

fn revenue_re() -> &'static Regex {
    REVENUE_RE.get_or_init(|| Regex::new(r"\$([0-9.]+)([MB]?)").expect("valid revenue regex"))
}

/// Extract revenue in millions of USD.
///
/// - `M` suffix → value as-is
/// - `B` suffix → value × 1000
/// - no suffix, no match, unparseable number, or missing input → `None`
pub fn extract_revenue_millions(revenue: Option<&str>) -> Option<f64> {
    let caps = revenue_re().captures(revenue?)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    match caps.get(2).map(|m| m.as_str()) {
        Some("M") => Some(value),
        Some("B") => Some(value * 1000.0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millions() {
        assert_eq!(extract_revenue_millions(Some("$12.5M")), Some(12.5));
    }

    #[test]
    fn test_billions() {
        assert_eq!(extract_revenue_millions(Some("$1.2B")), Some(1200.0));
    }

    #[test]
    fn test_no_match() {
        assert_eq!(extract_revenue_millions(Some("no number here")), None);
        assert_eq!(extract_revenue_millions(Some("Unknown / Non-Applicable")), None);
    }

    #[test]
    fn test_missing_input() {
        assert_eq!(extract_revenue_millions(None), None);
    }

    #[test]
    fn test_no_suffix_is_undefined() {
        assert_eq!(extract_revenue_millions(Some("$500")), None);
    }

    #[test]
    fn test_first_match_wins() {
        assert_eq!(extract_revenue_millions(Some("$1B to $5B (USD)")), Some(1000.0));
        assert_eq!(extract_revenue_millions(Some("Less than $1M (USD)")), Some(1.0));
        // the first match has no suffix, so the later "$5M" is never used
        assert_eq!(extract_revenue_millions(Some("$3 or $5M")), None);
    }

    #[test]
    fn test_unparseable_number_run() {
        assert_eq!(extract_revenue_millions(Some("$1.2.3M")), None);
        assert_eq!(extract_revenue_millions(Some("$.M")), None);
    }
}
