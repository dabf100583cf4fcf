//! Text normalization shared by ingestion and querying.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Trim and collapse every whitespace run to a single space.
///
/// ```
/// use grant_explorer::data::text::collapse_whitespace;
///
/// assert_eq!(collapse_whitespace("  Fiscal \t  Year "), "Fiscal Year");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Comparison key for case- and accent-insensitive matching.
///
/// Performs:
/// - Unicode canonical decomposition (NFD)
/// - Removal of combining marks, so "é" folds to "e"
/// - Lowercase conversion
/// - Whitespace collapsing
pub fn fold(s: &str) -> String {
    let stripped: String = s.nfd().filter(|c| !is_combining_mark(*c)).collect();
    collapse_whitespace(&stripped.to_lowercase())
}

/// Collation used to sort option vocabularies.
///
/// Orders by the folded form first, then by accents, then lowercase before
/// uppercase, then by code point, so it is a total order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    fold(a)
        .cmp(&fold(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

/// Format a dollar amount with thousands separators and no fractional digits.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return "$0".to_string();
    }
    let rounded = amount.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fold_strips_case_accents_and_spacing() {
        assert_eq!(fold("  Café   Médical "), "cafe medical");
        assert_eq!(fold("ÉCOLE"), "ecole");
        assert_eq!(fold("São Paulo"), fold("sao paulo"));
        // Compatibility characters are not rewritten, only accents dropped.
        assert_eq!(fold("ﬁnal"), "ﬁnal");
    }

    #[test]
    fn locale_order_ignores_case_first() {
        let mut values = vec!["beta", "Alpha", "alpha", "Émile", "delta"];
        values.sort_by(|a, b| locale_cmp(a, b));
        assert_eq!(values, vec!["alpha", "Alpha", "beta", "delta", "Émile"]);
    }

    #[test]
    fn usd_formatting() {
        assert_eq!(format_usd(0.0), "$0");
        assert_eq!(format_usd(300.0), "$300");
        assert_eq!(format_usd(1234567.5), "$1,234,568");
        assert_eq!(format_usd(1000.0), "$1,000");
        assert_eq!(format_usd(-5000.4), "-$5,000");
        assert_eq!(format_usd(f64::NAN), "$0");
    }
}
