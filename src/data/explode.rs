//! Splitting multi-valued cells into atomic values.
//!
//! A spreadsheet cell may hold one value, a JSON array literal, or several
//! values joined by delimiters. [`explode_cell`] turns any of those into the
//! list of atomic values used to build option vocabularies.

use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use serde_json::Value as JsonValue;

use super::model::{json_to_text, CellValue};
use crate::config::DelimiterPolicy;

lazy_static! {
    /// Whole-cell numeric or currency literal: `$123,456.78`, `€1,000`, `42`, `3.5`.
    /// ASCII digits only.
    static ref NUMERIC_LITERAL: Regex =
        Regex::new(r"^[$€£]?\s*[0-9]{1,3}(?:,[0-9]{3})*(?:\.[0-9]+)?\s*$|^\s*[0-9]+(?:\.[0-9]+)?\s*$").unwrap();
}

/// Explode one cell of `column` into its trimmed, non-blank atomic values.
pub fn explode_cell(cell: &CellValue, column: &str, policy: &DelimiterPolicy) -> Vec<String> {
    match cell {
        CellValue::List(items) => items
            .iter()
            .flat_map(|item| explode_text(item, column, policy))
            .collect(),
        other => explode_text(&other.to_string(), column, policy),
    }
}

/// Explode the text of a cell. See [`explode_cell`].
pub fn explode_text(raw: &str, column: &str, policy: &DelimiterPolicy) -> Vec<String> {
    let s = raw.trim();
    if s.is_empty() {
        return Vec::new();
    }

    if s.starts_with('[') && s.ends_with(']') {
        match serde_json::from_str::<JsonValue>(s) {
            Ok(JsonValue::Array(items)) => {
                return items
                    .iter()
                    .map(|item| json_to_text(item).trim().to_string())
                    .filter(|item| !item.is_empty())
                    .collect();
            }
            Ok(_) => {}
            Err(err) => debug!("{column}: {s:?} is not a JSON array ({err}), splitting instead"),
        }
    }

    // Thousands separators are not list separators.
    if NUMERIC_LITERAL.is_match(s) {
        return vec![s.to_string()];
    }

    split_outside_parens(s, policy.delimiters_for(column))
}

/// Split on `delims`, except inside parentheses.
///
/// Nesting depth never drops below zero, so a stray `)` does not protect
/// the rest of the cell from splitting.
pub fn split_outside_parens(s: &str, delims: &[char]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cur = String::new();
    let mut depth: usize = 0;

    for ch in s.chars() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }

        if depth == 0 && delims.contains(&ch) {
            push_segment(&mut out, &cur);
            cur.clear();
        } else {
            cur.push(ch);
        }
    }
    push_segment(&mut out, &cur);
    out
}

fn push_segment(out: &mut Vec<String>, segment: &str) {
    let t = segment.trim();
    if !t.is_empty() {
        out.push(t.to_string());
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn explode(raw: &str, column: &str) -> Vec<String> {
        explode_text(raw, column, &DelimiterPolicy::default())
    }

    #[test]
    fn currency_literal_is_one_value() {
        assert_eq!(explode("$1,234,567", "Agency IC"), vec!["$1,234,567"]);
        assert_eq!(explode("€ 12,000.50", "Objective - General"), vec!["€ 12,000.50"]);
        assert_eq!(explode("2021", "Intervention"), vec!["2021"]);
        assert_eq!(explode("3.75", "Intervention"), vec!["3.75"]);
    }

    #[test]
    fn malformed_grouping_is_split() {
        assert_eq!(explode("1,23,4", "Intervention"), vec!["1", "23", "4"]);
    }

    #[test]
    fn commas_inside_parentheses_survive() {
        assert_eq!(
            explode("Clinical (Phase I, II, FS)", "Objective - Specific"),
            vec!["Clinical (Phase I, II, FS)"]
        );
        assert_eq!(
            explode("Clinical (Phase I, II), Preclinical", "Readiness"),
            vec!["Clinical (Phase I, II), Preclinical"]
        );
        assert_eq!(
            explode("Clinical (Phase I, II), Preclinical", "Intervention"),
            vec!["Clinical (Phase I, II)", "Preclinical"]
        );
    }

    #[test]
    fn json_array_cells() {
        assert_eq!(explode(r#"["Drug","Device"]"#, "Intervention"), vec!["Drug", "Device"]);
        assert_eq!(explode(r#"[" Drug ", "", 3, null]"#, "Agency"), vec!["Drug", "3"]);
        // No delimiter splitting inside the JSON branch.
        assert_eq!(explode(r#"["a, b"]"#, "Intervention"), vec!["a, b"]);
        assert_eq!(explode("[]", "Intervention"), Vec::<String>::new());
    }

    #[test]
    fn malformed_json_falls_back_to_splitting() {
        assert_eq!(explode("[Drug; Device]", "Intervention"), vec!["[Drug", "Device]"]);
        assert_eq!(explode("[Phase I]", "Readiness"), vec!["[Phase I]"]);
    }

    #[test]
    fn default_delimiters() {
        assert_eq!(
            explode("NIH; DoD | NSF\nDOE", "Agency"),
            vec!["NIH", "DoD", "NSF", "DOE"]
        );
        assert_eq!(explode("Smith, Jane", "Agency"), vec!["Smith, Jane"]);
        assert_eq!(explode(" ;; | ", "Agency"), Vec::<String>::new());
    }

    #[test]
    fn unmatched_close_paren_is_clamped() {
        assert_eq!(
            split_outside_parens("a) b, c (d, e", &[',']),
            vec!["a) b", "c (d, e"]
        );
    }

    #[test]
    fn list_cells_explode_each_element() {
        let cell = CellValue::List(vec!["Drug, Device".into(), " ".into(), "Behavioral".into()]);
        assert_eq!(
            explode_cell(&cell, "Intervention", &DelimiterPolicy::default()),
            vec!["Drug", "Device", "Behavioral"]
        );
    }

    #[test]
    fn blank_cells_have_no_values() {
        let policy = DelimiterPolicy::default();
        assert!(explode_cell(&CellValue::Null, "Agency", &policy).is_empty());
        assert!(explode_cell(&CellValue::from("   "), "Agency", &policy).is_empty());
        assert_eq!(explode_cell(&CellValue::Integer(7), "Agency", &policy), vec!["7"]);
    }
}
