//! Cleaning raw spreadsheet rows into grant records.
//!
//! Headers are trimmed and whitespace-collapsed. The year and amount columns
//! are coerced to numbers when they parse; anything else is left untouched
//! so the original text can still be displayed.

use log::debug;

use super::model::{CellValue, Record};
use super::text::collapse_whitespace;
use crate::config::ExplorerConfig;

/// Canonical column name: trimmed, internal whitespace collapsed.
pub fn normalize_header(header: &str) -> String {
    collapse_whitespace(header)
}

/// Clean every row. Never fails; cells that do not coerce keep their raw value.
pub fn normalize_records(rows: &[Record], config: &ExplorerConfig) -> Vec<Record> {
    let records: Vec<Record> = rows.iter().map(|row| normalize_record(row, config)).collect();
    debug!("normalized {} rows", records.len());
    records
}

/// Clean a single row. Columns stay in sheet order; when two headers clean up
/// to the same name, the later column's value wins.
pub fn normalize_record(row: &Record, config: &ExplorerConfig) -> Record {
    let mut out = Record::new();
    for (key, value) in row.iter() {
        let header = normalize_header(key);
        if header.is_empty() {
            continue;
        }
        out.insert(header, value.clone());
    }

    if let Some(year) = out.get(&config.year_column) {
        let coerced = coerce_integer(year);
        out.insert(config.year_column.clone(), coerced);
    }
    if let Some(amount) = out.get(&config.amount_column) {
        let coerced = coerce_currency(amount);
        out.insert(config.amount_column.clone(), coerced);
    }
    out
}

/// Integer-like coercion: strip thousands separators, parse, truncate.
pub fn coerce_integer(value: &CellValue) -> CellValue {
    match value {
        CellValue::Integer(_) => value.clone(),
        CellValue::Float(f) => match truncate_to_i64(*f) {
            Some(i) => CellValue::Integer(i),
            None => value.clone(),
        },
        CellValue::Text(s) => match parse_integer(s) {
            Some(i) => CellValue::Integer(i),
            None => {
                if !s.trim().is_empty() {
                    debug!("keeping non-numeric year {s:?}");
                }
                value.clone()
            }
        },
        _ => value.clone(),
    }
}

/// Currency-like coercion: strip currency symbols and thousands separators.
pub fn coerce_currency(value: &CellValue) -> CellValue {
    match value {
        CellValue::Integer(i) => CellValue::Float(*i as f64),
        CellValue::Float(_) => value.clone(),
        CellValue::Text(s) => match parse_currency(s) {
            Some(f) => CellValue::Float(f),
            None => {
                if !s.trim().is_empty() {
                    debug!("keeping non-numeric amount {s:?}");
                }
                value.clone()
            }
        },
        _ => value.clone(),
    }
}

/// `"2,021"` → `2021`, `"2019.9"` → `2019`. `None` for blank, non-finite or
/// out-of-range input.
pub fn parse_integer(s: &str) -> Option<i64> {
    let cleaned: String = s.chars().filter(|c| *c != ',').collect();
    parse_finite(&cleaned).and_then(truncate_to_i64)
}

fn truncate_to_i64(n: f64) -> Option<i64> {
    let t = n.trunc();
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    (t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

/// `"$1,234.50"` → `1234.5`. `None` for blank or non-finite input.
pub fn parse_currency(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | ','))
        .collect();
    parse_finite(&cleaned)
}

fn parse_finite(s: &str) -> Option<f64> {
    let t = s.trim();
    if t.is_empty() {
        return None;
    }
    t.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Numeric reading of the year column for range filtering.
pub fn year_value(value: &CellValue) -> Option<f64> {
    coerce_integer(value).as_f64()
}

/// Numeric reading of the amount column for range filtering and totals.
pub fn amount_value(value: &CellValue) -> Option<f64> {
    coerce_currency(value).as_f64()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn row(cells: &[(&str, CellValue)]) -> Record {
        cells.iter().cloned().collect()
    }

    #[test]
    fn headers_are_trimmed_and_collapsed() {
        let config = ExplorerConfig::default();
        let raw = row(&[
            ("  Agency   IC ", "NCI".into()),
            ("Project\tTitle", "Study".into()),
            ("   ", "dropped".into()),
        ]);
        let clean = normalize_record(&raw, &config);
        assert_eq!(
            clean.columns().cloned().collect::<Vec<_>>(),
            vec!["Agency IC", "Project Title"]
        );
    }

    #[test]
    fn year_and_amount_are_coerced() {
        let config = ExplorerConfig::default();
        let raw = row(&[
            (" Fiscal Year", "2,021".into()),
            ("Amount ", "$1,234,567.50".into()),
            ("State", "12".into()),
        ]);
        let clean = normalize_record(&raw, &config);
        assert_eq!(clean.get("Fiscal Year"), Some(&CellValue::Integer(2021)));
        assert_eq!(clean.get("Amount"), Some(&CellValue::Float(1234567.5)));
        assert_eq!(clean.get("State"), Some(&CellValue::from("12")));
    }

    #[test]
    fn unparseable_numbers_keep_raw_text() {
        let config = ExplorerConfig::default();
        let raw = row(&[
            ("Fiscal Year", "FY twenty".into()),
            ("Amount", "TBD".into()),
        ]);
        let clean = normalize_record(&raw, &config);
        assert_eq!(clean.get("Fiscal Year"), Some(&CellValue::from("FY twenty")));
        assert_eq!(clean.get("Amount"), Some(&CellValue::from("TBD")));

        let blank = normalize_record(&row(&[("Amount", "".into())]), &config);
        assert_eq!(blank.get("Amount"), Some(&CellValue::from("")));
    }

    #[test]
    fn non_finite_values_are_not_numbers() {
        assert_eq!(parse_currency("inf"), None);
        assert_eq!(parse_currency("NaN"), None);
        assert_eq!(parse_integer("1e400"), None);
        assert_eq!(parse_currency("£ 12"), Some(12.0));
        assert_eq!(parse_integer("2019.9"), Some(2019));
    }

    #[test]
    fn out_of_range_years_keep_raw_value() {
        assert_eq!(parse_integer("1e30"), None);
        assert_eq!(parse_integer("-1e19"), None);
        assert_eq!(coerce_integer(&"1e30".into()), CellValue::from("1e30"));
        assert_eq!(coerce_integer(&CellValue::Float(1e30)), CellValue::Float(1e30));
        assert_eq!(coerce_integer(&CellValue::Float(f64::NAN)).as_f64(), None);
        assert_eq!(coerce_integer(&CellValue::Float(-2020.5)), CellValue::Integer(-2020));
    }

    #[test]
    fn colliding_headers_keep_the_later_column() {
        let config = ExplorerConfig::default();
        let raw = row(&[
            ("Agency ", "FIRST".into()),
            ("Project Title", "T".into()),
            ("Agency", "SECOND".into()),
        ]);
        let clean = normalize_record(&raw, &config);
        assert_eq!(clean.get("Agency"), Some(&CellValue::from("SECOND")));
        assert_eq!(
            clean.columns().cloned().collect::<Vec<_>>(),
            vec!["Agency", "Project Title"]
        );
    }

    #[test]
    fn normalization_is_idempotent() {
        let config = ExplorerConfig::default();
        let raw = vec![
            row(&[
                (" Fiscal  Year ", "2019.7".into()),
                ("Amount", "€ 5,000".into()),
                ("Agency", " NIH ".into()),
            ]),
            row(&[("Fiscal Year", "n/a".into()), ("Amount", CellValue::Integer(12))]),
        ];
        let once = normalize_records(&raw, &config);
        let twice = normalize_records(&once, &config);
        assert_eq!(once, twice);
        assert_eq!(once[1].get("Amount"), Some(&CellValue::Float(12.0)));
    }
}
