use std::collections::BTreeSet;

use grant_explorer::config::DelimiterPolicy;
use grant_explorer::data::explode::{explode_cell, explode_text};
use grant_explorer::data::loader::load_file;
use grant_explorer::data::normalize::normalize_records;
use grant_explorer::data::options::extract_options;
use grant_explorer::data::text::{collapse_whitespace, locale_cmp};
use grant_explorer::{CellValue, ExplorerConfig, GrantDataset, Record};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn row(cells: &[(&str, &str)]) -> Record {
    cells.iter().map(|(k, v)| (*k, CellValue::from(*v))).collect()
}

#[test]
fn currency_guard_keeps_amounts_whole() {
    let policy = DelimiterPolicy::default();
    assert_eq!(explode_text("$1,234,567", "Agency IC", &policy), vec!["$1,234,567"]);
}

#[test]
fn parenthesized_commas_are_not_split() {
    let policy = DelimiterPolicy::default();
    assert_eq!(
        explode_text("Clinical (Phase I, II, FS)", "Intervention", &policy),
        vec!["Clinical (Phase I, II, FS)"]
    );
}

#[test]
fn json_array_cell() {
    let policy = DelimiterPolicy::default();
    assert_eq!(
        explode_text(r#"["Drug","Device"]"#, "Intervention", &policy),
        vec!["Drug", "Device"]
    );
}

#[test]
fn dataset_from_a_messy_sheet() {
    let config = ExplorerConfig::default();
    let raw = vec![
        row(&[
            (" Fiscal  Year", "2,019"),
            ("Amount", "$250,000"),
            ("Agency", "NIH"),
            ("Agency  IC", "NCI, NIA"),
            ("Readiness", "Clinical (Phase I, II, FS)"),
            ("Project Title", "Biomarkers; early detection"),
        ]),
        row(&[
            ("Fiscal Year", "FY2020"),
            ("Amount", "pending"),
            ("Agency", "NIH "),
            ("Agency IC", r#"["NHLBI", "NCI"]"#),
            ("Readiness", "Preclinical | Basic"),
        ]),
    ];
    let ds = GrantDataset::from_raw(&raw, &config);

    assert_eq!(
        ds.column_names,
        vec!["Agency", "Agency IC", "Amount", "Fiscal Year", "Project Title", "Readiness"]
    );
    assert_eq!(ds.records[0].get("Fiscal Year"), Some(&CellValue::Integer(2019)));
    assert_eq!(ds.records[0].get("Amount"), Some(&CellValue::Float(250000.0)));
    assert_eq!(ds.records[1].get("Fiscal Year"), Some(&CellValue::from("FY2020")));
    assert_eq!(ds.records[1].get("Amount"), Some(&CellValue::from("pending")));

    assert_eq!(ds.options.keys().collect::<Vec<_>>(), vec!["Agency", "Agency IC", "Readiness"]);
    assert_eq!(ds.options["Agency"], vec!["NIH"]);
    assert_eq!(ds.options["Agency IC"], vec!["NCI", "NHLBI", "NIA"]);
    assert_eq!(
        ds.options["Readiness"],
        vec!["Basic", "Clinical (Phase I, II, FS)", "Preclinical"]
    );
    assert!(ds.year_domain.is_some());
}

#[test]
fn later_sheet_column_wins_a_header_collision() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grants.csv");
    std::fs::write(&path, "Agency ,Project Title,Agency\nFIRST,T,SECOND\n").unwrap();

    let rows = load_file(&path).unwrap();
    let ds = GrantDataset::from_raw(&rows, &ExplorerConfig::default());
    assert_eq!(ds.records[0].get("Agency"), Some(&CellValue::from("SECOND")));
    assert_eq!(
        serde_json::to_string(&ds.records[0]).unwrap(),
        r#"{"Agency":"SECOND","Project Title":"T"}"#
    );
    assert_eq!(ds.options["Agency"], vec!["SECOND"]);
}

#[test]
fn non_ascii_digits_are_not_a_numeric_literal() {
    let policy = DelimiterPolicy::default();
    assert_eq!(explode_text("١٢٣,٤٥٦", "Intervention", &policy), vec!["١٢٣", "٤٥٦"]);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn cell_text() -> impl Strategy<Value = String> {
    prop_oneof![
        "[A-Za-z ]{0,12}",
        "[A-Za-z]{1,6}( ?[;|,\n] ?[A-Za-z]{1,6}){0,3}",
        "[A-Za-z]{1,5} \\([A-Za-z, ]{0,8}\\)",
        "\\$?[1-9][0-9]{0,2}(,[0-9]{3}){0,2}",
        "\\[\"[A-Za-z ]{1,6}\"(, \"[A-Za-z ]{1,6}\"){0,2}\\]",
    ]
}

fn header() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Agency".to_string()),
        Just(" Agency  IC ".to_string()),
        Just("Objective -  General".to_string()),
        Just("Intervention".to_string()),
        Just("State".to_string()),
        Just("Fiscal Year".to_string()),
        Just("Amount".to_string()),
        Just("Project Title".to_string()),
    ]
}

fn raw_rows() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        prop::collection::vec((header(), cell_text()), 0..6)
            .prop_map(|cells| cells.into_iter().collect::<Record>()),
        0..12,
    )
}

proptest! {
    #[test]
    fn normalizing_twice_changes_nothing(rows in raw_rows()) {
        let config = ExplorerConfig::default();
        let once = normalize_records(&rows, &config);
        let twice = normalize_records(&once, &config);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn every_exploded_value_is_an_option(rows in raw_rows()) {
        let config = ExplorerConfig::default();
        let records = normalize_records(&rows, &config);
        let options = extract_options(&records, &config);

        for record in &records {
            for (column, cell) in record.iter() {
                if !config.is_filterable(column) {
                    prop_assert!(!options.contains_key(column));
                    continue;
                }
                let vocabulary = &options[column];
                for part in explode_cell(cell, column, &config.delimiters) {
                    prop_assert!(vocabulary.contains(&collapse_whitespace(&part)));
                }
            }
        }

        for values in options.values() {
            let unique: BTreeSet<&String> = values.iter().collect();
            prop_assert_eq!(unique.len(), values.len());
            prop_assert!(values.windows(2).all(|w| locale_cmp(&w[0], &w[1]).is_lt()));
            prop_assert!(values.iter().all(|v| *v == collapse_whitespace(v)));
        }
    }
}
