use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use super::explode::explode_cell;
use super::model::{OptionsMap, Record};
use super::text::{collapse_whitespace, locale_cmp};
use crate::config::ExplorerConfig;

/// Build the selection vocabulary for every filterable column present in
/// `records`. Free-text and money columns are left out by the allow-list.
pub fn extract_options(records: &[Record], config: &ExplorerConfig) -> OptionsMap {
    let mut sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for record in records {
        for (column, cell) in record.iter() {
            if !config.is_filterable(column) {
                continue;
            }
            let values = sets.entry(column.clone()).or_default();
            for part in explode_cell(cell, column, &config.delimiters) {
                let value = collapse_whitespace(&part);
                if !value.is_empty() {
                    values.insert(value);
                }
            }
        }
    }

    sets.into_iter()
        .map(|(column, values)| {
            let mut sorted: Vec<String> = values.into_iter().collect();
            sorted.sort_by(|a, b| locale_cmp(a, b));
            debug!("{column}: {} options", sorted.len());
            (column, sorted)
        })
        .collect()
}
