use std::collections::{BTreeMap, BTreeSet};

use log::warn;
use serde::{Deserialize, Serialize};

use super::model::{CellValue, Record};
use super::normalize::{amount_value, year_value};
use super::text::{fold, format_usd};
use crate::config::ExplorerConfig;

// ---------------------------------------------------------------------------
// Filter state: selected values per column plus numeric ranges
// ---------------------------------------------------------------------------

/// Closed interval `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn new(min: f64, max: f64) -> Self {
        Range { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

/// A range as handed over by a range control: either `{ "min": a, "max": b }`
/// or `[a, b]`. Missing bounds are tolerated and make the range inert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeInput {
    Bounds { min: Option<f64>, max: Option<f64> },
    Pair(Vec<Option<f64>>),
}

impl RangeInput {
    /// The interval, or `None` when either bound is missing or not finite.
    pub fn bounds(&self) -> Option<Range> {
        let (min, max) = match self {
            RangeInput::Bounds { min, max } => (*min, *max),
            RangeInput::Pair(pair) => (
                pair.first().copied().flatten(),
                pair.get(1).copied().flatten(),
            ),
        };
        match (min, max) {
            (Some(min), Some(max)) if min.is_finite() && max.is_finite() => {
                Some(Range::new(min, max))
            }
            _ => None,
        }
    }

    /// Whether `value` passes. Inert ranges pass everything, including
    /// records without a numeric value.
    pub fn admits(&self, value: Option<f64>) -> bool {
        match self.bounds() {
            None => true,
            Some(range) => value.is_some_and(|v| range.contains(v)),
        }
    }
}

impl From<Range> for RangeInput {
    fn from(range: Range) -> Self {
        RangeInput::Bounds {
            min: Some(range.min),
            max: Some(range.max),
        }
    }
}

impl From<(f64, f64)> for RangeInput {
    fn from((min, max): (f64, f64)) -> Self {
        RangeInput::Pair(vec![Some(min), Some(max)])
    }
}

/// Current user selection.
///
/// A column that is absent from `selected`, or maps to an empty set, is not
/// constrained. An absent range is not constrained either.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Filters {
    pub selected: BTreeMap<String, BTreeSet<String>>,
    pub fiscal_year: Option<RangeInput>,
    pub amount: Option<RangeInput>,
}

impl Filters {
    /// Back to "no constraint" on every dimension.
    pub fn reset(&mut self) {
        *self = Filters::default();
    }

    pub fn selection(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.selected.get(column).filter(|s| !s.is_empty())
    }

    /// Add `value` if absent, remove it if present.
    pub fn toggle(&mut self, column: &str, value: &str) {
        let selected = self.selected.entry(column.to_string()).or_default();
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    pub fn is_inert(&self) -> bool {
        self.selected.values().all(BTreeSet::is_empty)
            && self.fiscal_year.is_none()
            && self.amount.is_none()
    }
}

// ---------------------------------------------------------------------------
// GrantIndex – per-record data prepared once for repeated evaluation
// ---------------------------------------------------------------------------

/// A categorical field after folding. Whether a record holds one value or a
/// list is decided here once.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(String),
    List(Vec<String>),
}

impl FieldValue {
    fn from_cell(cell: Option<&CellValue>) -> Self {
        match cell {
            Some(CellValue::List(items)) => {
                FieldValue::List(items.iter().map(|item| fold(item)).collect())
            }
            Some(other) => FieldValue::Scalar(fold(&other.to_string())),
            None => FieldValue::Scalar(String::new()),
        }
    }

    /// Equality against any of the folded `wanted` values.
    fn matches_any(&self, wanted: &BTreeSet<String>) -> bool {
        match self {
            FieldValue::Scalar(v) => wanted.contains(v),
            FieldValue::List(items) => items.iter().any(|v| wanted.contains(v)),
        }
    }
}

#[derive(Debug, Clone)]
struct IndexedGrant {
    categories: BTreeMap<String, FieldValue>,
    year: Option<f64>,
    amount: Option<f64>,
    haystack: String,
}

/// Folded categorical values, numeric readings and search text for every
/// record, so evaluation does no per-call string preparation.
#[derive(Debug, Clone)]
pub struct GrantIndex {
    columns: BTreeSet<String>,
    grants: Vec<IndexedGrant>,
}

impl GrantIndex {
    pub fn new(records: &[Record], config: &ExplorerConfig) -> Self {
        let grants = records
            .iter()
            .map(|record| IndexedGrant {
                categories: config
                    .filterable_columns
                    .iter()
                    .map(|col| (col.clone(), FieldValue::from_cell(record.get(col))))
                    .collect(),
                year: record.get(&config.year_column).and_then(year_value),
                amount: record.get(&config.amount_column).and_then(amount_value),
                haystack: search_haystack(record, &config.searchable_fields),
            })
            .collect();
        GrantIndex {
            columns: config.filterable_columns.iter().cloned().collect(),
            grants,
        }
    }

    pub fn len(&self) -> usize {
        self.grants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grants.is_empty()
    }

    /// Indices of the records passing every active predicate, with the
    /// funding total over them.
    pub fn evaluate(&self, filters: &Filters, query: &str) -> QueryResult {
        let selections: Vec<(&str, BTreeSet<String>)> = filters
            .selected
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .filter_map(|(col, values)| {
                if !self.columns.contains(col) {
                    warn!("ignoring selection on non-filterable column {col:?}");
                    return None;
                }
                Some((col.as_str(), values.iter().map(|v| fold(v)).collect()))
            })
            .collect();
        let tokens = search_tokens(query);

        let indices: Vec<usize> = self
            .grants
            .iter()
            .enumerate()
            .filter(|(_, grant)| {
                selections.iter().all(|(col, wanted)| {
                    grant
                        .categories
                        .get(*col)
                        .map_or(true, |field| field.matches_any(wanted))
                })
            })
            .filter(|(_, grant)| {
                filters
                    .fiscal_year
                    .as_ref()
                    .map_or(true, |range| range.admits(grant.year))
            })
            .filter(|(_, grant)| {
                filters
                    .amount
                    .as_ref()
                    .map_or(true, |range| range.admits(grant.amount))
            })
            .filter(|(_, grant)| tokens.iter().all(|t| grant.haystack.contains(t.as_str())))
            .map(|(i, _)| i)
            .collect();

        let total_funding = indices
            .iter()
            .map(|&i| self.grants[i].amount.unwrap_or(0.0))
            .sum();

        QueryResult {
            indices,
            total_funding,
        }
    }
}

/// Folded, space-joined text of the non-empty searchable fields.
pub fn search_haystack(record: &Record, fields: &[String]) -> String {
    let joined = fields
        .iter()
        .filter_map(|field| record.text(field))
        .collect::<Vec<_>>()
        .join(" ");
    fold(&joined)
}

/// Folded whitespace-separated tokens of a search query.
pub fn search_tokens(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(fold)
        .filter(|t| !t.is_empty())
        .collect()
}

// ---------------------------------------------------------------------------
// QueryResult – the derived view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Positions of the matching records, in input order.
    pub indices: Vec<usize>,
    /// Sum of the numeric amounts of the matching records.
    pub total_funding: f64,
}

impl QueryResult {
    pub fn count(&self) -> usize {
        self.indices.len()
    }

    pub fn formatted_total(&self) -> String {
        format_usd(self.total_funding)
    }

    /// The matching records out of the set this result was computed from.
    pub fn records<'a>(&'a self, records: &'a [Record]) -> impl Iterator<Item = &'a Record> + 'a {
        self.indices.iter().filter_map(move |&i| records.get(i))
    }
}

/// Evaluate with the default column configuration.
pub fn evaluate(records: &[Record], filters: &Filters, query: &str) -> QueryResult {
    GrantIndex::new(records, &ExplorerConfig::default()).evaluate(filters, query)
}
