use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::config::ExplorerConfig;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value.
///
/// Serialized as the bare JSON value, so a record written to `grants.json`
/// reads the same as the spreadsheet row it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged, from = "JsonValue")]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    /// A cell that already holds several values (JSON arrays, Parquet lists).
    List(Vec<String>),
}

impl From<JsonValue> for CellValue {
    fn from(val: JsonValue) -> Self {
        match val {
            JsonValue::Null => CellValue::Null,
            JsonValue::Bool(b) => CellValue::Bool(b),
            JsonValue::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Integer(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::Text(n.to_string())
                }
            }
            JsonValue::String(s) => CellValue::Text(s),
            JsonValue::Array(items) => {
                CellValue::List(items.iter().map(json_to_text).collect())
            }
            other => CellValue::Text(other.to_string()),
        }
    }
}

/// Stringify a JSON scalar the way a spreadsheet would display it.
pub(crate) fn json_to_text(val: &JsonValue) -> String {
    match val {
        JsonValue::Null => String::new(),
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::List(items) => write!(f, "{}", items.join(",")),
        }
    }
}

impl CellValue {
    /// `Null`, blank text and empty lists carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::List(items) => items.is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of an already-coerced cell.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the grant sheet
// ---------------------------------------------------------------------------

/// One grant (one spreadsheet row): column name → cell, in sheet column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: IndexMap<String, CellValue>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.fields.get(column)
    }

    /// Set a column. An existing column keeps its position and takes the new value.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<CellValue>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Display text of a column, `None` when absent or blank.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column)
            .filter(|v| !v.is_blank())
            .map(|v| v.to_string())
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Filterable column → sorted atomic values offered for selection.
pub type OptionsMap = BTreeMap<String, Vec<String>>;

/// Inclusive bounds observed in a numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Domain {
    pub min: f64,
    pub max: f64,
}

// ---------------------------------------------------------------------------
// GrantDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Cleaned records plus the indices derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct GrantDataset {
    /// All grants (rows), already normalized.
    pub records: Vec<Record>,
    /// Sorted union of the column names across all rows.
    pub column_names: Vec<String>,
    /// Selection vocabulary per filterable column.
    pub options: OptionsMap,
    /// Observed fiscal-year bounds, used to seed the year range control.
    pub year_domain: Option<Domain>,
    /// Observed amount bounds, used to seed the funding range control.
    pub amount_domain: Option<Domain>,
}

impl GrantDataset {
    /// Assemble a dataset from cleaned records and their options map.
    pub fn from_parts(records: Vec<Record>, options: OptionsMap, config: &ExplorerConfig) -> Self {
        let column_names: Vec<String> = records
            .iter()
            .flat_map(|r| r.columns().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let year_domain = numeric_domain(&records, &config.year_column);
        let amount_domain = numeric_domain(&records, &config.amount_column);

        GrantDataset {
            records,
            column_names,
            options,
            year_domain,
            amount_domain,
        }
    }

    /// Normalize raw rows and extract their options in one pass.
    pub fn from_raw(rows: &[Record], config: &ExplorerConfig) -> Self {
        let records = super::normalize::normalize_records(rows, config);
        let options = super::options::extract_options(&records, config);
        Self::from_parts(records, options, config)
    }

    /// Number of grants.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Min/max over the numeric cells of `column`; `None` when no cell is numeric.
pub fn numeric_domain(records: &[Record], column: &str) -> Option<Domain> {
    records
        .iter()
        .filter_map(|r| r.get(column).and_then(CellValue::as_f64))
        .fold(None, |acc, v| match acc {
            None => Some(Domain { min: v, max: v }),
            Some(d) => Some(Domain {
                min: d.min.min(v),
                max: d.max.max(v),
            }),
        })
}
