//! Column designations for ingestion and querying.
//!
//! The defaults describe the grant workbook; a JSON file can override any
//! field, e.g. to search an extra column.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Columns that become selection vocabularies.
pub const FILTERABLE_COLUMNS: &[&str] = &[
    "Agency",
    "Agency IC",
    "Objective - General",
    "Objective - Specific",
    "Intervention",
    "Readiness",
    "State",
];

/// Columns concatenated into the free-text search haystack, in order.
pub const SEARCHABLE_FIELDS: &[&str] = &[
    "Project Title",
    "Project Abstract",
    "Agency",
    "Agency IC",
    "Project Number",
    "Objective - General",
    "Objective - Specific",
    "Intervention",
    "Readiness",
    "PI",
    "Organization",
    "State",
    "Mechanism",
];

/// Full explorer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Integer-like column (truncated to whole years).
    pub year_column: String,
    /// Currency-like column (summed into the funding total).
    pub amount_column: String,
    /// Allow-list of columns that get an options vocabulary and a
    /// multi-select filter. Matched against normalized headers.
    pub filterable_columns: Vec<String>,
    /// Columns searched by the free-text query.
    pub searchable_fields: Vec<String>,
    /// Which characters split a multi-valued cell, per column.
    pub delimiters: DelimiterPolicy,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            year_column: "Fiscal Year".to_string(),
            amount_column: "Amount".to_string(),
            filterable_columns: FILTERABLE_COLUMNS.iter().map(|c| c.to_string()).collect(),
            searchable_fields: SEARCHABLE_FIELDS.iter().map(|c| c.to_string()).collect(),
            delimiters: DelimiterPolicy::default(),
        }
    }
}

impl ExplorerConfig {
    /// Read a JSON configuration file. Missing fields keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn is_filterable(&self, column: &str) -> bool {
        self.filterable_columns.iter().any(|c| c == column)
    }
}

// ---------------------------------------------------------------------------
// DelimiterPolicy – column → split characters
// ---------------------------------------------------------------------------

/// A column-name fragment and the delimiters used for matching columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelimiterRule {
    /// Lower-case substring looked up in the lower-cased column name.
    pub contains: String,
    pub delimiters: Vec<char>,
}

/// Lookup table from column name to the characters that separate values in
/// a multi-valued cell. The first matching rule wins; otherwise `default`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimiterPolicy {
    /// Comma is left out so `Clinical (Phase I, II, FS)`-style free text
    /// survives in columns that do not hold lists.
    pub default: Vec<char>,
    pub rules: Vec<DelimiterRule>,
}

impl Default for DelimiterPolicy {
    fn default() -> Self {
        let with_comma = vec![',', ';', '|', '\n'];
        Self {
            default: vec![';', '|', '\n'],
            rules: ["agency ic", "objective", "intervention"]
                .into_iter()
                .map(|fragment| DelimiterRule {
                    contains: fragment.to_string(),
                    delimiters: with_comma.clone(),
                })
                .collect(),
        }
    }
}

impl DelimiterPolicy {
    pub fn delimiters_for(&self, column: &str) -> &[char] {
        let lower = column.to_lowercase();
        self.rules
            .iter()
            .find(|rule| lower.contains(rule.contains.as_str()))
            .map(|rule| rule.delimiters.as_slice())
            .unwrap_or(&self.default)
    }
}
