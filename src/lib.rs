//! Faceted search over research-grant spreadsheets.
//!
//! Ingestion turns a messy sheet into cleaned [`Record`]s and an
//! [`OptionsMap`] of selectable values; the query engine filters the records
//! by selections, numeric ranges and free text and totals their funding.

pub mod config;
pub mod data;
pub mod error;
pub mod state;

pub use config::ExplorerConfig;
pub use data::filter::{evaluate, Filters, GrantIndex, QueryResult, Range, RangeInput};
pub use data::model::{CellValue, GrantDataset, OptionsMap, Record};
pub use error::{ArtifactError, ConfigError};
pub use state::ExplorerState;
