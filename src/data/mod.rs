//! Data layer: core types, ingestion, and querying.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → raw rows
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  clean headers, coerce year / amount
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │ options   │  explode multi-valued cells → OptionsMap
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ artifacts  │  grants.json + options.json
//!   └───────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  selections, ranges, search → matching indices + total
//!   └──────────┘
//! ```

pub mod artifacts;
pub mod explode;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;
pub mod options;
pub mod text;
