//! Data layer: core types, loading, lookups and aggregates.
//!
//! Architecture:
//! ```text
//!  .xlsx / .csv / .parquet   (one per country)
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  store    │  country registry → LoadReport { tables, missing }
//!   └──────────┘  (loader parses, results memoized per source)
//!        │
//!        ▼
//!   ┌──────────────────┐
//!   │ OccupationTable   │  rows + explicit YearAxis
//!   └──────────────────┘
//!        │
//!        ├──▶ index      find_row / search / common_titles
//!        ├──▶ stats      per-occupation point values + RiskTier
//!        └──▶ aggregate  per-country overview + rankings
//! ```

pub mod aggregate;
pub mod index;
pub mod loader;
pub mod model;
pub mod stats;
pub mod store;
pub mod years;
