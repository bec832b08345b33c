//! Data layer: core types, loading, and filtering.
//!
//! Architecture:
//! ```text
//!  sheet endpoint / .json / .csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse body → Vec<Row>
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  Dataset  │  header + rows, column layout from header names
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  route / status / date predicates → filtered Dataset
//!   └──────────┘
//! ```

pub mod filter;
pub mod loader;
pub mod model;
