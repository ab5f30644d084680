/// Data layer: core types, loading, and filtering.
///
/// Architecture:
/// ```text
///  .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → SweepTable
///   └──────────┘
///        │
///        ▼
///   ┌────────────┐
///   │ SweepTable │  frequency axis, Vec<Sweep> per timestamp
///   └────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  date substring per column, frequency bins per sweep
///   └──────────┘
/// ```

pub mod loader;
pub mod model;
pub mod filter;
