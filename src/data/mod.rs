/// Data layer: table model, loading, counting, and coverage filtering.
///
/// Architecture:
/// ```text
///  .tsv / .csv / .parquet
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Table
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  counts   │  sample columns (groups) → CountTable
///   └──────────┘
///        │  join onto protein table
///        ▼
///   ┌──────────┐
///   │  filter   │  coverage thresholds → retained rows
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  sweep    │  every (percent, n_pep_min) → CoverageMatrix
///   └──────────┘
/// ```

pub mod counts;
pub mod error;
pub mod filter;
pub mod groups;
pub mod loader;
pub mod model;
pub mod sweep;
pub mod validate;
pub mod writer;

pub use counts::{combined_counts, count_peptides, count_precursors};
pub use error::TableError;
pub use filter::filter_by_coverage;
pub use groups::discover;
pub use model::{Column, CountColumn, CountTable, Table, Value};
pub use sweep::{sweep, CoverageMatrix};
pub use validate::{check_bounded, validate_column};
