//! Precursor and peptide counting for proteomics search-engine reports,
//! peptide-coverage filtering of protein groups, and coverage heatmaps for
//! ring trials.
pub mod color;
pub mod config;
pub mod data;
pub mod labels;
pub mod render;
pub mod ringtrial;

pub use config::RingTrialConfig;
pub use data::{CountTable, CoverageMatrix, Table, TableError, Value};
pub use ringtrial::RingTrial;
