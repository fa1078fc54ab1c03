//! Ring-trial pipeline: load both reports, count, join, sweep.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use log::info;

use crate::config::RingTrialConfig;
use crate::data::loader::load_table;
use crate::data::{combined_counts, filter_by_coverage, sweep, CountTable, CoverageMatrix, Table};
use crate::labels::relabel_samples;

/// Everything the pipeline produces, kept for the viewer and exports.
#[derive(Debug, Clone)]
pub struct RingTrial {
    pub config: RingTrialConfig,
    /// Precursor and peptide counts from the precursor report.
    pub counts: CountTable,
    /// Protein report with relabelled samples and joined counts.
    pub joined: Table,
    pub matrix: CoverageMatrix,
}

impl RingTrial {
    /// Run the pipeline on the two reports named by `config`.
    pub fn run(config: RingTrialConfig) -> Result<Self> {
        config.validate()?;
        let start = Instant::now();

        let precursors = load_table(&config.precursor_path()).context("precursor report")?;
        let proteins = load_table(&config.protein_path()).context("protein report")?;
        let trial = Self::from_tables(config, &precursors, &proteins)?;

        info!("Finished in {:.2?}", start.elapsed());
        Ok(trial)
    }

    /// Run the pipeline on already loaded reports.
    pub fn from_tables(config: RingTrialConfig, precursors: &Table, proteins: &Table) -> Result<Self> {
        let columns = &config.columns;
        let counts = combined_counts(precursors, &columns.marker, &columns.id, &columns.peptide)
            .context("counting precursors and peptides")?;

        let proteins = relabel_samples(proteins, &columns.marker, &config.labeler()?)
            .context("relabelling protein report samples")?;
        let joined = proteins
            .join_counts(&counts, &columns.id)
            .context("joining counts onto protein report")?;
        info!(
            "Joined counts onto {} protein groups ({} columns)",
            joined.n_rows(),
            joined.n_columns()
        );

        let matrix = sweep(&joined, &config.sweep.percents, &config.sweep.n_pep_mins)?;
        Ok(RingTrial {
            config,
            counts,
            joined,
            matrix,
        })
    }

    /// Protein rows retained at one threshold combination.
    pub fn filtered(&self, percent: u32, n_pep_min: u32) -> Result<Table> {
        Ok(filter_by_coverage(&self.joined, percent, n_pep_min)?)
    }

    /// Write the coverage matrix as pretty-printed JSON.
    pub fn write_matrix_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        serde_json::to_writer_pretty(file, &self.matrix).context("serializing coverage matrix")
    }
}
