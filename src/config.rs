//! TOML configuration for the ring-trial pipeline.
//!
//! Every field has a default, so a config file only needs the values that
//! differ:
//!
//! ```toml
//! # pepcover.toml
//! [input]
//! folder = "/data/ringtrial"
//! precursor_file = "report_CSF_ringtrial.pr_matrix.tsv"
//! protein_file = "report_CSF_ringtrial.pg_matrix.tsv"
//!
//! [columns]
//! id = "Protein.Group"
//! peptide = "Stripped.Sequence"
//! marker = "MS_data"
//!
//! [sweep]
//! percents = [50, 60, 70, 80, 90, 100]
//! n_pep_mins = [1, 2, 3, 4, 5, 6, 7, 8, 9]
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::data::filter::{Coverage, N_PEP_MIN_RANGE, PERCENT_RANGE};
use crate::labels::{SampleLabeler, DEFAULT_LABEL_PATTERN};

/// Root configuration structure for pepcover.toml files.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RingTrialConfig {
    pub input: InputConfig,
    pub columns: ColumnConfig,
    pub labels: LabelConfig,
    pub sweep: SweepConfig,
}

/// Where the two reports live.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub folder: PathBuf,
    /// Precursor-level matrix (one row per precursor).
    pub precursor_file: String,
    /// Protein-level matrix (one row per protein group).
    pub protein_file: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig {
            folder: PathBuf::from("."),
            precursor_file: "report_CSF_ringtrial.pr_matrix.tsv".to_string(),
            protein_file: "report_CSF_ringtrial.pg_matrix.tsv".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ColumnConfig {
    /// Identifier column used as aggregation and join key.
    pub id: String,
    /// Peptide sequence column of the precursor report.
    pub peptide: String,
    /// Substring marking sample columns.
    pub marker: String,
}

impl Default for ColumnConfig {
    fn default() -> Self {
        ColumnConfig {
            id: "Protein.Group".to_string(),
            peptide: "Stripped.Sequence".to_string(),
            marker: "MS_data".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LabelConfig {
    /// Regex whose first capture group is the sample label.
    pub pattern: String,
}

impl Default for LabelConfig {
    fn default() -> Self {
        LabelConfig {
            pattern: DEFAULT_LABEL_PATTERN.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub percents: Vec<u32>,
    pub n_pep_mins: Vec<u32>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        SweepConfig {
            percents: (50..=100).step_by(10).collect(),
            n_pep_mins: (1..=9).collect(),
        }
    }
}

impl RingTrialConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string and validate it.
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Check every option once, before any file is read.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("columns.id", &self.columns.id),
            ("columns.peptide", &self.columns.peptide),
            ("columns.marker", &self.columns.marker),
            ("input.precursor_file", &self.input.precursor_file),
            ("input.protein_file", &self.input.protein_file),
        ] {
            if value.is_empty() {
                bail!("'{name}' must not be empty");
            }
        }
        if self.sweep.percents.is_empty() || self.sweep.n_pep_mins.is_empty() {
            bail!(
                "sweep needs at least one percent ({}..={}) and one n_pep_min ({}..={})",
                PERCENT_RANGE.0,
                PERCENT_RANGE.1,
                N_PEP_MIN_RANGE.0,
                N_PEP_MIN_RANGE.1
            );
        }
        for &percent in &self.sweep.percents {
            for &n_pep_min in &self.sweep.n_pep_mins {
                Coverage::new(percent, n_pep_min).context("invalid sweep configuration")?;
            }
        }
        self.labeler()?;
        Ok(())
    }

    pub fn labeler(&self) -> Result<SampleLabeler> {
        Ok(SampleLabeler::new(&self.labels.pattern)?)
    }

    pub fn precursor_path(&self) -> PathBuf {
        self.input.folder.join(&self.input.precursor_file)
    }

    pub fn protein_path(&self) -> PathBuf {
        self.input.folder.join(&self.input.protein_file)
    }
}
