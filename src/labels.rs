//! Human-readable sample labels for report column headers.
//!
//! DIA-NN style matrices name each sample column after the raw file it was
//! searched from, e.g. `D:\MS_data\CSF_ringtrial_R01.raw`. The labeler keeps
//! the first capture group of a configurable pattern.

use regex::Regex;

use crate::data::{groups::discover, Table, TableError};

/// Strips directory prefixes and raw-file suffixes.
pub const DEFAULT_LABEL_PATTERN: &str =
    r"^(?:.*[\\/])?(.+?)(?i:\.(?:raw|d|mzml|wiff|dia))?$";

#[derive(Debug, Clone)]
pub struct SampleLabeler {
    pattern: Regex,
}

impl SampleLabeler {
    /// Compile `pattern`; it must contain at least one capture group.
    pub fn new(pattern: &str) -> Result<Self, TableError> {
        let invalid = |reason: String| TableError::InvalidPattern {
            pattern: pattern.to_string(),
            reason,
        };
        let regex = Regex::new(pattern).map_err(|e| invalid(e.to_string()))?;
        if regex.captures_len() < 2 {
            return Err(invalid("pattern has no capture group".to_string()));
        }
        Ok(SampleLabeler { pattern: regex })
    }

    /// Label for a column name. Names the pattern does not match are kept.
    pub fn label(&self, name: &str) -> String {
        self.pattern
            .captures(name)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
            .filter(|label| !label.is_empty())
            .unwrap_or(name)
            .to_string()
    }
}

impl Default for SampleLabeler {
    fn default() -> Self {
        SampleLabeler {
            pattern: Regex::new(DEFAULT_LABEL_PATTERN).expect("default label pattern is valid"),
        }
    }
}

/// Rename every sample column (name contains `marker`) to its label.
/// Fails with [`TableError::DuplicateColumn`] when two labels collide.
pub fn relabel_samples(
    table: &Table,
    marker: &str,
    labeler: &SampleLabeler,
) -> Result<Table, TableError> {
    let samples = discover(table, marker);
    table.rename_columns(|name| {
        if samples.iter().any(|s| s == name) {
            labeler.label(name)
        } else {
            name.to_string()
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Column, Value};

    #[test]
    fn test_default_labels() {
        let labeler = SampleLabeler::default();
        assert_eq!(labeler.label(r"D:\MS_data\CSF_ringtrial_R01.raw"), "CSF_ringtrial_R01");
        assert_eq!(labeler.label("/data/MS_data/run_B.mzML"), "run_B");
        assert_eq!(labeler.label("/data/MS_data/run_C.d"), "run_C");
        assert_eq!(labeler.label("Protein.Group"), "Protein.Group");
    }

    #[test]
    fn test_custom_pattern_requires_capture_group() {
        assert!(matches!(
            SampleLabeler::new(r"R\d+"),
            Err(TableError::InvalidPattern { .. })
        ));
        assert!(matches!(
            SampleLabeler::new(r"(unclosed"),
            Err(TableError::InvalidPattern { .. })
        ));
        let labeler = SampleLabeler::new(r"_(R\d+)\.raw$").unwrap();
        assert_eq!(labeler.label("MS_data/CSF_R07.raw"), "R07");
    }

    #[test]
    fn test_relabel_only_sample_columns() {
        let table = Table::new(vec![
            Column::new("Protein.Group", vec![Value::from("P1")]),
            Column::new("/x/MS_data/A.raw", vec![Value::Float(1.0)]),
            Column::new("/y/MS_data/B.raw", vec![Value::Float(2.0)]),
        ])
        .unwrap();
        let renamed = relabel_samples(&table, "MS_data", &SampleLabeler::default()).unwrap();
        assert_eq!(renamed.column_names(), vec!["Protein.Group", "A", "B"]);

        let clash = Table::new(vec![
            Column::new("/x/MS_data/A.raw", vec![Value::Float(1.0)]),
            Column::new("/y/MS_data/A.raw", vec![Value::Float(2.0)]),
        ])
        .unwrap();
        assert_eq!(
            relabel_samples(&clash, "MS_data", &SampleLabeler::default()).unwrap_err(),
            TableError::DuplicateColumn("A".into())
        );
    }
}
