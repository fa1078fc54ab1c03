use log::debug;
use serde::{Deserialize, Serialize};

use super::error::TableError;
use super::filter::{covered_indices, Coverage};
use super::model::Table;

/// Number of retained rows for every (percent, n_pep_min) combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageMatrix {
    /// Row axis, in sweep order.
    pub percents: Vec<u32>,
    /// Column axis, in sweep order.
    pub n_pep_mins: Vec<u32>,
    /// `counts[i][j]` belongs to `percents[i]` and `n_pep_mins[j]`.
    pub counts: Vec<Vec<usize>>,
}

impl CoverageMatrix {
    /// Retained row count for one combination, if it was part of the sweep.
    pub fn get(&self, percent: u32, n_pep_min: u32) -> Option<usize> {
        let i = self.percents.iter().position(|&p| p == percent)?;
        let j = self.n_pep_mins.iter().position(|&n| n == n_pep_min)?;
        Some(self.counts[i][j])
    }

    /// Rows ordered by descending percent, as drawn on the heatmap y-axis.
    pub fn rows_descending(&self) -> Vec<(u32, &[usize])> {
        let mut rows: Vec<(u32, &[usize])> = self
            .percents
            .iter()
            .zip(self.counts.iter())
            .map(|(&p, row)| (p, row.as_slice()))
            .collect();
        rows.sort_by(|a, b| b.0.cmp(&a.0));
        rows
    }

    /// Largest count in the matrix, used to scale colours.
    pub fn max_count(&self) -> usize {
        self.counts.iter().flatten().copied().max().unwrap_or(0)
    }
}

/// Run the coverage filter for every combination of `percents` and `n_pep_mins`.
///
/// All thresholds are validated before any filtering starts.
pub fn sweep(table: &Table, percents: &[u32], n_pep_mins: &[u32]) -> Result<CoverageMatrix, TableError> {
    let grid = percents
        .iter()
        .map(|&p| {
            n_pep_mins
                .iter()
                .map(|&n| Coverage::new(p, n))
                .collect::<Result<Vec<_>, _>>()
        })
        .collect::<Result<Vec<_>, _>>()?;

    let counts = grid
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|coverage| {
                    let n = covered_indices(table, coverage).len();
                    debug!(
                        "percent={} n_pep_min={} -> {n} rows",
                        coverage.percent(),
                        coverage.n_pep_min()
                    );
                    n
                })
                .collect()
        })
        .collect();

    Ok(CoverageMatrix {
        percents: percents.to_vec(),
        n_pep_mins: n_pep_mins.to_vec(),
        counts,
    })
}
