use super::counts::PEPTIDE_COUNT_PREFIX;
use super::error::TableError;
use super::model::Table;
use super::validate::check_bounded;

/// Accepted range for the coverage percentage.
pub const PERCENT_RANGE: (u32, u32) = (10, 100);
/// Accepted range for the minimum peptide count per sample.
pub const N_PEP_MIN_RANGE: (u32, u32) = (1, 10);

// ---------------------------------------------------------------------------
// Coverage predicate
// ---------------------------------------------------------------------------

/// Validated coverage thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Coverage {
    percent: u32,
    n_pep_min: u32,
}

impl Coverage {
    pub fn new(percent: u32, n_pep_min: u32) -> Result<Self, TableError> {
        check_bounded(
            "percent",
            Some(i64::from(percent)),
            i64::from(PERCENT_RANGE.0),
            Some(i64::from(PERCENT_RANGE.1)),
            false,
        )?;
        check_bounded(
            "n_pep_min",
            Some(i64::from(n_pep_min)),
            i64::from(N_PEP_MIN_RANGE.0),
            Some(i64::from(N_PEP_MIN_RANGE.1)),
            false,
        )?;
        Ok(Coverage { percent, n_pep_min })
    }

    pub fn percent(&self) -> u32 {
        self.percent
    }

    pub fn n_pep_min(&self) -> u32 {
        self.n_pep_min
    }

    /// Samples that must reach `n_pep_min` out of `n_samples`, rounded down.
    pub fn required_samples(&self, n_samples: usize) -> usize {
        n_samples * self.percent as usize / 100
    }
}

/// Return indices of rows whose peptide counts reach `n_pep_min` in at least
/// `percent` % of the peptide count columns.
///
/// A missing count never reaches the minimum.
pub fn covered_indices(table: &Table, coverage: Coverage) -> Vec<usize> {
    let peptide_columns: Vec<_> = table
        .columns()
        .iter()
        .filter(|c| c.name.contains(PEPTIDE_COUNT_PREFIX))
        .collect();
    let required = coverage.required_samples(peptide_columns.len());
    let minimum = f64::from(coverage.n_pep_min);

    (0..table.n_rows())
        .filter(|&row| {
            let passing = peptide_columns
                .iter()
                .filter(|c| c.values[row].as_f64().is_some_and(|v| v >= minimum))
                .count();
            passing >= required
        })
        .collect()
}

/// Keep the rows of `table` meeting the coverage thresholds, in input order.
///
/// Fails with [`TableError::InvalidArgument`] when `percent` is outside
/// 10..=100 or `n_pep_min` outside 1..=10.
pub fn filter_by_coverage(table: &Table, percent: u32, n_pep_min: u32) -> Result<Table, TableError> {
    let coverage = Coverage::new(percent, n_pep_min)?;
    Ok(table.take_rows(&covered_indices(table, coverage)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    fn counts(values: &[Option<i64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Integer))
            .collect()
    }

    fn sample_table() -> Table {
        Table::new(vec![
            Column::new(
                "Protein.Group",
                ["P1", "P2", "P3", "P4"].iter().map(|&s| Value::from(s)).collect(),
            ),
            Column::new("n Pre R01", counts(&[Some(9), Some(9), Some(9), Some(9)])),
            Column::new("n Pep R01", counts(&[Some(3), Some(1), None, Some(5)])),
            Column::new("n Pep R02", counts(&[Some(2), Some(1), Some(4), Some(5)])),
            Column::new("n Pep R03", counts(&[Some(3), None, None, Some(1)])),
            Column::new("n Pep R04", counts(&[Some(1), Some(2), Some(4), Some(5)])),
        ])
        .unwrap()
    }

    fn ids(table: &Table) -> Vec<String> {
        table
            .column("Protein.Group")
            .unwrap()
            .values
            .iter()
            .map(|v| v.to_string())
            .collect()
    }

    #[test]
    fn test_filter_keeps_order() {
        let table = sample_table();
        // 4 peptide columns at 50 % -> 2 samples needed
        let filtered = filter_by_coverage(&table, 50, 2).unwrap();
        assert_eq!(ids(&filtered), vec!["P1", "P3", "P4"]);
        let filtered = filter_by_coverage(&table, 100, 1).unwrap();
        assert_eq!(ids(&filtered), vec!["P1", "P4"]);
    }

    #[test]
    fn test_required_samples_rounds_down() {
        let coverage = Coverage::new(60, 1).unwrap();
        assert_eq!(coverage.required_samples(4), 2);
        assert_eq!(coverage.required_samples(1), 0);
        assert_eq!(Coverage::new(100, 1).unwrap().required_samples(7), 7);
    }

    #[test]
    fn test_filter_rejects_out_of_range_arguments() {
        let table = sample_table();
        for (percent, n_pep_min, name) in [(5, 1, "percent"), (150, 1, "percent"), (50, 0, "n_pep_min"), (50, 20, "n_pep_min")] {
            match filter_by_coverage(&table, percent, n_pep_min) {
                Err(TableError::InvalidArgument { name: got, .. }) => assert_eq!(got, name),
                other => panic!("expected InvalidArgument for {name}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_filter_is_monotonic() {
        let table = sample_table();
        for percent in (10..=100).step_by(10) {
            let mut previous = usize::MAX;
            for n_pep_min in 1..=10 {
                let n = filter_by_coverage(&table, percent, n_pep_min).unwrap().n_rows();
                assert!(n <= previous);
                previous = n;
            }
        }
        for n_pep_min in 1..=10 {
            let mut previous = usize::MAX;
            for percent in (10..=100).step_by(10) {
                let n = filter_by_coverage(&table, percent, n_pep_min).unwrap().n_rows();
                assert!(n <= previous);
                previous = n;
            }
        }
    }
}
