use std::collections::{BTreeMap, HashMap};

use log::{debug, info};

use super::error::TableError;
use super::groups::discover;
use super::model::{CountTable, Table, Value};
use super::validate::validate_column;

/// Prefix of precursor count columns (`n Pre R01`, `n Pre R02`, ...).
pub const PRECURSOR_COUNT_PREFIX: &str = "n Pre";
/// Prefix of peptide count columns (`n Pep R01`, `n Pep R02`, ...).
pub const PEPTIDE_COUNT_PREFIX: &str = "n Pep";

/// Name of the count column for the `i`-th sample (1-based).
pub fn count_column_name(prefix: &str, i: usize) -> String {
    format!("{prefix} R0{i}")
}

/// Rows of `group` holding a measurement and an identifier.
fn measured_rows<'a>(
    ids: &'a [Value],
    group: &'a [Value],
) -> impl Iterator<Item = usize> + 'a {
    (0..ids.len()).filter(move |&row| !group[row].is_missing() && !ids[row].is_missing())
}

fn tally<'a, I>(ids: I) -> BTreeMap<Value, u32>
where
    I: IntoIterator<Item = &'a Value>,
{
    let mut counts = BTreeMap::new();
    for id in ids {
        *counts.entry(id.clone()).or_insert(0) += 1;
    }
    counts
}

/// Count measured precursors per identifier in every sample column.
///
/// Output columns are named `n Pre R0{i}` in the order of `groups`;
/// identifiers absent from a sample get a missing cell, not zero.
pub fn count_precursors(
    table: &Table,
    groups: &[String],
    id_column: &str,
) -> Result<CountTable, TableError> {
    let ids = &table.column(id_column)?.values;
    // Resolve every group up front so a bad name never yields a partial table.
    let group_columns = groups
        .iter()
        .map(|g| table.column(g))
        .collect::<Result<Vec<_>, _>>()?;

    let series = group_columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let counts = tally(measured_rows(ids, &col.values).map(|row| &ids[row]));
            debug!("{}: {} identifiers", col.name, counts.len());
            (count_column_name(PRECURSOR_COUNT_PREFIX, i + 1), counts)
        })
        .collect();

    Ok(CountTable::from_series(id_column, series))
}

/// Count distinct peptides per identifier in every sample column.
///
/// Within a sample, rows sharing `(id, peptide)` are collapsed to their last
/// occurrence before counting, so several precursors of one peptide count
/// once. Output columns are named `n Pep R0{i}`.
pub fn count_peptides(
    table: &Table,
    groups: &[String],
    id_column: &str,
    peptide_column: &str,
) -> Result<CountTable, TableError> {
    let ids = &table.column(id_column)?.values;
    let peptides = &table.column(peptide_column)?.values;
    let group_columns = groups
        .iter()
        .map(|g| table.column(g))
        .collect::<Result<Vec<_>, _>>()?;

    let series = group_columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let mut last: HashMap<(&Value, &Value), usize> = HashMap::new();
            for row in measured_rows(ids, &col.values) {
                last.insert((&ids[row], &peptides[row]), row);
            }
            let mut kept: Vec<usize> = last.into_values().collect();
            kept.sort_unstable();

            let counts = tally(kept.iter().map(|&row| &ids[row]));
            debug!("{}: {} identifiers, {} peptides", col.name, counts.len(), kept.len());
            (count_column_name(PEPTIDE_COUNT_PREFIX, i + 1), counts)
        })
        .collect();

    Ok(CountTable::from_series(id_column, series))
}

/// Precursor and peptide counts over the sample columns matching `marker`.
///
/// The result holds `2 × |groups|` count columns: all precursor counts
/// followed by all peptide counts, sample `i` matching in both halves.
pub fn combined_counts(
    table: &Table,
    marker: &str,
    id_column: &str,
    peptide_column: &str,
) -> Result<CountTable, TableError> {
    validate_column(table, id_column)?;
    validate_column(table, peptide_column)?;

    let groups = discover(table, marker);
    info!("Found {} sample columns matching '{marker}'", groups.len());

    let precursors = count_precursors(table, &groups, id_column)?;
    let peptides = count_peptides(table, &groups, id_column, peptide_column)?;
    let combined = precursors.outer_join(&peptides)?;
    info!(
        "Counted {} identifiers over {} samples",
        combined.n_rows(),
        groups.len()
    );
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Column;

    fn strings(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&s| Value::from(s)).collect()
    }

    fn floats(values: &[Option<f64>]) -> Vec<Value> {
        values
            .iter()
            .map(|v| v.map_or(Value::Null, Value::Float))
            .collect()
    }

    #[test]
    fn test_precursor_count_skips_missing() {
        let table = Table::new(vec![
            Column::new("Protein.Group", strings(&["P1", "P1", "P2"])),
            Column::new("MS_data_1", floats(&[Some(5.0), None, Some(7.0)])),
        ])
        .unwrap();

        let counts = count_precursors(&table, &["MS_data_1".to_string()], "Protein.Group").unwrap();
        assert_eq!(counts.column_names(), vec!["n Pre R01"]);
        assert_eq!(counts.count(&Value::from("P1"), "n Pre R01"), Some(1));
        assert_eq!(counts.count(&Value::from("P2"), "n Pre R01"), Some(1));
    }

    #[test]
    fn test_peptide_count_collapses_precursors() {
        let table = Table::new(vec![
            Column::new("Protein.Group", strings(&["P1", "P1", "P1", "P2"])),
            Column::new("Stripped.Sequence", strings(&["AAA", "AAA", "CCK", "AAA"])),
            Column::new("MS_data_1", floats(&[Some(5.0), Some(6.0), Some(1.0), Some(2.0)])),
        ])
        .unwrap();
        let groups = vec!["MS_data_1".to_string()];

        let peptides = count_peptides(&table, &groups, "Protein.Group", "Stripped.Sequence").unwrap();
        assert_eq!(peptides.count(&Value::from("P1"), "n Pep R01"), Some(2));
        assert_eq!(peptides.count(&Value::from("P2"), "n Pep R01"), Some(1));

        let precursors = count_precursors(&table, &groups, "Protein.Group").unwrap();
        assert_eq!(precursors.count(&Value::from("P1"), "n Pre R01"), Some(3));
    }

    #[test]
    fn test_missing_id_column_fails_before_output() {
        let table = Table::new(vec![Column::new("MS_data_1", floats(&[Some(1.0)]))]).unwrap();
        let groups = vec!["MS_data_1".to_string()];

        assert!(matches!(
            count_precursors(&table, &groups, "Protein.Group"),
            Err(TableError::MissingColumn { .. })
        ));
        assert!(matches!(
            count_peptides(&table, &groups, "Protein.Group", "Stripped.Sequence"),
            Err(TableError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_missing_peptide_column_names_available_columns() {
        let table = Table::new(vec![
            Column::new("Protein.Group", strings(&["P1"])),
            Column::new("MS_data_1", floats(&[Some(1.0)])),
        ])
        .unwrap();
        let expected = TableError::MissingColumn {
            name: "Stripped.Sequence".to_string(),
            available: vec!["Protein.Group".to_string(), "MS_data_1".to_string()],
        };

        let groups = vec!["MS_data_1".to_string()];
        assert_eq!(
            count_peptides(&table, &groups, "Protein.Group", "Stripped.Sequence").unwrap_err(),
            expected
        );
        assert_eq!(
            combined_counts(&table, "MS_data", "Protein.Group", "Stripped.Sequence").unwrap_err(),
            expected
        );
    }

    #[test]
    fn test_combined_counts_outer_join() {
        let table = Table::new(vec![
            Column::new("Protein.Group", strings(&["P1", "P2", "P3", "P1"])),
            Column::new("Stripped.Sequence", strings(&["AAA", "CCK", "DDR", "EEK"])),
            Column::new("MS_data_1", floats(&[Some(1.0), Some(1.0), None, Some(1.0)])),
            Column::new("MS_data_2", floats(&[Some(1.0), None, Some(3.0), None])),
        ])
        .unwrap();

        let combined = combined_counts(&table, "MS_data", "Protein.Group", "Stripped.Sequence").unwrap();
        assert_eq!(combined.n_rows(), 3);
        assert_eq!(
            combined.column_names(),
            vec!["n Pre R01", "n Pre R02", "n Pep R01", "n Pep R02"]
        );
        let p3 = Value::from("P3");
        assert_eq!(combined.count(&p3, "n Pre R01"), None);
        assert_eq!(combined.count(&p3, "n Pep R01"), None);
        assert_eq!(combined.count(&p3, "n Pre R02"), Some(1));
        assert_eq!(combined.count(&Value::from("P1"), "n Pep R01"), Some(2));
    }

    #[test]
    fn test_zero_groups_gives_empty_counts() {
        let table = Table::new(vec![
            Column::new("Protein.Group", strings(&["P1"])),
            Column::new("Stripped.Sequence", strings(&["AAA"])),
        ])
        .unwrap();
        let combined = combined_counts(&table, "MS_data", "Protein.Group", "Stripped.Sequence").unwrap();
        assert!(combined.is_empty());
        assert!(combined.column_names().is_empty());
    }
}
