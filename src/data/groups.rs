use super::model::Table;

/// Sample columns: every column whose name contains `marker`, in table order.
///
/// No match yields an empty list rather than an error.
pub fn discover(table: &Table, marker: &str) -> Vec<String> {
    table.select_columns(|name| name.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    fn table(names: &[&str]) -> Table {
        Table::new(
            names
                .iter()
                .map(|&n| Column::new(n, vec![Value::Null]))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_discover_keeps_table_order() {
        let t = table(&["Protein.Group", "D:/MS_data/run_B.raw", "Stripped.Sequence", "D:/MS_data/run_A.raw"]);
        assert_eq!(
            discover(&t, "MS_data"),
            vec!["D:/MS_data/run_B.raw".to_string(), "D:/MS_data/run_A.raw".to_string()]
        );
    }

    #[test]
    fn test_discover_without_match_is_empty() {
        let t = table(&["Protein.Group", "Genes"]);
        assert!(discover(&t, "MS_data").is_empty());
    }
}
