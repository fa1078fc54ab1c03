use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::Table;

/// Write `table` as tab-separated text with a header row.
/// Missing cells are written as empty fields.
pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_delimited(file, table).with_context(|| format!("writing {}", path.display()))
}

pub fn write_delimited<W: Write>(out: W, table: &Table) -> Result<()> {
    let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_writer(out);
    writer.write_record(table.columns().iter().map(|c| c.name.as_str()))?;
    for row in 0..table.n_rows() {
        writer.write_record(table.columns().iter().map(|c| c.values[row].to_field()))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Column, Value};

    #[test]
    fn test_write_delimited() {
        let table = Table::new(vec![
            Column::new("Protein.Group", vec![Value::from("P1"), Value::from("P2")]),
            Column::new("n Pep R01", vec![Value::Integer(3), Value::Null]),
        ])
        .unwrap();

        let mut buf = Vec::new();
        write_delimited(&mut buf, &table).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "Protein.Group\tn Pep R01\nP1\t3\nP2\t\n"
        );
    }
}
