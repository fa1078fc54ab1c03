use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
    UInt32Array, UInt64Array,
};
use arrow::datatypes::DataType;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{Column, Table, Value};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a report table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.tsv` / `.txt` / `.tab` – tab-separated text with a header row
/// * `.csv`                  – comma-separated text with a header row
/// * `.parquet` / `.pq`      – Parquet file with flat columns
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "tsv" | "txt" | "tab" => load_delimited(path, b'\t'),
        "csv" => load_delimited(path, b','),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    info!(
        "Loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_columns(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited text loader
// ---------------------------------------------------------------------------

/// The first line supplies column names; every further line is one row.
/// Rows with a different field count fail the whole load.
fn load_delimited(path: &Path, delimiter: u8) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .context("opening delimited file")?;
    read_delimited(&mut reader)
}

/// Read a table from any `csv` reader (header row required).
pub fn read_delimited<R: std::io::Read>(reader: &mut csv::Reader<R>) -> Result<Table> {
    let headers: Vec<String> = reader
        .headers()
        .context("reading header row")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut fields: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (row_no, result) in reader.records().enumerate() {
        // Header is line 1.
        let record = result.with_context(|| format!("row {}", row_no + 2))?;
        for (col, field) in record.iter().enumerate() {
            fields[col].push(field.to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(fields)
        .map(|(name, fields)| Column::new(name, infer_column(fields)))
        .collect();
    Ok(Table::new(columns)?)
}

fn is_missing_token(s: &str) -> bool {
    matches!(s, "" | "NA" | "NaN" | "nan" | "N/A")
}

/// Decimal notation only: `inf`, `nan` and leading zeros (`00123`) are text.
fn is_plain_number(s: &str) -> bool {
    let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
    let has_digit = unsigned.chars().any(|c| c.is_ascii_digit());
    let plain_chars = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    let bytes = unsigned.as_bytes();
    let leading_zero = bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit();
    has_digit && plain_chars && !leading_zero && unsigned.parse::<f64>().is_ok()
}

/// One type per column: integer, float or bool when every non-missing cell
/// fits, text otherwise. Missing tokens are null in every column type.
fn infer_column(fields: Vec<String>) -> Vec<Value> {
    let present = || fields.iter().filter(|f| !is_missing_token(f));

    if present().all(|f| f.parse::<i64>().is_ok() && is_plain_number(f)) {
        fields
            .iter()
            .map(|f| f.parse::<i64>().map_or(Value::Null, Value::Integer))
            .collect()
    } else if present().all(|f| is_plain_number(f)) {
        fields
            .iter()
            .map(|f| f.parse::<f64>().map_or(Value::Null, Value::Float))
            .collect()
    } else if present().all(|f| f == "true" || f == "false") {
        fields
            .iter()
            .map(|f| match f.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::Null,
            })
            .collect()
    } else {
        fields
            .into_iter()
            .map(|f| if is_missing_token(&f) { Value::Null } else { Value::String(f) })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns (strings, integers, floats, bools).
/// Nested columns are rejected.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<Value>> = vec![Vec::new(); names.len()];
    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, col_values) in values.iter_mut().enumerate() {
            let array = batch.column(col_idx);
            for row in 0..batch.num_rows() {
                let value = extract_value(array, row)
                    .with_context(|| format!("column '{}'", names[col_idx]))?;
                col_values.push(value);
            }
        }
    }

    let columns = names
        .into_iter()
        .zip(values)
        .map(|(name, values)| Column::new(name, values))
        .collect();
    Ok(Table::new(columns)?)
}

// -- Arrow helpers --

/// Extract a single cell from an Arrow column at a given row.
fn extract_value(col: &Arc<dyn Array>, row: usize) -> Result<Value> {
    if col.is_null(row) {
        return Ok(Value::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => {
            let arr = col.as_any().downcast_ref::<StringArray>().context("expected StringArray")?;
            Value::String(arr.value(row).to_string())
        }
        DataType::LargeUtf8 => Value::String(col.as_string::<i64>().value(row).to_string()),
        DataType::Int32 => {
            let arr = col.as_any().downcast_ref::<Int32Array>().context("expected Int32Array")?;
            Value::Integer(i64::from(arr.value(row)))
        }
        DataType::Int64 => {
            let arr = col.as_any().downcast_ref::<Int64Array>().context("expected Int64Array")?;
            Value::Integer(arr.value(row))
        }
        DataType::UInt32 => {
            let arr = col.as_any().downcast_ref::<UInt32Array>().context("expected UInt32Array")?;
            Value::Integer(i64::from(arr.value(row)))
        }
        DataType::UInt64 => {
            let arr = col.as_any().downcast_ref::<UInt64Array>().context("expected UInt64Array")?;
            let v = arr.value(row);
            Value::Integer(i64::try_from(v).with_context(|| format!("{v} does not fit in i64"))?)
        }
        DataType::Float32 => {
            let arr = col.as_any().downcast_ref::<Float32Array>().context("expected Float32Array")?;
            Value::Float(f64::from(arr.value(row)))
        }
        DataType::Float64 => {
            let arr = col.as_any().downcast_ref::<Float64Array>().context("expected Float64Array")?;
            Value::Float(arr.value(row))
        }
        DataType::Boolean => {
            let arr = col.as_any().downcast_ref::<BooleanArray>().context("expected BooleanArray")?;
            Value::Bool(arr.value(row))
        }
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(text: &str) -> Result<Table> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .from_reader(text.as_bytes());
        read_delimited(&mut reader)
    }

    #[test]
    fn test_read_delimited_infers_types() {
        let table = read("Protein.Group\tStripped.Sequence\tMS_data_1\nP1\tAAA\t1.5e6\nP2\tCCK\t\n").unwrap();
        assert_eq!(table.n_rows(), 2);
        let col = table.column("MS_data_1").unwrap();
        assert_eq!(col.values, vec![Value::Float(1.5e6), Value::Null]);
        assert_eq!(table.column("Protein.Group").unwrap().values[0], Value::from("P1"));
    }

    fn column(fields: &[&str]) -> Vec<Value> {
        infer_column(fields.iter().map(|f| f.to_string()).collect())
    }

    #[test]
    fn test_missing_markers_become_null() {
        assert_eq!(
            column(&["", "NA", "NaN", "nan", "N/A", "42"]),
            vec![Value::Null, Value::Null, Value::Null, Value::Null, Value::Null, Value::Integer(42)]
        );
        assert_eq!(column(&["true", ""]), vec![Value::Bool(true), Value::Null]);
        assert_eq!(column(&["1", "2.5"]), vec![Value::Float(1.0), Value::Float(2.5)]);
    }

    #[test]
    fn test_identifier_column_keeps_text() {
        assert_eq!(
            column(&["00123", "NAN", "Inf", "42"]),
            vec![Value::from("00123"), Value::from("NAN"), Value::from("Inf"), Value::from("42")]
        );
        assert_eq!(column(&["inf", "1.0"]), vec![Value::from("inf"), Value::from("1.0")]);
    }

    #[test]
    fn test_identifier_tokens_survive_counting_and_writing() {
        let table = read(
            "Protein.Group\tStripped.Sequence\tMS_data_1\n\
             00123\tAAAK\t1.0\n\
             NAN\tCCDR\t2.0\n\
             Inf\tEEFK\t3.0\n",
        )
        .unwrap();
        let counts = crate::data::combined_counts(&table, "MS_data", "Protein.Group", "Stripped.Sequence").unwrap();
        assert_eq!(counts.n_rows(), 3);
        for id in ["00123", "NAN", "Inf"] {
            assert_eq!(counts.count(&Value::from(id), "n Pre R01"), Some(1));
        }

        let mut buf = Vec::new();
        crate::data::writer::write_delimited(&mut buf, &counts.into_table().unwrap()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\n00123\t"));
        assert!(text.contains("\nInf\t"));
        assert!(text.contains("\nNAN\t"));
    }

    #[test]
    fn test_ragged_row_fails() {
        assert!(read("a\tb\n1\t2\n3\n").is_err());
    }

    #[test]
    fn test_duplicate_header_fails() {
        let err = read("a\ta\n1\t2\n").unwrap_err();
        assert!(format!("{err:#}").contains("duplicate column name 'a'"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = load_table(Path::new("report.xlsx")).unwrap_err();
        assert!(err.to_string().contains(".xlsx"));
    }
}
