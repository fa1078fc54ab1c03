use std::collections::{BTreeMap, HashMap};
use std::fmt;

use super::error::TableError;
use super::validate::validate_column;

// ---------------------------------------------------------------------------
// Value – a single cell of a report table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as read from a search-engine report.
/// Identifiers are grouping keys, so `Value` must be `Ord` and `Hash`.
#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can key BTreeMap / HashMap by Value --

// Equality follows `cmp`: NaN equals itself and `0.0 != -0.0`, as in `Hash`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Value::*;
        fn discriminant(v: &Value) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::String(s) => s.hash(state),
            Value::Integer(i) => i.hash(state),
            Value::Float(f) => f.to_bits().hash(state),
            Value::Bool(b) => b.hash(state),
            Value::Null => {}
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{s}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v:.4}"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Null => write!(f, "<null>"),
        }
    }
}

impl Value {
    /// Interpret the value as an `f64` for threshold comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) if !v.is_nan() => Some(*v),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// A measurement is missing when the cell is null or NaN.
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Text written to a delimited output field. Missing values become empty.
    pub fn to_field(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(v) if v.is_nan() => String::new(),
            Value::Float(v) => v.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null => String::new(),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Option<u32>> for Value {
    fn from(count: Option<u32>) -> Self {
        count.map_or(Value::Null, |c| Value::Integer(i64::from(c)))
    }
}

// ---------------------------------------------------------------------------
// Table – named, aligned columns
// ---------------------------------------------------------------------------

/// One named column of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Column {
            name: name.into(),
            values,
        }
    }
}

/// An in-memory table: ordered columns with unique names, aligned by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    index: HashMap<String, usize>,
    n_rows: usize,
}

impl Table {
    /// Build a table, rejecting duplicate names and ragged columns.
    pub fn new(columns: Vec<Column>) -> Result<Self, TableError> {
        let n_rows = columns.first().map_or(0, |c| c.values.len());
        let mut index = HashMap::with_capacity(columns.len());
        for (pos, col) in columns.iter().enumerate() {
            if col.values.len() != n_rows {
                return Err(TableError::RaggedColumns {
                    column: col.name.clone(),
                    expected: n_rows,
                    found: col.values.len(),
                });
            }
            if index.insert(col.name.clone(), pos).is_some() {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }
        Ok(Table {
            columns,
            index,
            n_rows,
        })
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Position of a column, if present.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Look up a column by name, failing with [`TableError::MissingColumn`].
    pub fn column(&self, name: &str) -> Result<&Column, TableError> {
        let pos = validate_column(self, name)?;
        Ok(&self.columns[pos])
    }

    /// Names of all columns accepted by `predicate`, in table order.
    pub fn select_columns<P>(&self, predicate: P) -> Vec<String>
    where
        P: Fn(&str) -> bool,
    {
        self.columns
            .iter()
            .filter(|c| predicate(&c.name))
            .map(|c| c.name.clone())
            .collect()
    }

    /// Return a copy with every column renamed through `rename`.
    pub fn rename_columns<F>(&self, mut rename: F) -> Result<Table, TableError>
    where
        F: FnMut(&str) -> String,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(rename(&c.name), c.values.clone()))
            .collect();
        Table::new(columns)
    }

    /// Return a new table holding only the given rows, in the given order.
    pub fn take_rows(&self, rows: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), rows.iter().map(|&r| c.values[r].clone()).collect()))
            .collect();
        Table {
            columns,
            index: self.index.clone(),
            n_rows: rows.len(),
        }
    }

    /// Left join of a count table onto this table by identifier.
    ///
    /// Every row of `self` is kept in order; identifiers without counts get
    /// `Null` cells in the appended count columns.
    pub fn join_counts(&self, counts: &CountTable, id_column: &str) -> Result<Table, TableError> {
        let ids = self.column(id_column)?;
        let lookup: HashMap<&Value, usize> = counts
            .ids
            .iter()
            .enumerate()
            .map(|(row, id)| (id, row))
            .collect();

        let mut columns = self.columns.clone();
        for count_col in &counts.columns {
            let values = ids
                .values
                .iter()
                .map(|id| {
                    lookup
                        .get(id)
                        .map_or(Value::Null, |&row| Value::from(count_col.counts[row]))
                })
                .collect();
            columns.push(Column::new(count_col.name.clone(), values));
        }
        Table::new(columns)
    }
}

// ---------------------------------------------------------------------------
// CountTable – per-identifier counts, one column per sample
// ---------------------------------------------------------------------------

/// One named count column. `None` marks an identifier absent from the sample.
#[derive(Debug, Clone, PartialEq)]
pub struct CountColumn {
    pub name: String,
    pub counts: Vec<Option<u32>>,
}

/// Counts keyed by identifier, ordered by identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct CountTable {
    pub id_column: String,
    pub ids: Vec<Value>,
    pub columns: Vec<CountColumn>,
}

impl CountTable {
    /// Align per-sample count series on the union of their identifiers.
    pub fn from_series(id_column: &str, series: Vec<(String, BTreeMap<Value, u32>)>) -> Self {
        let mut all_ids: Vec<Value> = series
            .iter()
            .flat_map(|(_, counts)| counts.keys().cloned())
            .collect();
        all_ids.sort();
        all_ids.dedup();

        let columns = series
            .into_iter()
            .map(|(name, counts)| CountColumn {
                name,
                counts: all_ids.iter().map(|id| counts.get(id).copied()).collect(),
            })
            .collect();

        CountTable {
            id_column: id_column.to_string(),
            ids: all_ids,
            columns,
        }
    }

    /// Outer join by identifier, concatenating the count columns.
    pub fn outer_join(&self, other: &CountTable) -> Result<CountTable, TableError> {
        let mut all_ids: Vec<Value> = self.ids.iter().chain(other.ids.iter()).cloned().collect();
        all_ids.sort();
        all_ids.dedup();

        let mut columns = Vec::with_capacity(self.columns.len() + other.columns.len());
        for table in [self, other] {
            let rows: HashMap<&Value, usize> =
                table.ids.iter().enumerate().map(|(row, id)| (id, row)).collect();
            for col in &table.columns {
                if columns.iter().any(|c: &CountColumn| c.name == col.name) {
                    return Err(TableError::DuplicateColumn(col.name.clone()));
                }
                let counts = all_ids
                    .iter()
                    .map(|id| rows.get(id).and_then(|&row| col.counts[row]))
                    .collect();
                columns.push(CountColumn {
                    name: col.name.clone(),
                    counts,
                });
            }
        }

        Ok(CountTable {
            id_column: self.id_column.clone(),
            ids: all_ids,
            columns,
        })
    }

    /// Number of identifiers.
    pub fn n_rows(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Count for `id` in `column`; `None` when either is absent or the cell is missing.
    pub fn count(&self, id: &Value, column: &str) -> Option<u32> {
        let row = self.ids.iter().position(|v| v == id)?;
        let col = self.columns.iter().find(|c| c.name == column)?;
        col.counts[row]
    }

    /// Convert into a plain [`Table`] with the identifier as first column.
    pub fn into_table(self) -> Result<Table, TableError> {
        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(self.id_column, self.ids));
        columns.extend(self.columns.into_iter().map(|c| {
            Column::new(c.name, c.counts.into_iter().map(Value::from).collect())
        }));
        Table::new(columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<Value> {
        values.iter().map(|&s| Value::from(s)).collect()
    }

    #[test]
    fn test_table_rejects_duplicates_and_ragged_columns() {
        let dup = Table::new(vec![
            Column::new("a", ids(&["x"])),
            Column::new("a", ids(&["y"])),
        ]);
        assert_eq!(dup.unwrap_err(), TableError::DuplicateColumn("a".into()));

        let ragged = Table::new(vec![
            Column::new("a", ids(&["x", "y"])),
            Column::new("b", ids(&["y"])),
        ]);
        assert!(matches!(ragged, Err(TableError::RaggedColumns { found: 1, .. })));
    }

    #[test]
    fn test_value_ordering_and_missing() {
        let mut values = vec![Value::from("b"), Value::Null, Value::from(2_i64), Value::from("a")];
        values.sort();
        assert_eq!(values, vec![Value::Null, Value::from(2_i64), Value::from("a"), Value::from("b")]);
        assert!(Value::Float(f64::NAN).is_missing());
        assert!(!Value::Float(0.0).is_missing());
        assert_eq!(Value::Float(f64::NAN).as_f64(), None);
    }

    #[test]
    fn test_float_equality_matches_hash_and_order() {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let hash = |v: &Value| {
            let mut hasher = DefaultHasher::new();
            v.hash(&mut hasher);
            hasher.finish()
        };

        let nan = Value::Float(f64::NAN);
        assert_eq!(nan, nan.clone());
        assert_eq!(hash(&nan), hash(&nan.clone()));

        let zero = Value::Float(0.0);
        let neg_zero = Value::Float(-0.0);
        assert_ne!(zero, neg_zero);
        assert_ne!(zero.cmp(&neg_zero), std::cmp::Ordering::Equal);

        let mut keys = HashMap::new();
        keys.insert(nan.clone(), 1);
        keys.insert(Value::Float(f64::NAN), 2);
        keys.insert(zero, 3);
        keys.insert(neg_zero, 4);
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[&nan], 2);
    }

    #[test]
    fn test_join_counts_keeps_left_rows() {
        let proteins = Table::new(vec![Column::new("Protein.Group", ids(&["P2", "P9", "P1"]))]).unwrap();
        let mut series = BTreeMap::new();
        series.insert(Value::from("P1"), 3);
        series.insert(Value::from("P2"), 1);
        let counts = CountTable::from_series("Protein.Group", vec![("n Pep R01".into(), series)]);

        let joined = proteins.join_counts(&counts, "Protein.Group").unwrap();
        assert_eq!(joined.n_rows(), 3);
        let col = joined.column("n Pep R01").unwrap();
        assert_eq!(col.values, vec![Value::Integer(1), Value::Null, Value::Integer(3)]);
    }

    #[test]
    fn test_outer_join_fills_missing() {
        let mut a = BTreeMap::new();
        a.insert(Value::from("P1"), 2);
        let mut b = BTreeMap::new();
        b.insert(Value::from("P2"), 5);
        let left = CountTable::from_series("id", vec![("n Pre R01".into(), a)]);
        let right = CountTable::from_series("id", vec![("n Pep R01".into(), b)]);

        let joined = left.outer_join(&right).unwrap();
        assert_eq!(joined.ids, ids(&["P1", "P2"]));
        assert_eq!(joined.count(&Value::from("P1"), "n Pre R01"), Some(2));
        assert_eq!(joined.count(&Value::from("P2"), "n Pre R01"), None);
        assert_eq!(joined.count(&Value::from("P2"), "n Pep R01"), Some(5));

        assert!(matches!(left.outer_join(&left), Err(TableError::DuplicateColumn(_))));
    }
}
