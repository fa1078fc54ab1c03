use super::error::TableError;
use super::model::Table;

/// Confirm that `name` is a column of `table` and return its position.
///
/// Call this before indexing a table by name so that a typo in a column
/// option fails fast, listing the names that are available.
pub fn validate_column(table: &Table, name: &str) -> Result<usize, TableError> {
    table.position(name).ok_or_else(|| TableError::MissingColumn {
        name: name.to_string(),
        available: table.column_names(),
    })
}

/// Check that an integer argument lies in `min..=max` (or `min..` when
/// `max` is `None`).
///
/// `None` is accepted only when `accept_none` is set, in which case it is
/// passed through unchanged.
pub fn check_bounded(
    name: &str,
    value: Option<i64>,
    min: i64,
    max: Option<i64>,
    accept_none: bool,
) -> Result<Option<i64>, TableError> {
    let mut expected = match max {
        Some(max) => format!("non-negative integer n, where {min}<=n<={max}"),
        None => format!("non-negative integer n, where n>={min}"),
    };
    if accept_none {
        expected.push_str(" or None");
    }
    let invalid = |shown: String| TableError::InvalidArgument {
        name: name.to_string(),
        value: shown,
        expected: expected.clone(),
    };

    match value {
        None if accept_none => Ok(None),
        None => Err(invalid("None".to_string())),
        Some(v) if v < min || max.is_some_and(|max| v > max) => Err(invalid(v.to_string())),
        Some(v) => Ok(Some(v)),
    }
}
