// ============================================================
// DATASET TYPES
// ============================================================
// Rows parsed from delimited text and their persisted form

use super::error::{AppError, Result};

/// One parsed input line: trimmed fields in file order
pub type Row = Vec<String>;

/// All rows read from one input file, one per line
pub type Dataset = Vec<Row>;

/// Borrow the first two fields of a row, the pair both the merge key and
/// the table columns are built from.
pub fn leading_pair(index: usize, row: &[String]) -> Result<(&str, &str)> {
    match row {
        [first, second, ..] => Ok((first.as_str(), second.as_str())),
        _ => Err(AppError::MalformedRow {
            index,
            fields: row.to_vec(),
        }),
    }
}

/// A row persisted in the relational store
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TableRow {
    /// Identity key assigned by the database
    pub id: i32,

    pub column1: Option<String>,

    pub column2: Option<String>,
}

/// One group of the pivot query: every `column1` value sharing a `column2`
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PivotGroup {
    pub column2: Option<String>,

    /// `column1` values in ascending order
    pub items: Vec<Option<String>>,
}

impl std::fmt::Display for PivotGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let items = self
            .items
            .iter()
            .map(|item| item.as_deref().unwrap_or("NULL"))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "{}: [{}]",
            self.column2.as_deref().unwrap_or("NULL"),
            items
        )
    }
}
