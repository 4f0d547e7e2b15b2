//! Raw tabular result buffer.
//!
//! A [`DataTable`] holds the columns and rows of one result set with no type
//! mapping applied. It is what `fill_table` returns and what the CLI prints.

use serde::{Deserialize, Serialize};

use crate::types::ColumnInfo;
use crate::value::Value;

/// Column metadata plus the rows of a result set, in cursor order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    columns: Vec<ColumnInfo>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    /// Create an empty table with the given columns.
    pub fn new(columns: Vec<ColumnInfo>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row. The row must have one value per column.
    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    /// Column metadata, in result order.
    pub fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    /// All rows, in cursor order.
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Ordinal of the first column with this exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Value at `row` for the named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|r| r.get(index))
    }
}
