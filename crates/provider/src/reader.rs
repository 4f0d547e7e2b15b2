//! In-memory cursor for drivers that fetch a result set eagerly.

use std::collections::VecDeque;

use dbkit_core::{ColumnInfo, DataType, DriverResult, Value};

use crate::traits::DataReader;

/// A [`DataReader`] over rows that were already fetched.
///
/// Columns whose type the driver could not determine (`DataType::Unknown`)
/// take the type of their first non-NULL value.
#[derive(Debug, Clone, Default)]
pub struct BufferedReader {
    columns: Vec<ColumnInfo>,
    pending: VecDeque<Vec<Value>>,
    current: Option<Vec<Value>>,
}

impl BufferedReader {
    /// Build a reader over `rows`, each holding one value per column.
    pub fn new(mut columns: Vec<ColumnInfo>, rows: Vec<Vec<Value>>) -> Self {
        for (ordinal, column) in columns.iter_mut().enumerate() {
            if column.data_type == DataType::Unknown {
                if let Some(found) = rows
                    .iter()
                    .filter_map(|row| row.get(ordinal).and_then(Value::data_type))
                    .next()
                {
                    column.data_type = found;
                }
            }
        }

        Self {
            columns,
            pending: rows.into(),
            current: None,
        }
    }

    /// Rows not read yet.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl DataReader for BufferedReader {
    fn columns(&self) -> &[ColumnInfo] {
        &self.columns
    }

    fn read(&mut self) -> DriverResult<bool> {
        self.current = self.pending.pop_front();
        Ok(self.current.is_some())
    }

    fn value(&self, ordinal: usize) -> Option<&Value> {
        self.current.as_ref().and_then(|row| row.get(ordinal))
    }
}
