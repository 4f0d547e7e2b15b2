//! Driver traits.
//!
//! A provider plugs a concrete database client into the engine by
//! implementing three traits:
//!
//! - [`ProviderFactory`]: creates connections and parameters
//! - [`Connection`]: open/close, transactions, command execution
//! - [`DataReader`]: forward-only cursor over one result set
//!
//! Every driver method returns [`DriverResult`]; the engine wraps failures in
//! `Error::Driver` without translating them.

use std::fmt;

use dbkit_core::{
    ColumnInfo, CommandKind, DataTable, DriverResult, Parameter, ParameterDirection, Value,
};

/// Handle for the transaction a connection currently has open.
///
/// Drivers mint ids from [`Connection::begin_transaction`]; the session
/// attaches the active id to every command it issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Wrap a driver-assigned id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// A command ready for execution.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec<'a> {
    /// SQL text or stored procedure name
    pub text: &'a str,
    /// How `text` is interpreted
    pub kind: CommandKind,
    /// Bound parameters
    pub parameters: &'a [Parameter],
    /// Ambient transaction, if the session has one
    pub transaction: Option<TransactionId>,
}

impl<'a> CommandSpec<'a> {
    /// A text command with no parameters and no transaction.
    pub fn text(text: &'a str) -> Self {
        Self {
            text,
            kind: CommandKind::Text,
            parameters: &[],
            transaction: None,
        }
    }
}

/// Forward-only cursor over one result set.
pub trait DataReader {
    /// Result columns, in order.
    fn columns(&self) -> &[ColumnInfo];

    /// Advance to the next row. Returns `false` once the cursor is exhausted.
    fn read(&mut self) -> DriverResult<bool>;

    /// Value of the current row at `ordinal`, `None` before the first
    /// successful [`read`](DataReader::read) or past the last column.
    fn value(&self, ordinal: usize) -> Option<&Value>;

    /// Number of columns.
    fn field_count(&self) -> usize {
        self.columns().len()
    }

    /// Name of the column at `ordinal`.
    fn column_name(&self, ordinal: usize) -> Option<&str> {
        self.columns().get(ordinal).map(|c| c.name.as_str())
    }
}

/// An open (or openable) connection to one database.
pub trait Connection: Send {
    /// Open the connection.
    fn open(&mut self) -> DriverResult<()>;

    /// Close the connection.
    fn close(&mut self) -> DriverResult<()>;

    /// Whether the connection is open.
    fn is_open(&self) -> bool;

    /// Start a transaction.
    fn begin_transaction(&mut self) -> DriverResult<TransactionId>;

    /// Commit the transaction.
    fn commit(&mut self, transaction: TransactionId) -> DriverResult<()>;

    /// Roll the transaction back.
    fn rollback(&mut self, transaction: TransactionId) -> DriverResult<()>;

    /// Execute a command and return a cursor over its result set.
    fn execute_reader<'c>(
        &'c mut self,
        command: &CommandSpec<'_>,
    ) -> DriverResult<Box<dyn DataReader + 'c>>;

    /// Execute a command and return the number of affected rows.
    fn execute_non_query(&mut self, command: &CommandSpec<'_>) -> DriverResult<u64>;

    /// Execute a command and return the first column of the first row.
    ///
    /// `None` when the result set has no rows; `Some(Value::Null)` when that
    /// cell is NULL.
    fn execute_scalar(&mut self, command: &CommandSpec<'_>) -> DriverResult<Option<Value>> {
        let mut reader = self.execute_reader(command)?;
        if reader.read()? {
            Ok(Some(reader.value(0).cloned().unwrap_or(Value::Null)))
        } else {
            Ok(None)
        }
    }

    /// Execute a command and buffer its whole result set.
    fn fill_table(&mut self, command: &CommandSpec<'_>) -> DriverResult<DataTable> {
        let mut reader = self.execute_reader(command)?;
        let mut table = DataTable::new(reader.columns().to_vec());
        let width = reader.field_count();
        while reader.read()? {
            let row = (0..width)
                .map(|i| reader.value(i).cloned().unwrap_or(Value::Null))
                .collect();
            table.push_row(row);
        }
        Ok(table)
    }
}

/// Entry point of a provider: builds its connections and parameters.
pub trait ProviderFactory: Send + Sync {
    /// Logical provider name.
    fn name(&self) -> &str;

    /// Create an unopened connection.
    fn create_connection(&self, connection_string: &str) -> DriverResult<Box<dyn Connection>>;

    /// Build a parameter in this provider's conventions.
    ///
    /// The value is not validated against any column.
    fn create_parameter(&self, name: &str, value: Value, direction: ParameterDirection) -> Parameter {
        Parameter::with_direction(name, value, direction)
    }
}
