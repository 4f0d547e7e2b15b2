//! Shared execution path for every session primitive.
//!
//! A [`CommandExecutor`] borrows the session's connection together with its
//! active transaction for the length of one call. Every primitive builds its
//! [`CommandSpec`] here, so the ambient transaction is attached the same way
//! whether the SQL came from the caller, a record type's catalog or a scope.

use std::collections::HashSet;

use dbkit_core::{ColumnInfo, DataTable, Error, Record, Result, Value};
use dbkit_provider::{CommandSpec, Connection, TransactionId};
use tracing::trace;

use crate::command::Command;
use crate::materialize::{materialize_many, materialize_one};
use crate::type_registry::RecordDescriptor;

/// Executes commands on one connection.
pub struct CommandExecutor<'s> {
    connection: &'s mut dyn Connection,
    transaction: Option<TransactionId>,
}

impl<'s> CommandExecutor<'s> {
    /// Wrap a connection and the transaction every command joins.
    pub fn new(connection: &'s mut dyn Connection, transaction: Option<TransactionId>) -> Self {
        Self {
            connection,
            transaction,
        }
    }

    fn spec<'a>(&self, command: &Command<'a>) -> CommandSpec<'a> {
        trace!(
            kind = ?command.kind,
            text_len = command.text.len(),
            params = command.parameters.len(),
            transaction = ?self.transaction,
            "execute"
        );
        CommandSpec {
            text: command.text,
            kind: command.kind,
            parameters: command.parameters,
            transaction: self.transaction,
        }
    }

    /// Buffer the whole result set.
    pub fn fill_table(&mut self, command: Command<'_>) -> Result<DataTable> {
        let cmd = self.spec(&command);
        Ok(self.connection.fill_table(&cmd)?)
    }

    /// First row as a `T`, `None` if the result set is empty.
    pub fn fill_one<T: Record>(
        &mut self,
        command: Command<'_>,
        descriptor: &RecordDescriptor<T>,
    ) -> Result<Option<T>> {
        let cmd = self.spec(&command);
        let mut reader = self.connection.execute_reader(&cmd)?;
        materialize_one(reader.as_mut(), descriptor)
    }

    /// Every row as a `T`, in result order.
    pub fn fill_many<T: Record>(
        &mut self,
        command: Command<'_>,
        descriptor: &RecordDescriptor<T>,
    ) -> Result<Vec<T>> {
        let cmd = self.spec(&command);
        let mut reader = self.connection.execute_reader(&cmd)?;
        materialize_many(reader.as_mut(), descriptor)
    }

    /// Affected row count.
    pub fn execute_non_query(&mut self, command: Command<'_>) -> Result<u64> {
        let cmd = self.spec(&command);
        Ok(self.connection.execute_non_query(&cmd)?)
    }

    /// First column of the first row; `None` when there are no rows.
    pub fn execute_scalar(&mut self, command: Command<'_>) -> Result<Option<Value>> {
        let cmd = self.spec(&command);
        Ok(self.connection.execute_scalar(&cmd)?)
    }

    /// Result columns and their data types, in result order.
    ///
    /// Column names are keys, so a result that repeats one fails with
    /// [`Error::DuplicateColumn`].
    pub fn describe_columns(&mut self, command: Command<'_>) -> Result<Vec<ColumnInfo>> {
        let cmd = self.spec(&command);
        let reader = self.connection.execute_reader(&cmd)?;
        let mut seen = HashSet::with_capacity(reader.field_count());
        for column in reader.columns() {
            if !seen.insert(column.name.as_str()) {
                return Err(Error::DuplicateColumn {
                    column: column.name.clone(),
                });
            }
        }
        Ok(reader.columns().to_vec())
    }
}
