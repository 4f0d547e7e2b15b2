//! Errors raised by the SQLite provider itself.
//!
//! Failures coming out of SQLite are passed through as `rusqlite::Error`;
//! this enum only covers what the provider checks on its own.

use dbkit_core::ParameterDirection;
use dbkit_provider::TransactionId;
use thiserror::Error;

/// SQLite provider errors
#[derive(Debug, Error, PartialEq)]
pub enum SqliteError {
    /// Command executed or transaction started on a closed connection
    #[error("connection is not open")]
    NotOpen,

    /// `open` called on an open connection
    #[error("connection is already open")]
    AlreadyOpen,

    /// The connection string names no data source
    #[error("invalid connection string '{0}': expected a path or 'Data Source=<path>'")]
    InvalidConnectionString(String),

    /// SQLite has no stored procedures
    #[error("stored procedures are not supported by the sqlite provider")]
    StoredProcedureUnsupported,

    /// Only input parameters can be bound
    #[error("parameter '{name}' has direction {direction:?}; only Input is supported")]
    UnsupportedDirection {
        /// Parameter name
        name: String,
        /// Requested direction
        direction: ParameterDirection,
    },

    /// The command carries a transaction that is not the connection's active one
    #[error("command attached to {attached} but the active transaction is {active}")]
    TransactionMismatch {
        /// Transaction on the command
        attached: TransactionId,
        /// The connection's active transaction, if any
        active: ActiveTransaction,
    },
}

/// Display helper for the connection's current transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActiveTransaction(pub Option<TransactionId>);

impl std::fmt::Display for ActiveTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => f.write_str("none"),
        }
    }
}
