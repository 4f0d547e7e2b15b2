//! Error types for dbkit
//!
//! This module defines the error taxonomy shared by every crate in the
//! workspace. We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Driver failures (connectivity, SQL syntax, constraint violations) are
//! carried in [`Error::Driver`] exactly as the provider produced them; they
//! can be recovered with `downcast_ref` on the boxed source.

use thiserror::Error;

/// Result type alias for dbkit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error produced by a provider, passed through untranslated.
pub type DriverError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for provider (driver) operations
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Error types for the record engine
///
/// # Categories
///
/// | Category | Variants |
/// |----------|----------|
/// | Lifecycle | `SessionDisposed`, `TransactionAlreadyActive` |
/// | Records | `InvalidRecordType`, `AlreadyRegistered`, `NotRegistered`, `ColumnConversion`, `DuplicateColumn` |
/// | Catalog | `QueryNotFound`, `DuplicateQuery`, `ScopeNotFound`, `ScopeAlreadyExists`, `InvalidQueryFile` |
/// | Setup | `ProviderNotFound`, `Config` |
/// | Driver | `Driver` |
#[derive(Debug, Error)]
pub enum Error {
    // ==================== Lifecycle ====================
    /// Operation attempted after the session was disposed
    #[error("session has been disposed")]
    SessionDisposed,

    /// `begin_transaction` called while a transaction is active
    #[error("transaction already active")]
    TransactionAlreadyActive,

    // ==================== Records ====================
    /// The record declaration cannot be used for mapping
    #[error("invalid record type '{record}': {reason}")]
    InvalidRecordType {
        /// Record type name
        record: String,
        /// What is wrong with the declaration
        reason: String,
    },

    /// The record type was already registered with this session
    #[error("record type '{record}' already registered")]
    AlreadyRegistered {
        /// Record type name
        record: String,
    },

    /// A type-driven operation targeted an unregistered record type
    #[error("record type '{record}' not registered, call register first")]
    NotRegistered {
        /// Record type name
        record: String,
    },

    /// A column value could not be converted into its field's type
    #[error("cannot assign column '{column}' of '{record}': expected {expected}, got {actual}")]
    ColumnConversion {
        /// Record type name
        record: String,
        /// Result column name
        column: String,
        /// Field type
        expected: &'static str,
        /// Driver value type
        actual: &'static str,
    },

    /// A result set names the same column twice where names must be unique
    #[error("column '{column}' appears more than once in the result")]
    DuplicateColumn {
        /// Result column name
        column: String,
    },

    // ==================== Catalog ====================
    /// No query with this name for the owner (record type or scope)
    #[error("query '{name}' not found for '{owner}'")]
    QueryNotFound {
        /// Record type or scope name
        owner: String,
        /// Query name
        name: String,
    },

    /// Loading a query file would overwrite an existing query
    #[error("query '{name}' already defined for '{owner}'")]
    DuplicateQuery {
        /// Record type or scope name
        owner: String,
        /// Query name
        name: String,
    },

    /// No scope with this name
    #[error("scope not found: {scope}")]
    ScopeNotFound {
        /// Scope name
        scope: String,
    },

    /// A scope with this name was already added
    #[error("scope already exists: {scope}")]
    ScopeAlreadyExists {
        /// Scope name
        scope: String,
    },

    /// The declarative query file is missing, unparsable or malformed
    #[error("invalid query file '{path}': {reason}")]
    InvalidQueryFile {
        /// File path (or `<inline>`)
        path: String,
        /// Parse or validation failure
        reason: String,
    },

    // ==================== Setup ====================
    /// No provider registered under this name
    #[error("provider not registered: {provider}")]
    ProviderNotFound {
        /// Provider name
        provider: String,
    },

    /// Configuration file unreadable or invalid
    #[error("configuration error: {reason}")]
    Config {
        /// What went wrong
        reason: String,
    },

    // ==================== Driver ====================
    /// Error raised by the provider, untranslated
    #[error("driver error: {0}")]
    Driver(#[source] DriverError),
}

impl From<DriverError> for Error {
    fn from(e: DriverError) -> Self {
        Error::Driver(e)
    }
}

impl Error {
    /// The underlying driver error, if this is one.
    pub fn driver_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Driver(e) => Some(e.as_ref()),
            _ => None,
        }
    }

    /// Downcast the underlying driver error to the provider's concrete type.
    pub fn downcast_driver<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Driver(e) => e.downcast_ref::<E>(),
            _ => None,
        }
    }
}
