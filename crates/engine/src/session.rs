//! Session: the execution context for every command.
//!
//! A session owns one provider connection, at most one active transaction,
//! the descriptors of its registered record types and its query catalog.
//! Every command issued through the session (directly, through a [`Scope`]
//! or through a [`RecordLayer`](crate::RecordLayer)) joins the active
//! transaction, if any.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► register / load queries ──► open ──► execute ... ──► close ──► dispose
//!                                        │                                 ▲
//!                                        └── begin / end transaction ──────┘
//! ```
//!
//! After [`Session::dispose`] every operation fails with
//! [`Error::SessionDisposed`]. Dropping a session disposes it; an active
//! transaction is rolled back.
//!
//! # Checks
//!
//! Type-driven primitives verify, in order: the session is not disposed,
//! the record type is registered. Only then is the driver called.

use std::any::TypeId;
use std::path::Path;
use std::sync::Arc;

use dbkit_core::{
    ColumnInfo, DataTable, Error, Parameter, ParameterDirection, Record, Result, Value,
};
use dbkit_provider::{Connection, ProviderFactory, TransactionId};
use tracing::{debug, warn};

use crate::catalog::{QueryCatalog, QuerySet};
use crate::command::Command;
use crate::config::SessionConfig;
use crate::executor::CommandExecutor;
use crate::type_registry::TypeRegistry;

/// A connection to one database plus the record types and queries used with it.
pub struct Session {
    provider: Arc<dyn ProviderFactory>,
    /// `None` once disposed.
    connection: Option<Box<dyn Connection>>,
    transaction: Option<TransactionId>,
    types: TypeRegistry,
    catalog: QueryCatalog,
}

impl Session {
    /// Create a session over the provider registered as `provider_name`.
    ///
    /// The connection is created but not opened.
    ///
    /// # Errors
    ///
    /// - [`Error::ProviderNotFound`] if no provider has that name
    /// - [`Error::Driver`] if the provider rejects the connection string
    pub fn new(connection_string: &str, provider_name: &str) -> Result<Self> {
        let provider = dbkit_provider::provider(provider_name)?;
        Self::with_provider(provider, connection_string)
    }

    /// Create a session over an explicit provider factory.
    pub fn with_provider(provider: Arc<dyn ProviderFactory>, connection_string: &str) -> Result<Self> {
        let connection = provider.create_connection(connection_string)?;
        debug!(provider = provider.name(), "session created");
        Ok(Self {
            provider,
            connection: Some(connection),
            transaction: None,
            types: TypeRegistry::new(),
            catalog: QueryCatalog::new(),
        })
    }

    /// Create a session from a configuration file's settings, adding its scopes.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        let mut session = Self::new(&config.connection_string, &config.provider)?;
        for scope in &config.scopes {
            session.add_scope(&scope.name, &config.resolve(&scope.file))?;
        }
        Ok(session)
    }

    /// Name of the provider this session uses.
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    fn connection(&mut self) -> Result<&mut Box<dyn Connection>> {
        self.connection.as_mut().ok_or(Error::SessionDisposed)
    }

    fn ensure_live(&self) -> Result<()> {
        if self.connection.is_none() {
            return Err(Error::SessionDisposed);
        }
        Ok(())
    }

    pub(crate) fn executor(&mut self) -> Result<CommandExecutor<'_>> {
        let transaction = self.transaction;
        let connection = self.connection.as_deref_mut().ok_or(Error::SessionDisposed)?;
        Ok(CommandExecutor::new(connection, transaction))
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Open the connection.
    pub fn open(&mut self) -> Result<()> {
        self.connection()?.open()?;
        debug!(provider = self.provider.name(), "session opened");
        Ok(())
    }

    /// Close the connection.
    ///
    /// The driver discards any transaction still open, so the session forgets
    /// it too.
    pub fn close(&mut self) -> Result<()> {
        self.connection()?.close()?;
        if let Some(transaction) = self.transaction.take() {
            debug!(%transaction, "connection closed with an open transaction");
        }
        debug!(provider = self.provider.name(), "session closed");
        Ok(())
    }

    /// Whether the connection is open.
    pub fn is_open(&self) -> bool {
        self.connection.as_ref().map_or(false, |c| c.is_open())
    }

    /// Start a transaction every later command joins.
    ///
    /// # Errors
    ///
    /// [`Error::TransactionAlreadyActive`] if one is already active.
    pub fn begin_transaction(&mut self) -> Result<()> {
        self.ensure_live()?;
        if self.transaction.is_some() {
            return Err(Error::TransactionAlreadyActive);
        }
        let transaction = self.connection()?.begin_transaction()?;
        debug!(%transaction, "transaction started");
        self.transaction = Some(transaction);
        Ok(())
    }

    /// Commit (`true`) or roll back (`false`) the active transaction.
    ///
    /// The session has no active transaction afterwards, even if the driver
    /// fails. A failed commit is rolled back before its error is returned,
    /// so the connection leaves the transaction too. Without an active
    /// transaction this does nothing.
    pub fn end_transaction(&mut self, commit: bool) -> Result<()> {
        self.ensure_live()?;
        let Some(transaction) = self.transaction.take() else {
            return Ok(());
        };
        let connection = self.connection()?;
        if commit {
            if let Err(e) = connection.commit(transaction) {
                if let Err(rollback) = connection.rollback(transaction) {
                    warn!(%transaction, error = %rollback, "rollback after failed commit failed");
                }
                debug!(%transaction, error = %e, "commit failed, transaction rolled back");
                return Err(Error::Driver(e));
            }
        } else {
            connection.rollback(transaction)?;
        }
        debug!(%transaction, commit, "transaction ended");
        Ok(())
    }

    /// Whether a transaction is active.
    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }

    /// Release the connection and any active transaction.
    ///
    /// The transaction is rolled back and the connection closed. Calling this
    /// again does nothing. Driver failures during release are returned, but
    /// the session is disposed regardless.
    pub fn dispose(&mut self) -> Result<()> {
        let Some(mut connection) = self.connection.take() else {
            return Ok(());
        };

        let mut first_error = None;
        if let Some(transaction) = self.transaction.take() {
            if let Err(e) = connection.rollback(transaction) {
                first_error.get_or_insert(Error::Driver(e));
            }
        }
        if connection.is_open() {
            if let Err(e) = connection.close() {
                first_error.get_or_insert(Error::Driver(e));
            }
        }
        debug!(provider = self.provider.name(), "session disposed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Whether [`dispose`](Session::dispose) has run.
    pub fn is_disposed(&self) -> bool {
        self.connection.is_none()
    }

    // =========================================================================
    // Parameters
    // =========================================================================

    /// Build a parameter in the provider's conventions. The value is not
    /// validated.
    pub fn create_parameter(
        &self,
        name: &str,
        value: impl Into<Value>,
        direction: ParameterDirection,
    ) -> Result<Parameter> {
        self.ensure_live()?;
        Ok(self.provider.create_parameter(name, value.into(), direction))
    }

    /// Build an input parameter.
    pub fn parameter(&self, name: &str, value: impl Into<Value>) -> Result<Parameter> {
        self.create_parameter(name, value, ParameterDirection::Input)
    }

    // =========================================================================
    // Record types and named queries
    // =========================================================================

    /// Register `T` for materialization.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRegistered`] on a second call for `T`
    /// - [`Error::InvalidRecordType`] if `T`'s mapping is inconsistent
    pub fn register<T: Record>(&mut self) -> Result<()> {
        self.ensure_live()?;
        self.types.register::<T>()
    }

    /// Whether `T` is registered.
    pub fn is_registered<T: Record>(&self) -> bool {
        self.types.is_registered::<T>()
    }

    /// Names of the registered record types, sorted.
    pub fn record_names(&self) -> Vec<&'static str> {
        self.types.record_names()
    }

    /// Replace `T`'s named queries.
    pub fn set_queries<T, I, K, V>(&mut self, queries: I) -> Result<()>
    where
        T: Record,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_live()?;
        self.catalog
            .set_queries(TypeId::of::<T>(), T::record_name(), queries);
        Ok(())
    }

    /// Load `T`'s named queries from a query file, merging with any it has.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQueryFile`] if the file is unreadable or malformed
    /// - [`Error::DuplicateQuery`] if the file redefines one of `T`'s queries
    pub fn add_queries_file<T: Record>(&mut self, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_live()?;
        self.catalog
            .load_file(TypeId::of::<T>(), T::record_name(), path.as_ref())
    }

    /// SQL of `T`'s query `name`.
    pub fn query<T: Record>(&self, name: &str) -> Result<Arc<str>> {
        self.ensure_live()?;
        self.catalog
            .query(TypeId::of::<T>(), T::record_name(), name)
    }

    /// `T`'s query set, if it has one.
    pub fn queries<T: Record>(&self) -> Option<Arc<QuerySet>> {
        self.catalog.queries(TypeId::of::<T>())
    }

    /// Whether `T` has any named queries.
    pub fn has_queries<T: Record>(&self) -> bool {
        self.queries::<T>().map_or(false, |set| !set.is_empty())
    }

    /// Add a scope loaded from a query file.
    ///
    /// # Errors
    ///
    /// - [`Error::ScopeAlreadyExists`] if the name is taken
    /// - [`Error::InvalidQueryFile`] if the file is unreadable or malformed
    pub fn add_scope(&mut self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        self.ensure_live()?;
        self.catalog.add_scope(name, path.as_ref())
    }

    /// Add a scope from in-memory queries.
    pub fn add_scope_queries<I, K, V>(&mut self, name: &str, queries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_live()?;
        self.catalog.add_scope_queries(name, queries)
    }

    /// Handle for executing a scope's queries by name.
    ///
    /// # Errors
    ///
    /// [`Error::ScopeNotFound`] if no scope has that name.
    pub fn scope(&mut self, name: &str) -> Result<Scope<'_>> {
        self.ensure_live()?;
        let queries = self.catalog.scope(name)?;
        Ok(Scope {
            session: self,
            queries,
        })
    }

    /// Scope names, sorted.
    pub fn scope_names(&self) -> Vec<String> {
        self.catalog.scope_names()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute a command and buffer its whole result set.
    pub fn fill_table<'a>(&mut self, command: impl Into<Command<'a>>) -> Result<DataTable> {
        self.executor()?.fill_table(command.into())
    }

    /// Execute a command and materialize its first row as a `T`.
    ///
    /// Returns `Ok(None)` when the result set is empty.
    pub fn fill_one<'a, T: Record>(&mut self, command: impl Into<Command<'a>>) -> Result<Option<T>> {
        self.ensure_live()?;
        let descriptor = self.types.lookup::<T>()?;
        self.executor()?.fill_one(command.into(), &descriptor)
    }

    /// Execute a command and materialize every row as a `T`, in order.
    pub fn fill_many<'a, T: Record>(&mut self, command: impl Into<Command<'a>>) -> Result<Vec<T>> {
        self.ensure_live()?;
        let descriptor = self.types.lookup::<T>()?;
        self.executor()?.fill_many(command.into(), &descriptor)
    }

    /// Execute a command and return the affected row count.
    pub fn execute_non_query<'a>(&mut self, command: impl Into<Command<'a>>) -> Result<u64> {
        self.executor()?.execute_non_query(command.into())
    }

    /// Execute a command and return the first column of its first row.
    ///
    /// `None` when there are no rows; `Some(Value::Null)` for a NULL cell.
    pub fn execute_scalar<'a>(&mut self, command: impl Into<Command<'a>>) -> Result<Option<Value>> {
        self.executor()?.execute_scalar(command.into())
    }

    /// Execute a command and report its result columns with their data types.
    pub fn describe_columns<'a>(&mut self, command: impl Into<Command<'a>>) -> Result<Vec<ColumnInfo>> {
        self.executor()?.describe_columns(command.into())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.transaction.is_some() && self.connection.is_some() {
            warn!("session dropped with an active transaction, rolling back");
        }
        if let Err(e) = self.dispose() {
            debug!(error = %e, "error releasing session on drop");
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("provider", &self.provider.name())
            .field("open", &self.is_open())
            .field("disposed", &self.is_disposed())
            .field("transaction", &self.transaction)
            .field("types", &self.types)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Scope
// =============================================================================

/// A named group of queries bound to a session.
///
/// Obtained from [`Session::scope`]. Queries are resolved by name and run
/// through the session, joining its active transaction.
pub struct Scope<'s> {
    session: &'s mut Session,
    queries: Arc<QuerySet>,
}

impl<'s> Scope<'s> {
    /// Scope name.
    pub fn name(&self) -> &str {
        self.queries.owner()
    }

    /// SQL of query `name`.
    pub fn query(&self, name: &str) -> Result<Arc<str>> {
        self.queries.get(name)
    }

    /// The scope's query set.
    pub fn queries(&self) -> &QuerySet {
        &self.queries
    }

    /// Run query `name` and buffer its result set.
    pub fn fill_table(&mut self, name: &str, parameters: &[Parameter]) -> Result<DataTable> {
        let sql = self.queries.get(name)?;
        self.session
            .fill_table(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and materialize its first row.
    pub fn fill_one<T: Record>(&mut self, name: &str, parameters: &[Parameter]) -> Result<Option<T>> {
        let sql = self.queries.get(name)?;
        self.session
            .fill_one(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and materialize every row.
    pub fn fill_many<T: Record>(&mut self, name: &str, parameters: &[Parameter]) -> Result<Vec<T>> {
        let sql = self.queries.get(name)?;
        self.session
            .fill_many(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and return the affected row count.
    pub fn execute_non_query(&mut self, name: &str, parameters: &[Parameter]) -> Result<u64> {
        let sql = self.queries.get(name)?;
        self.session
            .execute_non_query(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and return the first column of its first row.
    pub fn execute_scalar(&mut self, name: &str, parameters: &[Parameter]) -> Result<Option<Value>> {
        let sql = self.queries.get(name)?;
        self.session
            .execute_scalar(Command::text(&sql).with_parameters(parameters))
    }
}
