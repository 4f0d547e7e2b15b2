//! SQLite provider for dbkit
//!
//! Backed by `rusqlite` with a bundled SQLite. Call [`register`] once at
//! startup to make the `"sqlite"` provider available to sessions.
//!
//! Errors raised by SQLite itself reach the caller as `rusqlite::Error`
//! inside `dbkit_core::Error::Driver`; checks performed by the provider raise
//! [`SqliteError`].

#![warn(missing_docs)]

mod connection;
mod error;

use std::sync::Arc;

use dbkit_core::DriverResult;
use dbkit_provider::{register_provider, Connection, ProviderFactory};

pub use connection::{parse_data_source, SqliteConnection, MEMORY};
pub use error::{ActiveTransaction, SqliteError};

/// Name the provider registers under.
pub const PROVIDER_NAME: &str = "sqlite";

/// Factory for [`SqliteConnection`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteProvider;

impl ProviderFactory for SqliteProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn create_connection(&self, connection_string: &str) -> DriverResult<Box<dyn Connection>> {
        let data_source = parse_data_source(connection_string)?;
        Ok(Box::new(SqliteConnection::new(data_source)))
    }
}

/// Install the SQLite provider in the global registry under [`PROVIDER_NAME`].
///
/// Calling this more than once replaces the factory with an identical one.
pub fn register() {
    register_provider(PROVIDER_NAME, Arc::new(SqliteProvider));
}
