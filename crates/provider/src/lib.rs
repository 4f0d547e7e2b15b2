//! Provider abstraction for dbkit
//!
//! The engine never talks to a database client directly. It resolves a
//! provider by name from the global registry and drives it through the
//! traits defined here:
//! - [`ProviderFactory`] creates connections and parameters
//! - [`Connection`] executes commands, optionally inside a transaction
//! - [`DataReader`] walks one result set forward
//!
//! [`BufferedReader`] is a ready-made cursor for drivers that fetch eagerly.

#![warn(missing_docs)]

mod reader;
pub mod registry;
mod traits;

pub use reader::BufferedReader;
pub use registry::{provider, register_provider, registered_providers, unregister_provider};
pub use traits::{CommandSpec, Connection, DataReader, ProviderFactory, TransactionId};
