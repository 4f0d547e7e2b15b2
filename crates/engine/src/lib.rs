//! Record-mapping engine for dbkit
//!
//! - [`Session`]: connection, transaction, record types and queries
//! - [`TypeRegistry`] / [`RecordDescriptor`]: per-type column → field setters
//! - [`materialize_one`] / [`materialize_many`]: rows into records
//! - [`QueryCatalog`]: named SQL per record type and per scope
//! - [`CommandExecutor`]: the single execution path every primitive uses
//! - [`RecordLayer`]: base for per-type data-access code
//! - [`SessionConfig`]: `dbkit.toml`

#![warn(missing_docs)]

pub mod catalog;
mod command;
pub mod config;
mod executor;
mod layer;
mod materialize;
mod session;
pub mod type_registry;

pub use catalog::{QueryCatalog, QuerySet};
pub use command::Command;
pub use config::{ScopeConfig, SessionConfig, CONFIG_FILE_NAME};
pub use executor::CommandExecutor;
pub use layer::RecordLayer;
pub use materialize::{materialize_many, materialize_one};
pub use session::{Scope, Session};
pub use type_registry::{FieldAccessor, RecordDescriptor, TypeRegistry};

pub use dbkit_core::{Error, Result};
