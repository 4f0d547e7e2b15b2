//! dbkit - record mapping and named queries over pluggable SQL providers
//!
//! dbkit turns result rows into plain Rust records. A record type declares
//! its own column → field associations; a [`Session`] runs SQL (inline, from
//! a record type's named queries, or from a scope) through a provider looked
//! up by name.
//!
//! # Quick Start
//!
//! ```ignore
//! use dbkit::{Record, RecordMap, Session};
//!
//! #[derive(Debug, Default)]
//! struct UserGroup {
//!     id: Option<i64>,
//!     name: Option<String>,
//! }
//!
//! impl Record for UserGroup {
//!     fn map_columns(map: &mut RecordMap<Self>) {
//!         map.column("GROUP_ID", "id", |r, v| r.id = v)
//!             .column("GROUP_NAME", "name", |r, v| r.name = v);
//!     }
//! }
//!
//! dbkit::sqlite::register();
//! let mut session = Session::new("Data Source=app.db", "sqlite")?;
//! session.register::<UserGroup>()?;
//! session.open()?;
//! let groups: Vec<UserGroup> = session.fill_many("SELECT GROUP_ID, GROUP_NAME FROM user_group")?;
//! ```
//!
//! # Architecture
//!
//! - `dbkit-core`: values, parameters, the `Record` trait, errors
//! - `dbkit-provider`: driver traits and the provider registry
//! - `dbkit-engine`: sessions, materialization, query catalogs
//! - `dbkit-sqlite`: the SQLite provider, re-exported as [`sqlite`]

pub use dbkit_core::*;
pub use dbkit_engine::{
    catalog, config, materialize_many, materialize_one, type_registry, Command, CommandExecutor,
    FieldAccessor, QueryCatalog, QuerySet, RecordDescriptor, RecordLayer, Scope, ScopeConfig,
    Session, SessionConfig, TypeRegistry, CONFIG_FILE_NAME,
};
pub use dbkit_provider as provider;
pub use dbkit_sqlite as sqlite;
