//! Core types and traits for dbkit
//!
//! This crate defines the foundational types used throughout the system:
//! - Value: scalar exchanged with a provider (column values, parameters)
//! - CommandKind, Parameter, ParameterDirection: command inputs
//! - DataType, ColumnInfo, DataTable: result shapes
//! - Record, RecordMap: how a type declares its column → field mapping
//! - FromValue: field conversions used by record setters
//! - Error: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod convert;
pub mod error;
pub mod record;
pub mod table;
pub mod types;
pub mod value;

// Re-export commonly used types and traits
pub use convert::{ConversionError, FromValue};
pub use error::{DriverError, DriverResult, Error, Result};
pub use record::{ColumnBinding, FieldSetter, Record, RecordMap};
pub use table::DataTable;
pub use types::{ColumnInfo, CommandKind, DataType, Parameter, ParameterDirection};
pub use value::Value;
