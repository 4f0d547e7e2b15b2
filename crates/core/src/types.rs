//! Supporting types for commands, parameters and result shapes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

// =============================================================================
// Command Types
// =============================================================================

/// How the command text is interpreted by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandKind {
    /// Plain SQL text
    #[default]
    Text,
    /// Name of a stored procedure
    StoredProcedure,
}

/// Direction of a command parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ParameterDirection {
    /// Value flows into the command
    #[default]
    Input,
    /// Value is produced by the command
    Output,
    /// Value flows in and may be replaced by the command
    InputOutput,
    /// Procedure return value
    ReturnValue,
}

/// A named command parameter.
///
/// Parameters are built by the session's provider (see
/// `ProviderFactory::create_parameter`); the value is not checked against any
/// column, so type mismatches surface as driver errors at execution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name, with or without the provider's sigil. Empty binds by position.
    pub name: String,
    /// Bound value
    pub value: Value,
    /// Parameter direction
    pub direction: ParameterDirection,
}

impl Parameter {
    /// Create an input parameter.
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction: ParameterDirection::Input,
        }
    }

    /// Create a parameter with an explicit direction.
    pub fn with_direction(
        name: impl Into<String>,
        value: impl Into<Value>,
        direction: ParameterDirection,
    ) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            direction,
        }
    }
}

// =============================================================================
// Result Shape Types
// =============================================================================

/// Data type reported by a provider for a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// Boolean
    Bool,
    /// 64-bit integer
    Int,
    /// 64-bit float
    Float,
    /// Text
    String,
    /// Binary
    Bytes,
    /// The provider could not determine a type (e.g. an all-NULL expression)
    Unknown,
}

impl DataType {
    /// Get the type name as a string
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Bool => "Bool",
            DataType::Int => "Int",
            DataType::Float => "Float",
            DataType::String => "String",
            DataType::Bytes => "Bytes",
            DataType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Name and type of one result column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name exactly as returned by the driver
    pub name: String,
    /// Column data type
    pub data_type: DataType,
}

impl ColumnInfo {
    /// Create column metadata.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}
