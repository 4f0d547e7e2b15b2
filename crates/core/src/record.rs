//! Record type declaration.
//!
//! A record is a plain data holder that the engine can build from result
//! rows. A type becomes a record by implementing [`Record`] and declaring its
//! own column → field associations in [`Record::map_columns`]. Each
//! association carries a setter closure; the engine collects them once, at
//! registration, into the type's field accessor.
//!
//! ```ignore
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
//! ```

use crate::convert::{ConversionError, FromValue};
use crate::value::Value;

/// Assigns one converted column value to one field of `T`.
pub type FieldSetter<T> = Box<dyn Fn(&mut T, Value) -> Result<(), ConversionError> + Send + Sync>;

/// One column → field association.
pub struct ColumnBinding<T> {
    /// Result-column name, matched case-sensitively
    pub column: String,
    /// Field identifier on the record type
    pub field: &'static str,
    /// Converts and assigns the column value
    pub setter: FieldSetter<T>,
}

impl<T> std::fmt::Debug for ColumnBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnBinding")
            .field("column", &self.column)
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Builder a record type fills in to declare its mapping.
pub struct RecordMap<T> {
    bindings: Vec<ColumnBinding<T>>,
}

impl<T> Default for RecordMap<T> {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }
}

impl<T: 'static> RecordMap<T> {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `column` with `field`.
    ///
    /// `set` receives the column value already converted to the field's type
    /// `V`. Use `Option<_>` fields when a column is nullable and the caller
    /// needs NULL to read differently from the type's default.
    pub fn column<V, F>(&mut self, column: impl Into<String>, field: &'static str, set: F) -> &mut Self
    where
        V: FromValue + 'static,
        F: Fn(&mut T, V) + Send + Sync + 'static,
    {
        self.bindings.push(ColumnBinding {
            column: column.into(),
            field,
            setter: Box::new(move |record, value| {
                set(record, V::from_value(value)?);
                Ok(())
            }),
        });
        self
    }

    /// Declared associations, in declaration order.
    pub fn bindings(&self) -> &[ColumnBinding<T>] {
        &self.bindings
    }

    /// Consume the builder.
    pub fn into_bindings(self) -> Vec<ColumnBinding<T>> {
        self.bindings
    }

    /// Number of declared associations.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether nothing was declared.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// A data-holder type the engine can materialize from result rows.
///
/// Records are default-constructed and then assigned field by field, so
/// every field the mapping does not touch (or whose column is NULL) keeps its
/// `Default` value.
pub trait Record: Default + Send + 'static {
    /// Declare this type's column → field associations.
    fn map_columns(map: &mut RecordMap<Self>);

    /// Name used in errors and logs.
    fn record_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}
