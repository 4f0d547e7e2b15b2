//! Record type registry
//!
//! Each session keeps one descriptor per registered record type. A
//! descriptor is built once, from the type's [`Record::map_columns`]
//! declaration, and is immutable afterwards:
//!
//! - `column_to_field`: result-column name → field identifier
//! - `accessor`: field identifier → setter closure
//!
//! Descriptors are shared behind `Arc` so executing a command never needs to
//! borrow the registry.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use dbkit_core::{Error, FieldSetter, Record, RecordMap, Result};
use tracing::{debug, warn};

/// Field identifier → setter for one record type.
pub struct FieldAccessor<T> {
    setters: HashMap<&'static str, FieldSetter<T>>,
}

impl<T> FieldAccessor<T> {
    /// The setter for `field`.
    pub fn setter(&self, field: &str) -> Option<&FieldSetter<T>> {
        self.setters.get(field)
    }

    /// Number of settable fields.
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    /// Whether the accessor has no fields.
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }
}

/// Immutable mapping metadata for one record type.
pub struct RecordDescriptor<T> {
    record: &'static str,
    column_to_field: HashMap<String, &'static str>,
    accessor: FieldAccessor<T>,
}

impl<T: Record> RecordDescriptor<T> {
    /// Build and validate the descriptor from `T`'s declaration.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidRecordType`] if a column name is empty, or a column or
    /// field is associated twice.
    pub fn build() -> Result<Self> {
        let record = T::record_name();
        let mut map = RecordMap::<T>::new();
        T::map_columns(&mut map);

        let invalid = |reason: String| Error::InvalidRecordType {
            record: record.to_string(),
            reason,
        };

        let mut column_to_field = HashMap::with_capacity(map.len());
        let mut setters = HashMap::with_capacity(map.len());
        for binding in map.into_bindings() {
            if binding.column.is_empty() {
                return Err(invalid(format!("field '{}' has an empty column name", binding.field)));
            }
            if binding.field.is_empty() {
                return Err(invalid(format!("column '{}' has an empty field name", binding.column)));
            }
            if let Some(previous) = column_to_field.get(&binding.column) {
                return Err(invalid(format!(
                    "column '{}' is mapped to both '{}' and '{}'",
                    binding.column, previous, binding.field
                )));
            }
            if setters.contains_key(binding.field) {
                return Err(invalid(format!(
                    "field '{}' is mapped from more than one column",
                    binding.field
                )));
            }
            column_to_field.insert(binding.column, binding.field);
            setters.insert(binding.field, binding.setter);
        }

        Ok(Self {
            record,
            column_to_field,
            accessor: FieldAccessor { setters },
        })
    }
}

impl<T> RecordDescriptor<T> {
    /// Record type name.
    pub fn record_name(&self) -> &'static str {
        self.record
    }

    /// Field identifier mapped from `column`, matched case-sensitively.
    pub fn field_for(&self, column: &str) -> Option<&'static str> {
        self.column_to_field.get(column).copied()
    }

    /// Setter for the field mapped from `column`.
    pub fn setter_for(&self, column: &str) -> Option<&FieldSetter<T>> {
        self.field_for(column).and_then(|field| self.accessor.setter(field))
    }

    /// All mapped columns, in no particular order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.column_to_field.keys().map(String::as_str)
    }

    /// The field accessor.
    pub fn accessor(&self) -> &FieldAccessor<T> {
        &self.accessor
    }

    /// Whether the record maps no columns at all.
    pub fn is_empty(&self) -> bool {
        self.column_to_field.is_empty()
    }
}

impl<T> std::fmt::Debug for RecordDescriptor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordDescriptor")
            .field("record", &self.record)
            .field("column_to_field", &self.column_to_field)
            .finish_non_exhaustive()
    }
}

/// Descriptors of every record type registered with one session.
#[derive(Default)]
pub struct TypeRegistry {
    descriptors: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
    names: HashMap<TypeId, &'static str>,
}

impl TypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyRegistered`] if `T` is already registered
    /// - [`Error::InvalidRecordType`] if `T`'s declaration cannot be used
    pub fn register<T: Record>(&mut self) -> Result<()> {
        let type_id = TypeId::of::<T>();
        if self.descriptors.contains_key(&type_id) {
            return Err(Error::AlreadyRegistered {
                record: T::record_name().to_string(),
            });
        }

        let descriptor = RecordDescriptor::<T>::build()?;
        if descriptor.is_empty() {
            warn!(record = T::record_name(), "record type maps no columns");
        }
        debug!(
            record = T::record_name(),
            columns = descriptor.column_to_field.len(),
            "registered record type"
        );

        self.names.insert(type_id, T::record_name());
        self.descriptors.insert(type_id, Arc::new(descriptor));
        Ok(())
    }

    /// The descriptor for `T`.
    ///
    /// # Errors
    ///
    /// [`Error::NotRegistered`] if `T` was never registered.
    pub fn lookup<T: Record>(&self) -> Result<Arc<RecordDescriptor<T>>> {
        self.descriptors
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|any| any.downcast::<RecordDescriptor<T>>().ok())
            .ok_or_else(|| Error::NotRegistered {
                record: T::record_name().to_string(),
            })
    }

    /// Whether `T` is registered.
    pub fn is_registered<T: Record>(&self) -> bool {
        self.descriptors.contains_key(&TypeId::of::<T>())
    }

    /// Names of the registered record types, sorted.
    pub fn record_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.names.values().copied().collect();
        names.sort_unstable();
        names
    }

    /// Number of registered record types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("records", &self.record_names())
            .finish()
    }
}
