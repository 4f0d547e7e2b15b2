//! Turning result rows into records.
//!
//! The column plan is resolved once per cursor: each ordinal is matched
//! against the descriptor's mapping, and unmapped columns are skipped for
//! every row. For each row a record is default-constructed and each mapped,
//! non-NULL column is assigned through its setter.

use dbkit_core::{Error, FieldSetter, Record, Result};
use dbkit_provider::DataReader;

use crate::type_registry::RecordDescriptor;

/// Setter per result ordinal, `None` for columns the record does not map.
struct ColumnPlan<'d, T> {
    slots: Vec<Option<(String, &'d FieldSetter<T>)>>,
}

impl<'d, T: Record> ColumnPlan<'d, T> {
    fn resolve(reader: &dyn DataReader, descriptor: &'d RecordDescriptor<T>) -> Self {
        let slots = reader
            .columns()
            .iter()
            .map(|column| {
                descriptor
                    .setter_for(&column.name)
                    .map(|setter| (column.name.clone(), setter))
            })
            .collect();
        Self { slots }
    }

    fn build_row(&self, reader: &dyn DataReader, record_name: &str) -> Result<T> {
        let mut record = T::default();
        for (ordinal, slot) in self.slots.iter().enumerate() {
            let Some((column, setter)) = slot else {
                continue;
            };
            let value = match reader.value(ordinal) {
                Some(value) if !value.is_null() => value.clone(),
                _ => continue,
            };
            setter(&mut record, value).map_err(|e| Error::ColumnConversion {
                record: record_name.to_string(),
                column: column.clone(),
                expected: e.expected,
                actual: e.actual,
            })?;
        }
        Ok(record)
    }
}

/// Read the next row into a `T`.
///
/// Returns `Ok(None)` when the cursor has no further row.
pub fn materialize_one<T: Record>(
    reader: &mut (dyn DataReader + '_),
    descriptor: &RecordDescriptor<T>,
) -> Result<Option<T>> {
    let plan = ColumnPlan::resolve(&*reader, descriptor);
    if !reader.read()? {
        return Ok(None);
    }
    plan.build_row(&*reader, descriptor.record_name()).map(Some)
}

/// Read every remaining row, in cursor order.
pub fn materialize_many<T: Record>(
    reader: &mut (dyn DataReader + '_),
    descriptor: &RecordDescriptor<T>,
) -> Result<Vec<T>> {
    let plan = ColumnPlan::resolve(&*reader, descriptor);
    let mut records = Vec::new();
    while reader.read()? {
        records.push(plan.build_row(&*reader, descriptor.record_name())?);
    }
    Ok(records)
}
