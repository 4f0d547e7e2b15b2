//! Per-record-type access layer.
//!
//! A [`RecordLayer`] is the base that hand-written or generated data-access
//! code builds on: it borrows a session and runs `T`'s named queries.
//!
//! ```ignore
//! pub struct UserGroupLayer<'s>(RecordLayer<'s, UserGroup>);
//!
//! impl<'s> UserGroupLayer<'s> {
//!     pub fn select_all(&mut self) -> Result<Vec<UserGroup>> {
//!         self.0.fill_many("SelectAllUserGroups", &[])
//!     }
//! }
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use dbkit_core::{DataTable, Parameter, Record, Result, Value};

use crate::catalog::QuerySet;
use crate::command::Command;
use crate::session::Session;

/// Runs the named queries of record type `T` on a borrowed session.
pub struct RecordLayer<'s, T> {
    session: &'s mut Session,
    _record: PhantomData<fn() -> T>,
}

impl<'s, T: Record> RecordLayer<'s, T> {
    /// Wrap a session.
    pub fn new(session: &'s mut Session) -> Self {
        Self {
            session,
            _record: PhantomData,
        }
    }

    /// The underlying session.
    pub fn session(&mut self) -> &mut Session {
        self.session
    }

    /// SQL of `T`'s query `name`.
    pub fn query(&self, name: &str) -> Result<Arc<str>> {
        self.session.query::<T>(name)
    }

    /// `T`'s query set, if it has one.
    pub fn queries(&self) -> Option<Arc<QuerySet>> {
        self.session.queries::<T>()
    }

    /// Run query `name` and materialize its first row.
    pub fn fill_one(&mut self, name: &str, parameters: &[Parameter]) -> Result<Option<T>> {
        let sql = self.query(name)?;
        self.session
            .fill_one(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and materialize every row.
    pub fn fill_many(&mut self, name: &str, parameters: &[Parameter]) -> Result<Vec<T>> {
        let sql = self.query(name)?;
        self.session
            .fill_many(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and buffer its result set.
    pub fn fill_table(&mut self, name: &str, parameters: &[Parameter]) -> Result<DataTable> {
        let sql = self.query(name)?;
        self.session
            .fill_table(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and return the affected row count.
    pub fn execute_non_query(&mut self, name: &str, parameters: &[Parameter]) -> Result<u64> {
        let sql = self.query(name)?;
        self.session
            .execute_non_query(Command::text(&sql).with_parameters(parameters))
    }

    /// Run query `name` and return the first column of its first row.
    pub fn execute_scalar(&mut self, name: &str, parameters: &[Parameter]) -> Result<Option<Value>> {
        let sql = self.query(name)?;
        self.session
            .execute_scalar(Command::text(&sql).with_parameters(parameters))
    }
}
