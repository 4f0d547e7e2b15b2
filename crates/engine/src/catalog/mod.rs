//! Named-query catalog
//!
//! Queries are owned either by a record type or by a named scope. Names are
//! unique within their owner.
//!
//! | Operation | Existing set | Name collision |
//! |-----------|--------------|----------------|
//! | `set_queries` | replaced | n/a |
//! | `load_file` | merged | `DuplicateQuery`, nothing added |
//! | `add_scope*` | `ScopeAlreadyExists` | n/a |

mod file;

pub use file::{load_query_file, parse_queries};

use std::any::TypeId;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use dbkit_core::{Error, Result};
use tracing::debug;

/// The queries of one owner.
#[derive(Debug, Clone)]
pub struct QuerySet {
    owner: String,
    queries: HashMap<String, Arc<str>>,
}

impl QuerySet {
    /// Wrap `queries` for `owner`.
    pub fn new(owner: impl Into<String>, queries: HashMap<String, Arc<str>>) -> Self {
        Self {
            owner: owner.into(),
            queries,
        }
    }

    /// Record type or scope name.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// SQL registered under `name`.
    ///
    /// # Errors
    ///
    /// [`Error::QueryNotFound`] if the owner has no such query.
    pub fn get(&self, name: &str) -> Result<Arc<str>> {
        self.queries
            .get(name)
            .cloned()
            .ok_or_else(|| Error::QueryNotFound {
                owner: self.owner.clone(),
                name: name.to_string(),
            })
    }

    /// Whether `name` is defined.
    pub fn contains(&self, name: &str) -> bool {
        self.queries.contains_key(name)
    }

    /// Query names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.queries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Add every query of `incoming`, or none of them if any name exists.
    fn merge(&mut self, incoming: HashMap<String, Arc<str>>) -> Result<()> {
        if let Some(name) = incoming.keys().find(|name| self.queries.contains_key(*name)) {
            return Err(Error::DuplicateQuery {
                owner: self.owner.clone(),
                name: name.clone(),
            });
        }
        self.queries.extend(incoming);
        Ok(())
    }
}

/// Per-type and per-scope query sets of one session.
#[derive(Debug, Default)]
pub struct QueryCatalog {
    by_type: HashMap<TypeId, Arc<QuerySet>>,
    scopes: HashMap<String, Arc<QuerySet>>,
}

impl QueryCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole query set of a record type.
    pub fn set_queries<I, K, V>(&mut self, type_id: TypeId, owner: &str, queries: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let queries: HashMap<String, Arc<str>> = queries
            .into_iter()
            .map(|(name, sql)| (name.into(), Arc::from(sql.as_ref())))
            .collect();
        debug!(owner, queries = queries.len(), "replaced query set");
        self.by_type
            .insert(type_id, Arc::new(QuerySet::new(owner, queries)));
    }

    /// Load a query file into a record type's set.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidQueryFile`] if the file is unreadable or malformed
    /// - [`Error::DuplicateQuery`] if a name is already defined for the type
    ///
    /// On error the type's set is unchanged.
    pub fn load_file(&mut self, type_id: TypeId, owner: &str, path: &Path) -> Result<()> {
        let incoming = load_query_file(path)?;
        let count = incoming.len();
        match self.by_type.get_mut(&type_id) {
            Some(existing) => Arc::make_mut(existing).merge(incoming)?,
            None => {
                self.by_type
                    .insert(type_id, Arc::new(QuerySet::new(owner, incoming)));
            }
        }
        debug!(owner, path = %path.display(), queries = count, "loaded query file");
        Ok(())
    }

    /// The query set of a record type, if it has one.
    pub fn queries(&self, type_id: TypeId) -> Option<Arc<QuerySet>> {
        self.by_type.get(&type_id).cloned()
    }

    /// SQL for `name` in a record type's set.
    ///
    /// # Errors
    ///
    /// [`Error::QueryNotFound`] if the type has no set or no such query.
    pub fn query(&self, type_id: TypeId, owner: &str, name: &str) -> Result<Arc<str>> {
        match self.by_type.get(&type_id) {
            Some(set) => set.get(name),
            None => Err(Error::QueryNotFound {
                owner: owner.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// Add a scope from a query file.
    ///
    /// # Errors
    ///
    /// - [`Error::ScopeAlreadyExists`] if the name is taken
    /// - [`Error::InvalidQueryFile`] if the file is unreadable or malformed
    pub fn add_scope(&mut self, scope: &str, path: &Path) -> Result<()> {
        self.ensure_scope_free(scope)?;
        let queries = load_query_file(path)?;
        debug!(scope, path = %path.display(), queries = queries.len(), "added scope");
        self.scopes
            .insert(scope.to_string(), Arc::new(QuerySet::new(scope, queries)));
        Ok(())
    }

    /// Add a scope from in-memory queries.
    ///
    /// # Errors
    ///
    /// [`Error::ScopeAlreadyExists`] if the name is taken.
    pub fn add_scope_queries<I, K, V>(&mut self, scope: &str, queries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        self.ensure_scope_free(scope)?;
        let queries: HashMap<String, Arc<str>> = queries
            .into_iter()
            .map(|(name, sql)| (name.into(), Arc::from(sql.as_ref())))
            .collect();
        debug!(scope, queries = queries.len(), "added scope");
        self.scopes
            .insert(scope.to_string(), Arc::new(QuerySet::new(scope, queries)));
        Ok(())
    }

    /// The query set of a scope.
    ///
    /// # Errors
    ///
    /// [`Error::ScopeNotFound`] if no scope has that name.
    pub fn scope(&self, scope: &str) -> Result<Arc<QuerySet>> {
        self.scopes
            .get(scope)
            .cloned()
            .ok_or_else(|| Error::ScopeNotFound {
                scope: scope.to_string(),
            })
    }

    /// Scope names, sorted.
    pub fn scope_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.scopes.keys().cloned().collect();
        names.sort();
        names
    }

    fn ensure_scope_free(&self, scope: &str) -> Result<()> {
        if self.scopes.contains_key(scope) {
            return Err(Error::ScopeAlreadyExists {
                scope: scope.to_string(),
            });
        }
        Ok(())
    }
}
