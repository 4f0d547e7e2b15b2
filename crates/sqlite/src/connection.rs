//! SQLite connection driver.

use dbkit_core::{ColumnInfo, CommandKind, DataType, DriverResult, Parameter, ParameterDirection, Value};
use dbkit_provider::{BufferedReader, CommandSpec, Connection, DataReader, TransactionId};
use rusqlite::types::ValueRef;
use rusqlite::Statement;
use tracing::{debug, trace};

use crate::error::{ActiveTransaction, SqliteError};

/// In-memory data source name.
pub const MEMORY: &str = ":memory:";

/// Sigils SQLite accepts in front of a named parameter.
const SIGILS: &[char] = &['@', ':', '$'];

/// Extract the data source from a connection string.
///
/// Accepts `Data Source=<path>`, `DataSource=<path>` or `Filename=<path>`
/// among `;`-separated pairs (keys are case-insensitive), or a bare path.
pub fn parse_data_source(connection_string: &str) -> Result<String, SqliteError> {
    let trimmed = connection_string.trim();
    if trimmed.is_empty() {
        return Err(SqliteError::InvalidConnectionString(connection_string.to_string()));
    }
    if !trimmed.contains('=') {
        return Ok(trimmed.to_string());
    }

    trimmed
        .split(';')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| {
            let key: String = key
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase();
            key == "datasource" || key == "filename"
        })
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| SqliteError::InvalidConnectionString(connection_string.to_string()))
}

/// A connection to one SQLite database file (or `:memory:`).
pub struct SqliteConnection {
    data_source: String,
    conn: Option<rusqlite::Connection>,
    active: Option<TransactionId>,
    next_transaction: u64,
}

impl SqliteConnection {
    /// Create an unopened connection to `data_source`.
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            conn: None,
            active: None,
            next_transaction: 1,
        }
    }

    /// The path (or `:memory:`) this connection opens.
    pub fn data_source(&self) -> &str {
        &self.data_source
    }

    /// The transaction currently open on this connection.
    pub fn active_transaction(&self) -> Option<TransactionId> {
        self.active
    }

    fn handle(&self) -> Result<&rusqlite::Connection, SqliteError> {
        self.conn.as_ref().ok_or(SqliteError::NotOpen)
    }

    /// Checks shared by every execution path.
    fn checked(&self, command: &CommandSpec<'_>) -> Result<&rusqlite::Connection, SqliteError> {
        if command.kind == CommandKind::StoredProcedure {
            return Err(SqliteError::StoredProcedureUnsupported);
        }
        let conn = self.handle()?;
        if let Some(attached) = command.transaction {
            if self.active != Some(attached) {
                return Err(SqliteError::TransactionMismatch {
                    attached,
                    active: ActiveTransaction(self.active),
                });
            }
        }
        trace!(
            text_len = command.text.len(),
            params = command.parameters.len(),
            in_transaction = command.transaction.is_some(),
            "executing command"
        );
        Ok(conn)
    }

    fn end_transaction(&mut self, transaction: TransactionId, sql: &str) -> DriverResult<()> {
        if self.active != Some(transaction) {
            return Err(SqliteError::TransactionMismatch {
                attached: transaction,
                active: ActiveTransaction(self.active),
            }
            .into());
        }
        self.handle()?.execute_batch(sql)?;
        self.active = None;
        debug!(%transaction, statement = sql, "transaction ended");
        Ok(())
    }
}

impl Connection for SqliteConnection {
    fn open(&mut self) -> DriverResult<()> {
        if self.conn.is_some() {
            return Err(SqliteError::AlreadyOpen.into());
        }
        let conn = if self.data_source == MEMORY {
            rusqlite::Connection::open_in_memory()?
        } else {
            rusqlite::Connection::open(&self.data_source)?
        };
        debug!(data_source = %self.data_source, "connection opened");
        self.conn = Some(conn);
        Ok(())
    }

    fn close(&mut self) -> DriverResult<()> {
        // Closing a closed connection is a no-op. SQLite rolls back any
        // transaction still open on the handle.
        if let Some(conn) = self.conn.take() {
            self.active = None;
            conn.close().map_err(|(_, e)| e)?;
            debug!(data_source = %self.data_source, "connection closed");
        }
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    fn begin_transaction(&mut self) -> DriverResult<TransactionId> {
        self.handle()?.execute_batch("BEGIN")?;
        let id = TransactionId::new(self.next_transaction);
        self.next_transaction += 1;
        self.active = Some(id);
        debug!(transaction = %id, "transaction started");
        Ok(id)
    }

    fn commit(&mut self, transaction: TransactionId) -> DriverResult<()> {
        self.end_transaction(transaction, "COMMIT")
    }

    fn rollback(&mut self, transaction: TransactionId) -> DriverResult<()> {
        self.end_transaction(transaction, "ROLLBACK")
    }

    fn execute_reader<'c>(
        &'c mut self,
        command: &CommandSpec<'_>,
    ) -> DriverResult<Box<dyn DataReader + 'c>> {
        let conn = self.checked(command)?;
        let mut stmt = conn.prepare(command.text)?;
        bind_parameters(&mut stmt, command.parameters)?;

        let columns: Vec<ColumnInfo> = stmt
            .columns()
            .iter()
            .map(|c| ColumnInfo::new(c.name(), c.decl_type().map_or(DataType::Unknown, affinity)))
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.raw_query();
        while let Some(row) = cursor.next()? {
            let mut values = Vec::with_capacity(width);
            for ordinal in 0..width {
                values.push(from_sqlite(row.get_ref(ordinal)?));
            }
            rows.push(values);
        }

        Ok(Box::new(BufferedReader::new(columns, rows)))
    }

    fn execute_non_query(&mut self, command: &CommandSpec<'_>) -> DriverResult<u64> {
        let conn = self.checked(command)?;
        let mut stmt = conn.prepare(command.text)?;
        bind_parameters(&mut stmt, command.parameters)?;
        let changed = stmt.raw_execute()?;
        Ok(changed as u64)
    }
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("data_source", &self.data_source)
            .field("open", &self.conn.is_some())
            .field("active", &self.active)
            .finish()
    }
}

// =============================================================================
// Parameter binding and value conversion
// =============================================================================

fn bind_parameters(stmt: &mut Statement<'_>, parameters: &[Parameter]) -> DriverResult<()> {
    let mut position = 0;
    for param in parameters {
        if param.direction != ParameterDirection::Input {
            return Err(SqliteError::UnsupportedDirection {
                name: param.name.clone(),
                direction: param.direction,
            }
            .into());
        }

        let index = if param.name.is_empty() {
            position += 1;
            position
        } else {
            parameter_index(stmt, &param.name)?
                .ok_or_else(|| rusqlite::Error::InvalidParameterName(param.name.clone()))?
        };
        stmt.raw_bind_parameter(index, to_sqlite(&param.value))?;
    }
    Ok(())
}

/// Resolve a parameter name, trying each sigil when the name carries none.
fn parameter_index(stmt: &Statement<'_>, name: &str) -> rusqlite::Result<Option<usize>> {
    if name.starts_with(SIGILS) {
        return stmt.parameter_index(name);
    }
    for sigil in SIGILS {
        if let Some(index) = stmt.parameter_index(&format!("{}{}", sigil, name))? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}

fn to_sqlite(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;
    match value {
        Value::Null => Sql::Null,
        Value::Bool(b) => Sql::Integer(*b as i64),
        Value::Int(i) => Sql::Integer(*i),
        Value::Float(f) => Sql::Real(*f),
        Value::String(s) => Sql::Text(s.clone()),
        Value::Bytes(b) => Sql::Blob(b.clone()),
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(t) => Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => Value::Bytes(b.to_vec()),
    }
}

/// Map a declared column type to a data type using SQLite's affinity rules.
pub(crate) fn affinity(decl_type: &str) -> DataType {
    let decl = decl_type.to_ascii_uppercase();
    if decl.contains("INT") {
        DataType::Int
    } else if decl.contains("CHAR") || decl.contains("CLOB") || decl.contains("TEXT") {
        DataType::String
    } else if decl.contains("BLOB") {
        DataType::Bytes
    } else if decl.contains("REAL") || decl.contains("FLOA") || decl.contains("DOUB") {
        DataType::Float
    } else if decl.contains("BOOL") {
        DataType::Bool
    } else if decl.contains("DATE") || decl.contains("TIME") {
        DataType::String
    } else {
        DataType::Unknown
    }
}
