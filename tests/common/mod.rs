//! Shared test utilities for the integration suites.
//!
//! Import via `mod common;` from any test's main.rs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Once;

pub use dbkit::{Error, Parameter, Record, RecordMap, Session, Value};
use tempfile::TempDir;

// ============================================================================
// Initialization
// ============================================================================

static INIT_PROVIDER: Once = Once::new();

/// Register the SQLite provider once per test binary.
pub fn ensure_provider_registered() {
    INIT_PROVIDER.call_once(dbkit::sqlite::register);
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Default, Clone, PartialEq)]
pub struct UserGroup {
    pub id: Option<i64>,
    pub name: Option<String>,
}

impl Record for UserGroup {
    fn map_columns(map: &mut RecordMap<Self>) {
        map.column("GROUP_ID", "id", |r, v| r.id = v)
            .column("GROUP_NAME", "name", |r, v| r.name = v);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub group_id: Option<i64>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

impl Record for User {
    fn map_columns(map: &mut RecordMap<Self>) {
        map.column("USER_ID", "id", |r, v| r.id = v)
            .column("GROUP_ID", "group_id", |r, v| r.group_id = v)
            .column("USERNAME", "username", |r, v| r.username = v)
            .column("PASSWORD", "password", |r, v| r.password = v)
            .column("FULL_NAME", "name", |r, v| r.name = v);
    }
}

/// Maps an aggregate by its expression text.
#[derive(Debug, Default)]
pub struct GroupCount {
    pub count: i64,
}

impl Record for GroupCount {
    fn map_columns(map: &mut RecordMap<Self>) {
        map.column("count(*)", "count", |r, v| r.count = v);
    }
}

// ============================================================================
// TestDb - SQLite database in a temp directory
// ============================================================================

/// A seeded SQLite database:
///
/// | GROUP_ID | GROUP_NAME |
/// |----------|------------|
/// | 1 | Administrators |
/// | 2 | Musicians |
///
/// and three users, user 2 being "Jimi Hendrix".
pub struct TestDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

impl TestDb {
    pub fn new() -> Self {
        ensure_provider_registered();
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("testdb.sqlite");

        let conn = rusqlite::Connection::open(&path).expect("Failed to create database");
        conn.execute_batch(
            "CREATE TABLE user_group (
                 GROUP_ID   INTEGER PRIMARY KEY,
                 GROUP_NAME VARCHAR(50) NOT NULL
             );
             CREATE TABLE user (
                 USER_ID   INTEGER PRIMARY KEY,
                 GROUP_ID  INTEGER REFERENCES user_group (GROUP_ID),
                 USERNAME  VARCHAR(50) NOT NULL,
                 PASSWORD  VARCHAR(50),
                 FULL_NAME VARCHAR(100)
             );
             INSERT INTO user_group VALUES (1, 'Administrators'), (2, 'Musicians');
             INSERT INTO user VALUES
                 (1, 1, 'admin', 'secret', 'Administrator'),
                 (2, 2, 'jimi', NULL, 'Jimi Hendrix'),
                 (3, 2, 'stevie', NULL, 'Stevie Ray Vaughan');",
        )
        .expect("Failed to seed database");

        Self { dir, path }
    }

    pub fn connection_string(&self) -> String {
        format!("Data Source={}", self.path.display())
    }

    /// An unopened session with nothing registered.
    pub fn session(&self) -> Session {
        Session::new(&self.connection_string(), "sqlite").expect("Failed to create session")
    }

    /// An open session with `UserGroup` and `User` registered.
    pub fn open_session(&self) -> Session {
        let mut session = self.session();
        session.register::<UserGroup>().unwrap();
        session.register::<User>().unwrap();
        session.open().unwrap();
        session
    }

    /// Count rows through an independent connection.
    pub fn count(&self, table: &str) -> i64 {
        let conn = rusqlite::Connection::open(&self.path).unwrap();
        conn.query_row(&format!("SELECT count(*) FROM {}", table), [], |row| row.get(0))
            .unwrap()
    }

    /// Write a file next to the database and return its path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }
}

/// Path of a fixture under `tests/data`.
pub fn data_file(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}
