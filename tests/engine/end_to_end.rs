//! Raw-SQL primitives against a seeded database.

use crate::common::*;
use dbkit::{Command, DataType, ParameterDirection};

#[test]
fn fill_many_returns_rows_in_order() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let groups: Vec<UserGroup> = session
        .fill_many("SELECT GROUP_ID, GROUP_NAME FROM user_group ORDER BY GROUP_ID")
        .unwrap();

    assert_eq!(
        groups,
        vec![
            UserGroup {
                id: Some(1),
                name: Some("Administrators".into())
            },
            UserGroup {
                id: Some(2),
                name: Some("Musicians".into())
            },
        ]
    );
}

#[test]
fn two_column_scenario() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session
        .execute_non_query("INSERT INTO user_group VALUES (3, 'Drummers')")
        .unwrap();

    let all: Vec<UserGroup> = session
        .fill_many("SELECT GROUP_ID, GROUP_NAME FROM user_group ORDER BY GROUP_ID")
        .unwrap();
    let ids: Vec<Option<i64>> = all.iter().map(|g| g.id).collect();
    assert_eq!(ids, vec![Some(1), Some(2), Some(3)]);

    let params = [session.parameter("id", 2i64).unwrap()];
    let one: Option<UserGroup> = session
        .fill_one(
            Command::text("SELECT GROUP_ID, GROUP_NAME FROM user_group WHERE GROUP_ID = @id")
                .with_parameters(&params),
        )
        .unwrap();
    assert_eq!(one.unwrap().name.as_deref(), Some("Musicians"));

    let none: Option<UserGroup> = session
        .fill_one("SELECT GROUP_ID, GROUP_NAME FROM user_group WHERE GROUP_ID = 99")
        .unwrap();
    assert!(none.is_none());
}

#[test]
fn null_columns_keep_field_defaults() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let jimi: User = session
        .fill_one("SELECT * FROM user WHERE USER_ID = 2")
        .unwrap()
        .unwrap();
    assert_eq!(jimi.name.as_deref(), Some("Jimi Hendrix"));
    assert_eq!(jimi.password, None);
    assert_eq!(jimi.group_id, Some(2));
}

#[test]
fn extra_columns_are_ignored() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let groups: Vec<UserGroup> = session
        .fill_many(
            "SELECT 'x' AS NOISE, g.*, length(GROUP_NAME) AS LEN FROM user_group g ORDER BY GROUP_ID",
        )
        .unwrap();
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].name.as_deref(), Some("Administrators"));
}

#[test]
fn aggregate_mapped_by_expression_text() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.register::<GroupCount>().unwrap();

    let count: GroupCount = session
        .fill_one("SELECT count(*) FROM user_group")
        .unwrap()
        .unwrap();
    assert_eq!(count.count, 2);
}

#[test]
fn fill_table_buffers_result() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let table = session
        .fill_table("SELECT USER_ID, FULL_NAME, PASSWORD FROM user ORDER BY USER_ID")
        .unwrap();
    assert_eq!(table.len(), 3);
    assert_eq!(table.get(1, "FULL_NAME"), Some(&Value::from("Jimi Hendrix")));
    assert_eq!(table.get(1, "PASSWORD"), Some(&Value::Null));
}

#[test]
fn execute_non_query_reports_affected_rows() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let params = [Parameter::new("groupId", 2i64)];
    let affected = session
        .execute_non_query(
            Command::text("UPDATE user SET PASSWORD = 'changed' WHERE GROUP_ID = @groupId")
                .with_parameters(&params),
        )
        .unwrap();
    assert_eq!(affected, 2);
}

#[test]
fn execute_scalar_variants() {
    let db = TestDb::new();
    let mut session = db.open_session();

    assert_eq!(
        session.execute_scalar("SELECT count(*) FROM user").unwrap(),
        Some(Value::Int(3))
    );
    assert_eq!(
        session
            .execute_scalar("SELECT PASSWORD FROM user WHERE USER_ID = 2")
            .unwrap(),
        Some(Value::Null)
    );
    assert_eq!(
        session
            .execute_scalar("SELECT PASSWORD FROM user WHERE USER_ID = 42")
            .unwrap(),
        None
    );
}

#[test]
fn describe_columns_in_result_order() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let columns = session
        .describe_columns("SELECT USER_ID, FULL_NAME, count(*) FROM user")
        .unwrap();
    let described: Vec<(&str, DataType)> = columns
        .iter()
        .map(|c| (c.name.as_str(), c.data_type))
        .collect();
    assert_eq!(
        described,
        vec![
            ("USER_ID", DataType::Int),
            ("FULL_NAME", DataType::String),
            ("count(*)", DataType::Int),
        ]
    );
}

#[test]
fn describe_columns_rejects_repeated_names() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let result = session.describe_columns("SELECT GROUP_ID, GROUP_NAME AS GROUP_ID FROM user_group");
    assert!(
        matches!(result, Err(Error::DuplicateColumn { ref column }) if column == "GROUP_ID"),
        "Expected DuplicateColumn, got {:?}",
        result
    );

    // Buffering does not key by name.
    let table = session
        .fill_table("SELECT GROUP_ID, GROUP_NAME AS GROUP_ID FROM user_group")
        .unwrap();
    assert_eq!(table.columns().len(), 2);
}

#[test]
fn driver_errors_pass_through() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let result = session.execute_non_query("INSERT INTO no_such_table VALUES (1)");
    let err = result.unwrap_err();
    assert!(matches!(err, Error::Driver(_)), "Expected Driver error, got {:?}", err);
    assert!(err.downcast_driver::<rusqlite::Error>().is_some());
}

#[test]
fn constraint_violation_is_driver_error() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let result = session.execute_non_query("INSERT INTO user_group VALUES (1, 'dup')");
    assert!(matches!(result, Err(Error::Driver(_))));
    assert_eq!(db.count("user_group"), 2);
}

#[test]
fn conversion_failure_names_column() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let result: dbkit::Result<Vec<UserGroup>> =
        session.fill_many("SELECT GROUP_NAME AS GROUP_ID FROM user_group");
    assert!(
        matches!(result, Err(Error::ColumnConversion { ref column, .. }) if column == "GROUP_ID"),
        "Expected ColumnConversion, got {:?}",
        result
    );
}

#[test]
fn output_parameters_rejected_by_sqlite() {
    let db = TestDb::new();
    let mut session = db.open_session();

    let params = [session
        .create_parameter("id", Value::Null, ParameterDirection::Output)
        .unwrap()];
    let result = session.execute_non_query(
        Command::text("SELECT GROUP_ID FROM user_group WHERE GROUP_ID = @id").with_parameters(&params),
    );
    let err = result.unwrap_err();
    assert!(matches!(
        err.downcast_driver::<dbkit::sqlite::SqliteError>(),
        Some(dbkit::sqlite::SqliteError::UnsupportedDirection { .. })
    ));
}

#[test]
fn closed_session_reports_driver_error() {
    let db = TestDb::new();
    let mut session = db.session();

    let result = session.execute_scalar("SELECT 1");
    let err = result.unwrap_err();
    assert_eq!(
        err.downcast_driver::<dbkit::sqlite::SqliteError>(),
        Some(&dbkit::sqlite::SqliteError::NotOpen)
    );

    session.open().unwrap();
    assert!(session.is_open());
    session.close().unwrap();
    assert!(!session.is_open());
}
