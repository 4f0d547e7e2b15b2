//! Named query scopes.

use crate::common::*;
use dbkit::SessionConfig;

#[test]
fn scope_runs_queries_by_name() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    let mut reports = session.scope("reports").unwrap();
    let table = reports.fill_table("UsersPerGroup", &[]).unwrap();
    assert_eq!(table.len(), 2);
    assert_eq!(table.get(1, "USERS"), Some(&Value::Int(2)));

    assert_eq!(
        reports.execute_scalar("CountUsers", &[]).unwrap(),
        Some(Value::Int(3))
    );

    let params = [Parameter::new("id", 2i64)];
    let group: Option<UserGroup> = reports.fill_one("GroupById", &params).unwrap();
    assert_eq!(group.unwrap().name.as_deref(), Some("Musicians"));

    let groups: Vec<UserGroup> = reports.fill_many("GroupById", &params).unwrap();
    assert_eq!(groups.len(), 1);
}

#[test]
fn scope_non_query_joins_transaction() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    session.begin_transaction().unwrap();
    let params = [Parameter::new("name", "Guitarists"), Parameter::new("id", 2i64)];
    let affected = session
        .scope("reports")
        .unwrap()
        .execute_non_query("RenameGroup", &params)
        .unwrap();
    assert_eq!(affected, 1);
    session.end_transaction(false).unwrap();

    let name = session
        .execute_scalar("SELECT GROUP_NAME FROM user_group WHERE GROUP_ID = 2")
        .unwrap();
    assert_eq!(name, Some(Value::from("Musicians")));
}

#[test]
fn unknown_scope_and_query() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    let result = session.scope("billing");
    assert!(
        matches!(result, Err(Error::ScopeNotFound { ref scope }) if scope == "billing"),
        "Expected ScopeNotFound, got {:?}",
        result.err()
    );

    let mut reports = session.scope("reports").unwrap();
    let result = reports.fill_table("Nope", &[]);
    assert!(matches!(result, Err(Error::QueryNotFound { ref owner, .. }) if owner == "reports"));
}

#[test]
fn scope_name_reuse_rejected() {
    let db = TestDb::new();
    let mut session = db.session();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    let result = session.add_scope("reports", data_file("UserQueries.xml"));
    assert!(matches!(result, Err(Error::ScopeAlreadyExists { .. })));
    let result = session.add_scope_queries("reports", [("X", "SELECT 1")]);
    assert!(matches!(result, Err(Error::ScopeAlreadyExists { .. })));

    // The first definition is untouched.
    assert!(session.scope("reports").unwrap().query("CountUsers").is_ok());
}

#[test]
fn invalid_scope_file_adds_nothing() {
    let db = TestDb::new();
    let mut session = db.session();
    let result = session.add_scope("broken", data_file("MissingName.xml"));
    assert!(matches!(result, Err(Error::InvalidQueryFile { .. })));
    assert!(session.scope_names().is_empty());
}

#[test]
fn inline_scope() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session
        .add_scope_queries("adhoc", [("Groups", "SELECT count(*) FROM user_group")])
        .unwrap();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    assert_eq!(session.scope_names(), vec!["adhoc", "reports"]);
    let mut adhoc = session.scope("adhoc").unwrap();
    assert_eq!(adhoc.name(), "adhoc");
    assert_eq!(adhoc.execute_scalar("Groups", &[]).unwrap(), Some(Value::Int(2)));
}

#[test]
fn scope_materialization_requires_registration() {
    let db = TestDb::new();
    let mut session = db.session();
    session.open().unwrap();
    session.add_scope("reports", data_file("Reports.xml")).unwrap();

    let params = [Parameter::new("id", 1i64)];
    let result: dbkit::Result<Option<UserGroup>> =
        session.scope("reports").unwrap().fill_one("GroupById", &params);
    assert!(matches!(result, Err(Error::NotRegistered { .. })));
}

#[test]
fn session_from_config_loads_scopes() {
    let db = TestDb::new();
    std::fs::create_dir_all(db.dir.path().join("queries")).unwrap();
    std::fs::copy(data_file("Reports.xml"), db.dir.path().join("queries/reports.xml")).unwrap();
    let config_path = db.write(
        "dbkit.toml",
        &format!(
            "provider = \"sqlite\"\nconnection_string = \"{}\"\n\n[[scopes]]\nname = \"reports\"\nfile = \"queries/reports.xml\"\n",
            db.connection_string().replace('\\', "\\\\")
        ),
    );

    let config = SessionConfig::from_file(&config_path).unwrap();
    let mut session = Session::from_config(&config).unwrap();
    session.open().unwrap();

    assert_eq!(session.scope_names(), vec!["reports"]);
    let count = session
        .scope("reports")
        .unwrap()
        .execute_scalar("CountUsers", &[])
        .unwrap();
    assert_eq!(count, Some(Value::Int(3)));
}
