//! Per-type named queries loaded from files or set in code.

use crate::common::*;

#[test]
fn queries_load_from_file() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();

    assert!(session.has_queries::<UserGroup>());
    let sql = session.query::<UserGroup>("GetAllGroups").unwrap();
    let groups: Vec<UserGroup> = session.fill_many(&*sql).unwrap();
    assert_eq!(groups.len(), 2);

    // Surrounding whitespace is trimmed.
    let insert = session.query::<UserGroup>("InsertGroup").unwrap();
    assert!(insert.starts_with("INSERT"));
    assert!(insert.ends_with(")"));
}

#[test]
fn missing_query_name() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();

    let result = session.query::<UserGroup>("DropEverything");
    assert!(
        matches!(result, Err(Error::QueryNotFound { ref name, .. }) if name == "DropEverything"),
        "Expected QueryNotFound, got {:?}",
        result
    );
    // A type with no queries at all reports the same kind.
    assert!(matches!(
        session.query::<User>("GetAllUsers"),
        Err(Error::QueryNotFound { .. })
    ));
}

#[test]
fn missing_name_attribute_registers_nothing() {
    let db = TestDb::new();
    let mut session = db.session();

    let result = session.add_queries_file::<UserGroup>(data_file("MissingName.xml"));
    assert!(
        matches!(result, Err(Error::InvalidQueryFile { .. })),
        "Expected InvalidQueryFile, got {:?}",
        result
    );
    assert!(!session.has_queries::<UserGroup>());
    assert!(matches!(
        session.query::<UserGroup>("First"),
        Err(Error::QueryNotFound { .. })
    ));
}

#[test]
fn duplicate_name_in_file_rejected() {
    let db = TestDb::new();
    let mut session = db.session();
    let result = session.add_queries_file::<UserGroup>(data_file("DuplicateName.xml"));
    assert!(matches!(result, Err(Error::InvalidQueryFile { .. })));
}

#[test]
fn malformed_and_absent_files_rejected() {
    let db = TestDb::new();
    let mut session = db.session();

    assert!(matches!(
        session.add_queries_file::<UserGroup>(data_file("Malformed.xml")),
        Err(Error::InvalidQueryFile { .. })
    ));
    assert!(matches!(
        session.add_queries_file::<UserGroup>(data_file("DoesNotExist.xml")),
        Err(Error::InvalidQueryFile { .. })
    ));
}

#[test]
fn file_cannot_overwrite_existing_query() {
    let db = TestDb::new();
    let mut session = db.session();
    session
        .set_queries::<UserGroup, _, _, _>([("GetAllGroups", "SELECT 1")])
        .unwrap();

    let result = session.add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"));
    assert!(matches!(result, Err(Error::DuplicateQuery { ref name, .. }) if name == "GetAllGroups"));
    assert_eq!(&*session.query::<UserGroup>("GetAllGroups").unwrap(), "SELECT 1");
    assert!(session.query::<UserGroup>("CountGroups").is_err());
}

#[test]
fn file_merges_with_code_defined_queries() {
    let db = TestDb::new();
    let mut session = db.session();
    session
        .set_queries::<UserGroup, _, _, _>([("Custom", "SELECT GROUP_NAME FROM user_group")])
        .unwrap();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();

    let names = session.queries::<UserGroup>().unwrap();
    assert!(names.contains("Custom"));
    assert!(names.contains("GetAllGroups"));
}

#[test]
fn set_queries_replaces() {
    let db = TestDb::new();
    let mut session = db.session();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();
    session
        .set_queries::<UserGroup, _, _, _>([("Only", String::from("SELECT 1"))])
        .unwrap();

    assert_eq!(session.queries::<UserGroup>().unwrap().names(), vec!["Only"]);
}

#[test]
fn queries_are_kept_per_type() {
    let db = TestDb::new();
    let mut session = db.session();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();
    session
        .add_queries_file::<User>(data_file("UserQueries.xml"))
        .unwrap();

    assert!(session.query::<User>("GetAllGroups").is_err());
    assert!(session.query::<UserGroup>("GetAllUsers").is_err());
}

#[test]
fn query_file_written_at_runtime() {
    let db = TestDb::new();
    let path = db.write(
        "groups.xml",
        r#"<Queries><Query Name="Names">SELECT GROUP_NAME FROM user_group</Query></Queries>"#,
    );
    let mut session = db.open_session();
    session.add_queries_file::<UserGroup>(&path).unwrap();

    let sql = session.query::<UserGroup>("Names").unwrap();
    let table = session.fill_table(&*sql).unwrap();
    assert_eq!(table.len(), 2);
}
