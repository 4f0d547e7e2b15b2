//! Transaction commit durability and rollback isolation.

use crate::common::*;
use dbkit::Command;

const INSERT_GROUP: &str =
    "INSERT INTO user_group (GROUP_ID, GROUP_NAME) VALUES (@groupId, @groupName)";

fn insert_group(session: &mut Session, id: i64, name: &str) {
    let params = [
        session.parameter("groupId", id).unwrap(),
        session.parameter("groupName", name).unwrap(),
    ];
    let affected = session
        .execute_non_query(Command::text(INSERT_GROUP).with_parameters(&params))
        .unwrap();
    assert_eq!(affected, 1);
}

fn group(session: &mut Session, id: i64) -> Option<UserGroup> {
    session
        .fill_one(Command::text(&format!(
            "SELECT * FROM user_group WHERE GROUP_ID = {}",
            id
        )))
        .unwrap()
}

#[test]
fn commit_is_durable() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 3, "TestGroup1");
    session.end_transaction(true).unwrap();

    assert_eq!(
        group(&mut session, 3).and_then(|g| g.name).as_deref(),
        Some("TestGroup1")
    );
    assert_eq!(db.count("user_group"), 3);
}

#[test]
fn rollback_is_isolated() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 4, "TestGroup2");
    // Visible inside its own transaction.
    assert!(group(&mut session, 4).is_some());
    session.end_transaction(false).unwrap();

    assert!(group(&mut session, 4).is_none());
    assert_eq!(db.count("user_group"), 2);
}

#[test]
fn commit_then_rollback_sequence() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 3, "TestGroup1");
    session.end_transaction(true).unwrap();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 4, "TestGroup2");
    session.end_transaction(false).unwrap();

    assert!(group(&mut session, 3).is_some());
    assert!(group(&mut session, 4).is_none());
}

#[test]
fn nested_begin_rejected() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    let result = session.begin_transaction();
    assert!(
        matches!(result, Err(Error::TransactionAlreadyActive)),
        "Expected TransactionAlreadyActive, got {:?}",
        result
    );

    // The original transaction is still usable.
    insert_group(&mut session, 5, "Still");
    session.end_transaction(true).unwrap();
    assert_eq!(db.count("user_group"), 3);
}

#[test]
fn end_without_begin_is_noop() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.end_transaction(true).unwrap();
    session.end_transaction(false).unwrap();
    assert!(!session.in_transaction());
}

#[test]
fn uncommitted_work_invisible_to_other_connections() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 6, "Pending");
    assert_eq!(db.count("user_group"), 2);
    session.end_transaction(true).unwrap();
    assert_eq!(db.count("user_group"), 3);
}

#[test]
fn drop_rolls_back_active_transaction() {
    let db = TestDb::new();
    {
        let mut session = db.open_session();
        session.begin_transaction().unwrap();
        insert_group(&mut session, 7, "Dropped");
    }
    assert_eq!(db.count("user_group"), 2);
}

#[test]
fn close_forgets_transaction() {
    let db = TestDb::new();
    let mut session = db.open_session();

    session.begin_transaction().unwrap();
    insert_group(&mut session, 8, "Closed");
    session.close().unwrap();
    assert!(!session.in_transaction());

    session.open().unwrap();
    assert!(group(&mut session, 8).is_none());
    session.begin_transaction().unwrap();
    session.end_transaction(true).unwrap();
}

#[test]
fn failed_commit_leaves_no_transaction_behind() {
    let db = TestDb::new();
    let mut session = db.open_session();
    session.execute_non_query("PRAGMA foreign_keys = ON").unwrap();
    session
        .execute_non_query(
            "CREATE TABLE membership (
                 GROUP_ID INTEGER REFERENCES user_group (GROUP_ID) DEFERRABLE INITIALLY DEFERRED
             )",
        )
        .unwrap();

    session.begin_transaction().unwrap();
    session
        .execute_non_query("INSERT INTO membership VALUES (99)")
        .unwrap();
    let result = session.end_transaction(true);
    assert!(
        matches!(result, Err(Error::Driver(_))),
        "Expected Driver error, got {:?}",
        result
    );
    assert!(!session.in_transaction());
    assert_eq!(
        session.execute_scalar("SELECT count(*) FROM membership").unwrap(),
        Some(Value::Int(0))
    );

    // Later writes autocommit and new transactions start normally.
    insert_group(&mut session, 50, "AfterFailedCommit");
    assert_eq!(db.count("user_group"), 3);
    session.begin_transaction().unwrap();
    insert_group(&mut session, 51, "Next");
    session.end_transaction(true).unwrap();
    session.dispose().unwrap();
    assert_eq!(db.count("user_group"), 4);
}
