//! Record type registration and the unregistered-type guard.

use crate::common::*;

#[derive(Debug, Default)]
struct Unmapped {
    _value: i64,
}

impl Record for Unmapped {
    fn map_columns(_map: &mut RecordMap<Self>) {}
}

#[derive(Debug, Default)]
struct Conflicting {
    a: Option<i64>,
    b: Option<i64>,
}

impl Record for Conflicting {
    fn map_columns(map: &mut RecordMap<Self>) {
        map.column("GROUP_ID", "a", |r, v| r.a = v)
            .column("GROUP_ID", "b", |r, v| r.b = v);
    }
}

#[test]
fn second_registration_fails() {
    let db = TestDb::new();
    let mut session = db.session();

    session.register::<User>().unwrap();
    let result = session.register::<User>();
    assert!(
        matches!(result, Err(Error::AlreadyRegistered { .. })),
        "Expected AlreadyRegistered, got {:?}",
        result
    );
    assert!(session.is_registered::<User>());
}

#[test]
fn inconsistent_mapping_rejected() {
    let db = TestDb::new();
    let mut session = db.session();

    let result = session.register::<Conflicting>();
    assert!(matches!(result, Err(Error::InvalidRecordType { .. })));
    assert!(!session.is_registered::<Conflicting>());
}

#[test]
fn record_without_columns_maps_nothing() {
    let db = TestDb::new();
    let mut session = db.session();
    session.register::<Unmapped>().unwrap();
    session.open().unwrap();

    let rows: Vec<Unmapped> = session.fill_many("SELECT * FROM user_group").unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn unregistered_type_rejected_for_one_and_many() {
    let db = TestDb::new();
    let mut session = db.session();
    session.open().unwrap();

    let result = session.fill_one::<User>("SELECT * FROM user");
    assert!(matches!(result, Err(Error::NotRegistered { .. })));
    let result = session.fill_many::<User>("SELECT * FROM user");
    assert!(matches!(result, Err(Error::NotRegistered { .. })));
}

#[test]
fn unregistered_check_precedes_driver() {
    let db = TestDb::new();
    let mut session = db.session();

    // Not opened: the driver would fail with NotOpen.
    let result = session.fill_many::<User>("SELECT * FROM no_such_table");
    assert!(
        matches!(result, Err(Error::NotRegistered { .. })),
        "Expected NotRegistered, got {:?}",
        result
    );
}

#[test]
fn registrations_are_per_session() {
    let db = TestDb::new();
    let mut first = db.session();
    first.register::<User>().unwrap();

    let mut second = db.session();
    second.register::<User>().unwrap();
    assert_eq!(second.record_names().len(), 1);
}
