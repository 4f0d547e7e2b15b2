//! Per-type access layers over named queries.

use crate::common::*;
use dbkit::RecordLayer;

struct UserGroupLayer<'s>(RecordLayer<'s, UserGroup>);

impl<'s> UserGroupLayer<'s> {
    fn new(session: &'s mut Session) -> Self {
        Self(RecordLayer::new(session))
    }

    fn get_all_groups(&mut self) -> dbkit::Result<Vec<UserGroup>> {
        self.0.fill_many("GetAllGroups", &[])
    }

    fn insert_group(&mut self, id: i64, name: &str) -> dbkit::Result<u64> {
        let params = [
            Parameter::new("groupId", id),
            Parameter::new("groupName", name),
        ];
        self.0.execute_non_query("InsertGroup", &params)
    }

    fn count(&mut self) -> dbkit::Result<Option<Value>> {
        self.0.execute_scalar("CountGroups", &[])
    }
}

struct UserLayer<'s>(RecordLayer<'s, User>);

impl<'s> UserLayer<'s> {
    fn new(session: &'s mut Session) -> Self {
        Self(RecordLayer::new(session))
    }

    fn get_all_users(&mut self) -> dbkit::Result<Vec<User>> {
        self.0.fill_many("GetAllUsers", &[])
    }

    fn get_user_by_id(&mut self, id: i64) -> dbkit::Result<Option<User>> {
        let params = [self.0.session().parameter("id", id)?];
        self.0.fill_one("GetUserById", &params)
    }
}

fn layered_session(db: &TestDb) -> Session {
    let mut session = db.session();
    session.register::<UserGroup>().unwrap();
    session
        .add_queries_file::<UserGroup>(data_file("UserGroupQueries.xml"))
        .unwrap();
    session.register::<User>().unwrap();
    session
        .add_queries_file::<User>(data_file("UserQueries.xml"))
        .unwrap();
    session
}

#[test]
fn layers_run_named_queries() {
    let db = TestDb::new();
    let mut session = layered_session(&db);
    session.open().unwrap();

    let groups = UserGroupLayer::new(&mut session).get_all_groups().unwrap();
    let users = UserLayer::new(&mut session).get_all_users().unwrap();
    let user = UserLayer::new(&mut session).get_user_by_id(2).unwrap();
    session.close().unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(users.len(), 3);
    assert_eq!(user.and_then(|u| u.name).as_deref(), Some("Jimi Hendrix"));
}

#[test]
fn layer_writes_join_transaction() {
    let db = TestDb::new();
    let mut session = layered_session(&db);
    session.open().unwrap();

    session.begin_transaction().unwrap();
    assert_eq!(
        UserGroupLayer::new(&mut session)
            .insert_group(3, "TestGroup1")
            .unwrap(),
        1
    );
    session.end_transaction(true).unwrap();

    let mut groups = UserGroupLayer::new(&mut session);
    assert_eq!(groups.count().unwrap(), Some(Value::Int(3)));
    let names: Vec<String> = groups
        .get_all_groups()
        .unwrap()
        .into_iter()
        .filter_map(|g| g.name)
        .collect();
    assert_eq!(names, vec!["Administrators", "Musicians", "TestGroup1"]);
}

#[test]
fn layer_reports_missing_query() {
    let db = TestDb::new();
    let mut session = layered_session(&db);
    session.open().unwrap();

    let mut layer: RecordLayer<'_, UserGroup> = RecordLayer::new(&mut session);
    assert!(layer.queries().is_some());
    let result = layer.fill_table("NoSuchQuery", &[]);
    assert!(matches!(result, Err(Error::QueryNotFound { .. })));
}

#[test]
fn layer_without_registration() {
    let db = TestDb::new();
    let mut session = db.session();
    session
        .add_queries_file::<User>(data_file("UserQueries.xml"))
        .unwrap();
    session.open().unwrap();

    let result = UserLayer::new(&mut session).get_all_users();
    assert!(matches!(result, Err(Error::NotRegistered { .. })));

    // Buffered results do not need a registered type.
    let table = RecordLayer::<User>::new(&mut session)
        .fill_table("GetAllUsers", &[])
        .unwrap();
    assert_eq!(table.len(), 3);
}
