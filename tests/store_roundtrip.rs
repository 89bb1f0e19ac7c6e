//! Restart and session scenarios through the public API.

use std::fs;

use chrono::NaiveDate;
use flowtask::forms::{LoginForm, PasswordChange};
use flowtask::{Config, CredentialStore, NewTask, Report, Session, Status, StoreError, TaskStore};
use tempfile::TempDir;

fn new_task(title: &str, status: &str, assignee: &str) -> NewTask {
    NewTask {
        title: title.to_string(),
        description: String::new(),
        status: status.to_string(),
        assigned_to: assignee.to_string(),
        created_date: NaiveDate::from_ymd_opt(2025, 1, 15),
    }
}

#[test]
fn fresh_data_dir_starts_empty_with_seed_account() {
    let dir = TempDir::new().unwrap();
    let config = Config::new(dir.path().join("data"));
    config.ensure_dir().unwrap();

    let users = CredentialStore::open(&config.users_file).unwrap();
    let mut tasks = TaskStore::open(&config.tasks_file).unwrap();
    assert_eq!(tasks.next_id(), 1);

    let task = tasks.add(new_task("X", "Pending", "alice")).unwrap();
    assert_eq!(task.id, 1);
    assert_eq!(tasks.get_all().len(), 1);

    let mut session = Session::default();
    assert!(users.authenticate(&mut session, "admin", "admin123").unwrap().is_some());
}

#[test]
fn restart_preserves_tasks_and_resumes_ids() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("tasks.csv");

    let before = {
        let mut store = TaskStore::open(&path).unwrap();
        store.add(new_task("a", "Pending", "alice")).unwrap();
        store.add(new_task("b", "Progress", "bob")).unwrap();
        let mut c = store.add(new_task("c", "Pending", "alice")).unwrap();
        c.status = Status::Done;
        store.update(c).unwrap();
        store.delete(1).unwrap();
        store.get_all()
    };

    let mut store = TaskStore::open(&path).unwrap();
    assert_eq!(store.get_all(), before);
    assert_eq!(store.add(new_task("d", "Done", "carol")).unwrap().id, 4);
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "id,title,description,status,assignedTo,createdDate\n\
         2,b,,Progress,bob,2025-01-15\n\
         3,c,,Done,alice,2025-01-15\n\
         4,d,,Done,carol,2025-01-15\n"
    );

    let report = Report::build(&store);
    assert_eq!(report.count(Status::Done), store.get_by_status(Status::Done).len());
    assert_eq!(report.completion_rate, 66);
}

#[test]
fn wrong_password_leaves_session_logged_out() {
    let dir = TempDir::new().unwrap();
    let users = CredentialStore::open(dir.path().join("users.csv")).unwrap();
    let mut session = Session::default();

    assert!(users.authenticate(&mut session, "admin", "wrong").unwrap().is_none());
    assert!(!session.is_logged_in());
}

#[test]
fn own_password_change_is_visible_in_session_and_after_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.csv");
    let users = CredentialStore::open(&path).unwrap();
    let mut session = Session::default();
    LoginForm { username: "admin".into(), password: "admin123".into() }
        .submit(&users, &mut session)
        .unwrap();

    users.change_password(&mut session, "admin", "newpw").unwrap();
    assert_eq!(session.current().unwrap().password, "newpw");

    // The settings screen checks the current password against the session copy.
    let change = PasswordChange { current: "newpw".into(), new: "third".into(), confirm: "third".into() };
    change.submit(&users, &mut session).unwrap();

    let reopened = CredentialStore::open(&path).unwrap();
    let mut fresh = Session::default();
    assert!(reopened.authenticate(&mut fresh, "admin", "newpw").unwrap().is_none());
    assert!(reopened.authenticate(&mut fresh, "admin", "third").unwrap().is_some());
}

#[test]
fn registered_user_survives_restart() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("users.csv");
    CredentialStore::open(&path).unwrap().register("bob", "pw").unwrap();

    let users = CredentialStore::open(&path).unwrap();
    assert!(matches!(users.register("bob", "x"), Err(StoreError::DuplicateUsername(_))));
    let mut session = Session::default();
    assert!(users.authenticate(&mut session, "bob", "pw").unwrap().is_some());
}
