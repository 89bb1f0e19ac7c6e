//! Input checks the screens run before calling into the stores.
//!
//! Each form trims its text fields, reports the first blank required field as
//! [`StoreError::MissingField`], then hands off to the store operation.

use crate::credential_store::CredentialStore;
use crate::error::{Result, StoreError};
use crate::task::{NewTask, Status, Task};
use crate::task_store::TaskStore;
use crate::user::{Session, User};

fn required(value: &str, name: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StoreError::MissingField(name));
    }
    Ok(value.to_string())
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// `Ok(None)` means the credentials did not match.
    pub fn submit(&self, store: &CredentialStore, session: &mut Session) -> Result<Option<User>> {
        let username = required(&self.username, "username")?;
        let password = required(&self.password, "password")?;
        store.authenticate(session, &username, &password)
    }

    /// Create the account from the same fields.
    pub fn register(&self, store: &CredentialStore) -> Result<User> {
        let username = required(&self.username, "username")?;
        let password = required(&self.password, "password")?;
        store.register(&username, &password)
    }
}

/// Change the logged-in user's own password.
#[derive(Debug, Clone, Default)]
pub struct PasswordChange {
    pub current: String,
    pub new: String,
    pub confirm: String,
}

impl PasswordChange {
    pub fn submit(&self, store: &CredentialStore, session: &mut Session) -> Result<()> {
        let username = session.current().ok_or(StoreError::NotLoggedIn)?.username.clone();
        if self.current.is_empty() {
            return Err(StoreError::MissingField("current password"));
        }
        if self.new.is_empty() {
            return Err(StoreError::MissingField("new password"));
        }
        if self.confirm.is_empty() {
            return Err(StoreError::MissingField("password confirmation"));
        }
        if session.current().is_some_and(|u| u.password != self.current) {
            return Err(StoreError::IncorrectPassword);
        }
        if self.new != self.confirm {
            return Err(StoreError::PasswordMismatch);
        }
        store.change_password(session, &username, &self.new)
    }
}

/// Fields of the add/edit task dialog.
#[derive(Debug, Clone)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub status: String,
    pub assigned_to: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: Status::Pending.to_string(),
            assigned_to: String::new(),
        }
    }
}

impl TaskForm {
    /// Prefill from an existing task for editing.
    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone(),
            status: task.status.to_string(),
            assigned_to: task.assigned_to.clone(),
        }
    }

    /// Add a new task dated today.
    pub fn create(&self, store: &mut TaskStore) -> Result<Task> {
        store.add(NewTask {
            title: required(&self.title, "title")?,
            description: self.description.clone(),
            status: self.status.trim().to_string(),
            assigned_to: required(&self.assigned_to, "assigned to")?,
            created_date: None,
        })
    }

    /// Write the edited fields over `existing`, keeping its id and creation date.
    pub fn apply(&self, store: &mut TaskStore, existing: &Task) -> Result<Task> {
        let task = Task {
            title: required(&self.title, "title")?,
            description: self.description.clone(),
            status: self.status.trim().parse()?,
            assigned_to: required(&self.assigned_to, "assigned to")?,
            ..existing.clone()
        };
        store.update(task.clone())?;
        Ok(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stores() -> (TempDir, CredentialStore, TaskStore) {
        let dir = TempDir::new().unwrap();
        let users = CredentialStore::open(dir.path().join("users.csv")).unwrap();
        let tasks = TaskStore::open(dir.path().join("tasks.csv")).unwrap();
        (dir, users, tasks)
    }

    fn login(users: &CredentialStore) -> Session {
        let mut session = Session::default();
        LoginForm { username: "admin".into(), password: "admin123".into() }
            .submit(users, &mut session)
            .unwrap();
        session
    }

    #[test]
    fn login_requires_both_fields() {
        let (_dir, users, _) = stores();
        let mut session = Session::default();
        let form = LoginForm { username: "  ".into(), password: "x".into() };
        assert!(matches!(form.submit(&users, &mut session), Err(StoreError::MissingField("username"))));
        let form = LoginForm { username: "admin".into(), password: String::new() };
        assert!(matches!(form.submit(&users, &mut session), Err(StoreError::MissingField("password"))));
    }

    #[test]
    fn login_trims_input() {
        let (_dir, users, _) = stores();
        let mut session = Session::default();
        let form = LoginForm { username: " admin ".into(), password: "admin123\n".into() };
        assert!(form.submit(&users, &mut session).unwrap().is_some());
        assert!(session.is_logged_in());
    }

    #[test]
    fn register_then_login() {
        let (_dir, users, _) = stores();
        let form = LoginForm { username: "erin".into(), password: "pw".into() };
        form.register(&users).unwrap();
        assert!(matches!(form.register(&users), Err(StoreError::DuplicateUsername(_))));
        let mut session = Session::default();
        assert!(form.submit(&users, &mut session).unwrap().is_some());
    }

    #[test]
    fn password_change_checks_in_order() {
        let (_dir, users, _) = stores();
        let mut logged_out = Session::default();
        let change = PasswordChange { current: "admin123".into(), new: "a".into(), confirm: "a".into() };
        assert!(matches!(change.submit(&users, &mut logged_out), Err(StoreError::NotLoggedIn)));

        let mut session = login(&users);
        let blank = PasswordChange { current: "admin123".into(), new: String::new(), confirm: "a".into() };
        assert!(matches!(blank.submit(&users, &mut session), Err(StoreError::MissingField("new password"))));

        let wrong = PasswordChange { current: "nope".into(), new: "a".into(), confirm: "a".into() };
        assert!(matches!(wrong.submit(&users, &mut session), Err(StoreError::IncorrectPassword)));

        let mismatch = PasswordChange { current: "admin123".into(), new: "a".into(), confirm: "b".into() };
        assert!(matches!(mismatch.submit(&users, &mut session), Err(StoreError::PasswordMismatch)));

        change.submit(&users, &mut session).unwrap();
        assert_eq!(session.current().unwrap().password, "a");
    }

    #[test]
    fn task_form_requires_title_and_assignee() {
        let (_dir, _, mut tasks) = stores();
        let form = TaskForm { title: " ".into(), assigned_to: "bob".into(), ..Default::default() };
        assert!(matches!(form.create(&mut tasks), Err(StoreError::MissingField("title"))));
        let form = TaskForm { title: "t".into(), ..Default::default() };
        assert!(matches!(form.create(&mut tasks), Err(StoreError::MissingField("assigned to"))));
        assert!(tasks.is_empty());
    }

    #[test]
    fn task_form_edit_keeps_id_and_date() {
        let (_dir, _, mut tasks) = stores();
        let created = TaskForm { title: "t".into(), assigned_to: "bob".into(), ..Default::default() }
            .create(&mut tasks)
            .unwrap();

        let mut form = TaskForm::from_task(&created);
        form.status = "Done".into();
        form.title = "renamed".into();
        let updated = form.apply(&mut tasks, &created).unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.created_date, created.created_date);
        assert_eq!(tasks.get_by_id(created.id), Some(updated));
    }

    #[test]
    fn task_form_edit_rejects_unknown_status() {
        let (_dir, _, mut tasks) = stores();
        let created = TaskForm { title: "t".into(), assigned_to: "bob".into(), ..Default::default() }
            .create(&mut tasks)
            .unwrap();
        let form = TaskForm { status: "Blocked".into(), ..TaskForm::from_task(&created) };
        assert!(matches!(form.apply(&mut tasks, &created), Err(StoreError::InvalidStatus(_))));
        assert_eq!(tasks.get_by_id(created.id), Some(created));
    }
}
