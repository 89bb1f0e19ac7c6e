use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::codec;
use crate::error::{Result, StoreError};
use crate::user::{Session, User};

/// Account created the first time the credential file is initialized.
pub const SEED_USERNAME: &str = "admin";
pub const SEED_PASSWORD: &str = "admin123";

/// Username/password pairs backed by a delimited file.
///
/// Nothing is cached: each call reads the file, so edits made by another
/// instance are picked up on the next read.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Open the store, initializing the file if needed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let store = Self { path: path.into() };
        store.initialize()?;
        Ok(store)
    }

    /// Create the file with the seed account if it is absent. Never overwrites.
    pub fn initialize(&self) -> Result<()> {
        let seed = User::new(SEED_USERNAME, SEED_PASSWORD);
        if codec::create_table(&self.path, &[seed])? {
            info!(path = %self.path.display(), "created credential file with seed account");
        }
        Ok(())
    }

    /// All users in file order.
    pub fn load(&self) -> Result<Vec<User>> {
        let table = codec::read_table::<User>(&self.path)?;
        if table.skipped > 0 {
            warn!(skipped = table.skipped, path = %self.path.display(), "skipped malformed credential lines");
        }
        Ok(table.rows)
    }

    /// First user matching both fields exactly. On a match the session is
    /// started with that user; a miss leaves `session` untouched.
    pub fn authenticate(&self, session: &mut Session, username: &str, password: &str) -> Result<Option<User>> {
        let found = self
            .load()?
            .into_iter()
            .find(|u| u.username == username && u.password == password);
        match &found {
            Some(user) => {
                info!(username, "login succeeded");
                session.begin(user.clone());
            }
            None => debug!(username, "login failed"),
        }
        Ok(found)
    }

    /// Append a new account unless the username is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        if self.load()?.iter().any(|u| u.username == username) {
            return Err(StoreError::DuplicateUsername(username.to_string()));
        }
        let user = User::new(username, password);
        codec::append_row(&self.path, &user)?;
        info!(username, "registered user");
        Ok(user)
    }

    /// Replace the password of `username` and rewrite the file. If `session`
    /// belongs to that user its cached password is updated as well.
    pub fn change_password(&self, session: &mut Session, username: &str, new_password: &str) -> Result<()> {
        let mut users = self.load()?;
        let user = users
            .iter_mut()
            .find(|u| u.username == username)
            .ok_or_else(|| StoreError::UserNotFound(username.to_string()))?;
        user.password = new_password.to_string();

        codec::write_table(&self.path, &users)?;
        session.sync_password(username, new_password);
        info!(username, "password changed");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_store() -> (TempDir, CredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = CredentialStore::open(dir.path().join("users.csv")).unwrap();
        (dir, store)
    }

    #[test]
    fn initialize_seeds_admin() {
        let (_dir, store) = create_test_store();
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "username,password\nadmin,admin123\n"
        );
        assert_eq!(store.load().unwrap(), vec![User::new("admin", "admin123")]);
    }

    #[test]
    fn initialize_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        fs::write(&path, "username,password\ncarol,pw\n").unwrap();

        let store = CredentialStore::open(&path).unwrap();
        store.initialize().unwrap();
        assert_eq!(store.load().unwrap(), vec![User::new("carol", "pw")]);
    }

    #[test]
    fn authenticate_requires_exact_match() {
        let (_dir, store) = create_test_store();
        let mut session = Session::default();

        assert!(store.authenticate(&mut session, "admin", "wrong").unwrap().is_none());
        assert!(store.authenticate(&mut session, "Admin", "admin123").unwrap().is_none());
        assert!(!session.is_logged_in());

        let user = store.authenticate(&mut session, "admin", "admin123").unwrap();
        assert_eq!(user, Some(User::new("admin", "admin123")));
        assert_eq!(session.current().map(|u| u.username.as_str()), Some("admin"));
    }

    #[test]
    fn failed_login_keeps_existing_session() {
        let (_dir, store) = create_test_store();
        let mut session = Session::default();
        store.authenticate(&mut session, "admin", "admin123").unwrap();
        store.authenticate(&mut session, "admin", "nope").unwrap();
        assert!(session.is_logged_in());
    }

    #[test]
    fn logout_is_idempotent() {
        let (_dir, store) = create_test_store();
        let mut session = Session::default();
        store.authenticate(&mut session, "admin", "admin123").unwrap();
        session.logout();
        session.logout();
        assert!(session.current().is_none());
    }

    #[test]
    fn register_appends_and_rejects_duplicates() {
        let (_dir, store) = create_test_store();
        store.register("bob", "pw").unwrap();
        assert!(matches!(
            store.register("bob", "other"),
            Err(StoreError::DuplicateUsername(name)) if name == "bob"
        ));
        store.register("Bob", "pw2").unwrap();

        let names: Vec<String> = store.load().unwrap().into_iter().map(|u| u.username).collect();
        assert_eq!(names, vec!["admin", "bob", "Bob"]);
    }

    #[test]
    fn change_password_rewrites_file_and_syncs_session() {
        let (_dir, store) = create_test_store();
        store.register("bob", "pw").unwrap();
        let mut session = Session::default();
        store.authenticate(&mut session, "admin", "admin123").unwrap();

        store.change_password(&mut session, "admin", "newpw").unwrap();
        assert_eq!(session.current().unwrap().password, "newpw");
        assert_eq!(
            fs::read_to_string(store.path()).unwrap(),
            "username,password\nadmin,newpw\nbob,pw\n"
        );
    }

    #[test]
    fn change_password_of_other_user_leaves_session() {
        let (_dir, store) = create_test_store();
        store.register("bob", "pw").unwrap();
        let mut session = Session::default();
        store.authenticate(&mut session, "admin", "admin123").unwrap();

        store.change_password(&mut session, "bob", "pw2").unwrap();
        assert_eq!(session.current().unwrap().password, "admin123");
        let mut other = Session::default();
        assert!(store.authenticate(&mut other, "bob", "pw2").unwrap().is_some());
    }

    #[test]
    fn change_password_unknown_user() {
        let (_dir, store) = create_test_store();
        let mut session = Session::default();
        assert!(matches!(
            store.change_password(&mut session, "ghost", "x"),
            Err(StoreError::UserNotFound(name)) if name == "ghost"
        ));
    }

    #[test]
    fn load_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.csv");
        fs::write(&path, "username,password\nadmin,admin123\njunk\na,b,c\ndave,pw\n").unwrap();
        let store = CredentialStore::open(&path).unwrap();
        assert_eq!(store.load().unwrap().len(), 2);
    }
}
