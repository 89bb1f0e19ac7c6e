use crate::codec::Record;

/// Login credential. The password is kept and compared as plain text,
/// matching the existing `users.csv` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password: String,
}

impl User {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into() }
    }
}

impl Record for User {
    const HEADER: &'static str = "username,password";
    const ARITY: usize = 2;

    fn to_fields(&self) -> Vec<String> {
        vec![self.username.clone(), self.password.clone()]
    }

    /// A row with an empty password, such as `bob,`, is treated as malformed.
    fn from_fields(fields: &[&str]) -> Option<Self> {
        if fields[1].is_empty() {
            return None;
        }
        Some(Self::new(fields[0], fields[1]))
    }
}


/// The authenticated user for one login, owned by the caller.
///
/// Starts logged out; [`CredentialStore::authenticate`] fills it and
/// [`Session::logout`] clears it.
///
/// [`CredentialStore::authenticate`]: crate::credential_store::CredentialStore::authenticate
#[derive(Debug, Default, Clone)]
pub struct Session {
    subject: Option<User>,
}

impl Session {
    pub fn current(&self) -> Option<&User> {
        self.subject.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.subject.is_some()
    }

    pub fn logout(&mut self) {
        self.subject = None;
    }

    pub(crate) fn begin(&mut self, user: User) {
        self.subject = Some(user);
    }

    /// Keep the cached password in step with a change made on disk.
    pub(crate) fn sync_password(&mut self, username: &str, password: &str) {
        if let Some(user) = self.subject.as_mut().filter(|u| u.username == username) {
            user.password = password.to_string();
        }
    }
}
