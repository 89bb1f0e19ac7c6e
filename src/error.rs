//! Error types for `flowtask`.

use std::path::PathBuf;

/// Failures reported by the record stores and the form helpers built on them.
///
/// Every variant is recoverable: callers show the message and carry on.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A status outside `Pending`, `Progress`, `Done`.
    #[error("invalid status '{0}' (expected Pending, Progress or Done)")]
    InvalidStatus(String),

    /// No task carries the given id.
    #[error("task #{0} not found")]
    TaskNotFound(u32),

    /// The id counter has no ids left to assign.
    #[error("no task ids left to assign")]
    IdsExhausted,

    /// No user carries the given username.
    #[error("user '{0}' not found")]
    UserNotFound(String),

    /// Registration attempted with a username that already exists.
    #[error("username '{0}' is already taken")]
    DuplicateUsername(String),

    /// The backing file could not be read or written.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File the operation touched.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A field contains the delimiter or a line break and cannot be stored.
    #[error("{column} cannot contain ',' or line breaks: {value:?}")]
    UnencodableField {
        /// Column name from the file header.
        column: &'static str,
        /// The rejected text.
        value: String,
    },

    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The current password given on a password change does not match.
    #[error("incorrect current password")]
    IncorrectPassword,

    /// New password and its confirmation differ.
    #[error("new passwords do not match")]
    PasswordMismatch,

    /// The operation needs an authenticated session.
    #[error("not logged in")]
    NotLoggedIn,
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, StoreError>;
