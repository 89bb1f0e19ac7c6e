//! Task tracker record stores: users and tasks kept in comma-delimited files,
//! with the form checks and report aggregates the front-end uses.

pub mod codec;
pub mod config;
pub mod credential_store;
pub mod error;
pub mod forms;
pub mod report;
pub mod task;
pub mod task_store;
pub mod user;

pub use config::Config;
pub use credential_store::CredentialStore;
pub use error::{Result, StoreError};
pub use report::Report;
pub use task::{NewTask, Status, Task};
pub use task_store::TaskStore;
pub use user::{Session, User};
