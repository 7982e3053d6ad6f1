// ABOUTME: Error taxonomy for site lifecycle operations

use crate::docker::ClientError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("invalid site name '{0}': use lowercase letters, digits and hyphens")]
    InvalidName(String),
    #[error("site name '{0}' is reserved")]
    ReservedName(String),
    #[error("site '{0}' already exists")]
    AlreadyExists(String),
    #[error("site '{0}' does not exist")]
    NotFound(String),
    #[error("filesystem operation failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("container engine call failed: {0}")]
    Engine(#[from] ClientError),
    /// The database command ran but exited non-zero. Carries the captured
    /// output so the caller can see what the database said.
    #[error("database command exited with code {code}: {output}")]
    CommandFailed { code: i64, output: String },
}
