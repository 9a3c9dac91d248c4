use thiserror::Error;

/// Errors produced by the wikiguard core.
#[derive(Debug, Error)]
pub enum GuardError {
    /// The path escapes the content root, names a hidden file, or does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller lacks the permission bits required for the operation.
    #[error("access denied: {0}")]
    AccessDenied(String),

    /// A throttle call arrived after the worker was shut down.
    #[error("throttle worker has been shut down")]
    ThrottleStopped,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("io error: {0}")]
    Io(std::io::Error),
}

impl GuardError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, GuardError::NotFound(_))
    }

    pub fn is_access_denied(&self) -> bool {
        matches!(self, GuardError::AccessDenied(_))
    }
}

/// Missing paths become [`GuardError::NotFound`]; every other OS error stays an I/O error.
impl From<std::io::Error> for GuardError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            GuardError::NotFound(format!("path not found: {e}"))
        } else {
            GuardError::Io(e)
        }
    }
}

pub type GuardResult<T> = Result<T, GuardError>;
