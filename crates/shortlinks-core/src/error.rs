use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum CoreError {
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
}

#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("short id already exists: {0}")]
    Conflict(String),
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("storage initialization failed: {0}")]
    Initialization(String),
    #[error("storage operation failed: {0}")]
    Operation(String),
}

#[derive(Debug, Clone, Error)]
pub enum CacheError {
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
    #[error("cache operation timed out: {0}")]
    Timeout(String),
    #[error("cache value is invalid: {0}")]
    InvalidData(String),
    #[error("cache initialization failed: {0}")]
    Initialization(String),
    #[error("cache operation failed: {0}")]
    Operation(String),
}

/// Errors surfaced by the link manager to its caller.
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
    /// Every creation round collided with existing ids.
    #[error("unable to allocate a short id after {rounds} rounds (length is now {length})")]
    Exhausted { rounds: usize, length: usize },
    #[error("invalid short id: {0}")]
    InvalidShortId(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("short id length listener failed: {0}")]
    LengthListener(String),
    /// The manager was configured with values it cannot allocate with.
    #[error("invalid manager settings: {0}")]
    InvalidSettings(String),
}

impl From<CoreError> for ManagerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortId(message) => Self::InvalidShortId(message),
        }
    }
}
