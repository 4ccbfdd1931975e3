use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Failed to open process: {0}")]
    ProcessOpenFailed(String),

    #[error("Failed to resolve owner identity: {0}")]
    IdentityUnresolved(String),

    #[error("Failed to query memory regions: {0}")]
    ScanFailed(String),

    #[error("Player name scan did not finish within {0:?}")]
    ScanTimedOut(Duration),

    #[error("Failed to read process memory at address {address:#x}: {message}")]
    MemoryReadFailed { address: u64, message: String },

    #[error("Invalid player name: {0}")]
    InvalidName(String),

    #[error("A player name scan is already in progress")]
    Busy,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors that simply mean "nothing to read yet" and are expected while
    /// the game is closed or still starting up.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Error::ProcessNotFound(_) | Error::IdentityUnresolved(_) | Error::Busy
        )
    }
}
