use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal failures that abort a blast run.
///
/// Soft failures (a rejected candidate, an unwritable index entry) are not
/// represented here; they are logged and the run keeps going.
#[derive(Debug, Error)]
pub enum BlastError {
    #[error("unsupported platform: the netsh command surface requires Windows")]
    UnsupportedPlatform,

    #[error("wordlist not found: {0}")]
    WordlistMissing(PathBuf),

    #[error("failed to disconnect from the active network")]
    DisconnectFailed,

    #[error("failed to delete existing profile for \"{0}\"")]
    DeleteProfileFailed(String),

    #[error("failed to write connection profile to {path}: {source}")]
    ProfileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("network \"{ssid}\" not seen within {timeout:?}")]
    ScanTimeout { ssid: String, timeout: Duration },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BlastError>;
