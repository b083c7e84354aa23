use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to bring a cartridge into the core. Fatal to the load attempt
/// only; the driver keeps whatever state it had before.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read cartridge {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cartridge image is empty")]
    Empty,

    #[error("cartridge declares {declared} bytes but {actual} were read")]
    SizeMismatch { declared: usize, actual: usize },

    #[error("cartridge is {size} bytes; the core accepts at most {max}")]
    TooLarge { size: usize, max: usize },

    #[error("core rejected the cartridge: {0}")]
    Rejected(#[source] AdapterError),
}

/// Failure at the foreign core boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("native core backend is not enabled (build with features 'bundled' or 'system')")]
    Unavailable,

    #[error("native core is already owned by another adapter")]
    AlreadyClaimed,

    #[error("core call `{op}` failed: {reason}")]
    Call { op: &'static str, reason: String },
}

impl AdapterError {
    pub fn call(op: &'static str, reason: impl Into<String>) -> Self {
        AdapterError::Call {
            op,
            reason: reason.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum DriverError {
    #[error(transparent)]
    Load(#[from] LoadError),

    /// The session is over; the driver stops ticking.
    #[error("emulation core failure: {0}")]
    Adapter(#[from] AdapterError),

    #[error("invalid driver usage: {0}")]
    InvalidState(&'static str),
}
