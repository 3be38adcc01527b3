//! Error types shared across the blobsync crates

use thiserror::Error;

/// Result alias used throughout blobsync
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the sync engine and its collaborators
///
/// `NotFound` is an expected outcome that drives policy decisions (a missing
/// remote object means "needs upload"); it is never retried. `Network` covers
/// transport and service failures and may be retried. `Io` is a local
/// filesystem failure. `Config` is fatal and reported before any work starts.
#[derive(Error, Debug)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True if this error means the remote object or container is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound("x".to_string()).is_not_found());
        assert!(!Error::Network("x".to_string()).is_not_found());
        assert!(!Error::Config("x".to_string()).is_not_found());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
