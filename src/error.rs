use thiserror::Error;
use tracing::{error, warn};

/// Domain-specific errors for the launcher engine.
///
/// Nothing here is fatal to the hosting process: callers either degrade
/// to fewer/stale results or log-and-continue via [`ResultExt`].
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("scan root unavailable: {path}")]
    RootUnavailable { path: String },

    #[error("access denied while scanning '{path}': {source}")]
    AccessDenied {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed bundle at '{path}': {reason}")]
    MalformedBundle { path: String, reason: String },

    #[error("failed to parse bundle manifest: {0}")]
    ManifestParse(#[from] serde_json::Error),
}

/// Extension trait for silent error logging with caller location tracking.
/// Use when the operation is recoverable and the caller should continue.
pub trait ResultExt<T> {
    /// Log error with caller location and return None. Use for recoverable failures.
    fn log_err(self) -> Option<T>;
    /// Log as warning with caller location and return None. Use for expected failures.
    fn warn_on_err(self) -> Option<T>;
}

impl<T, E: std::fmt::Debug> ResultExt<T> for std::result::Result<T, E> {
    #[track_caller]
    fn log_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                error!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation failed"
                );
                None
            }
        }
    }

    #[track_caller]
    fn warn_on_err(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(err) => {
                let caller = std::panic::Location::caller();
                warn!(
                    error = ?err,
                    file = caller.file(),
                    line = caller.line(),
                    "Operation had warning"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_err_returns_some_on_ok() {
        let result: Result<i32, std::io::Error> = Ok(42);
        assert_eq!(result.log_err(), Some(42));
    }

    #[test]
    fn log_err_returns_none_on_err() {
        let result: Result<i32, std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::Other, "boom"));
        assert_eq!(result.log_err(), None);
    }

    #[test]
    fn error_messages_name_the_path() {
        let err = EngineError::RootUnavailable {
            path: "/missing".to_string(),
        };
        assert!(err.to_string().contains("/missing"));
    }
}
