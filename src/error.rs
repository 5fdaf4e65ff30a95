//! Error types for pyrolog configuration and lifecycle operations.
//!
//! Construction-time validation (invalid date formats, malformed field
//! orderings, negative rotation bounds, name collisions) is surfaced to the
//! caller synchronously through [`PyrologError`]. Emission-time failures
//! (a sink that can't be written to) never raise from the logging call path;
//! see [`crate::debug::sink_failure`] for how those are reported instead.

use std::fmt;

/// GitHub-style issue tracker URL, included in error messages so users have
/// somewhere to report a bug that doesn't look like one of theirs.
const ISSUE_TRACKER: &str = "https://github.com/pyrolog/pyrolog";

/// Errors produced by pyrolog's construction-time validation and lifecycle
/// operations.
///
/// All variants carry a descriptive message naming the offending field or
/// value; none of them are raised from the emission path. Emission-time
/// failures are contained per-sink instead, see [`crate::debug::sink_failure`].
#[derive(Debug)]
pub enum PyrologError {
    /// A `LogRecordDetails` or `RotationLogic` value failed construction-time
    /// validation (illegal date specifier, field referenced but disabled,
    /// negative bound, and so on).
    InvalidConfiguration(String),
    /// A reserved name was used, or a level was registered under a name that
    /// already exists with a different severity.
    NameConflict(String),
    /// An explicit operation (not an emission) targeted a logger that has
    /// already been destroyed.
    LifecycleViolation(String),
    /// A sink failed to open, write, rotate, or delete a file.
    SinkIoError(String),
}

impl fmt::Display for PyrologError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PyrologError::InvalidConfiguration(detail) => {
                format!("invalid configuration: {detail}")
            }
            PyrologError::NameConflict(detail) => format!("name conflict: {detail}"),
            PyrologError::LifecycleViolation(detail) => format!("lifecycle violation: {detail}"),
            PyrologError::SinkIoError(detail) => format!("sink I/O error: {detail}"),
        };
        write!(
            f,
            "{msg}\n\nIf you believe this is a bug in pyrolog, please report it at: {ISSUE_TRACKER}"
        )
    }
}

impl std::error::Error for PyrologError {}

impl From<std::io::Error> for PyrologError {
    fn from(err: std::io::Error) -> Self {
        PyrologError::SinkIoError(err.to_string())
    }
}

/// Convenience result alias for pyrolog operations.
pub type Result<T> = std::result::Result<T, PyrologError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_issue_tracker() {
        let err = PyrologError::NameConflict("root is reserved".to_string());
        let msg = err.to_string();
        assert!(msg.contains("name conflict"));
        assert!(msg.contains(ISSUE_TRACKER));
    }

    #[test]
    fn io_error_converts_to_sink_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: PyrologError = io_err.into();
        assert!(matches!(err, PyrologError::SinkIoError(_)));
    }
}
