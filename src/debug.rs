//! Internal side-channel diagnostics.
//!
//! Emission-time failures must never raise from the logging call path.
//! Instead a sink that fails to write, rotate, or lock reports a one-line
//! notice to stderr, naming the sink, and the record is dropped for that
//! sink only. Always-on stderr path; no separate opt-in debug log file.

use std::io::Write;

/// Reports a sink failure as a one-line stderr notice naming the sink.
pub fn sink_failure(sink_name: &str, context: &str, error: &dyn std::fmt::Display) {
    let _ = writeln!(
        std::io::stderr(),
        "[pyrolog] sink '{sink_name}' {context}: {error}"
    );
}

/// Reports a dropped record due to a lifecycle violation on a retired
/// logger. Per-record drops stay silent on emission; this exists only for
/// the explicit-operation path, destroy/retire of an already-destroyed
/// logger.
pub fn lifecycle_notice(logger_name: &str, context: &str) {
    let _ = writeln!(std::io::stderr(), "[pyrolog] logger '{logger_name}' {context}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sink_failure_does_not_panic() {
        sink_failure("audit", "failed to rotate", &"disk full");
    }
}
