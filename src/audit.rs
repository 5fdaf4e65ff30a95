//! Process-wide audit fan-out.
//!
//! One `Lazy<RwLock<...>>` singleton guards a single audit sink shared by
//! every logger in the process, independent of each logger's own sinks.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::Result;
use crate::format::{self, LogRecordDetails};
use crate::record::LogRecord;
use crate::rotation::RotationLogic;
use crate::sink::file::RotatingFileSink;
use crate::sink::Sink;

struct AuditState {
    sink: Option<Arc<RotatingFileSink>>,
    details: LogRecordDetails,
}

static ACTIVE: AtomicBool = AtomicBool::new(false);
static STATE: Lazy<RwLock<AuditState>> = Lazy::new(|| {
    RwLock::new(AuditState {
        sink: None,
        details: LogRecordDetails::simple(),
    })
});

/// Installs the audit sink and flips the active flag. Existing loggers need
/// no reconfiguration; their next emission picks up the new flag.
pub fn start(
    log_dir: &Path,
    file_name: &str,
    rotation: RotationLogic,
    details: LogRecordDetails,
) -> Result<()> {
    let sink = RotatingFileSink::new(log_dir, file_name, rotation, details.clone(), true)?;
    let mut state = STATE.write();
    if let Some(old) = state.sink.take() {
        old.close();
    }
    state.sink = Some(Arc::new(sink));
    state.details = details;
    ACTIVE.store(true, Ordering::SeqCst);
    Ok(())
}

/// Flushes and closes the audit sink, clearing the active flag. No further
/// records reach the audit file after this returns.
pub fn stop() {
    ACTIVE.store(false, Ordering::SeqCst);
    let mut state = STATE.write();
    if let Some(sink) = state.sink.take() {
        sink.close();
    }
}

pub fn is_active() -> bool {
    ACTIVE.load(Ordering::SeqCst)
}

/// Fans `record` out to the audit sink, tagged with its originating logger
/// name, if audit is currently active. A no-op otherwise.
pub fn dispatch(record: &LogRecord) {
    if !is_active() {
        return;
    }
    let state = STATE.read();
    if let Some(sink) = &state.sink {
        let rendered = format::render_audit(record, &state.details, true);
        sink.raw(&rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CallSite, Fields, LogRecordBuilder};
    use std::sync::Mutex;

    // Audit state is process-global; serialize tests that touch it.
    static GUARD: Mutex<()> = Mutex::new(());

    fn record(logger_name: &str, message: &str) -> LogRecord {
        LogRecordBuilder {
            severity: 20,
            level_name: "INFO".to_string(),
            logger_name: logger_name.to_string(),
            message: message.to_string(),
            fields: Fields::new(),
            call_site: CallSite::new("src/main.rs", 1, "run"),
            task_name: None,
            exc_info: None,
            stack_info: None,
        }
        .build()
    }

    #[test]
    fn start_activates_and_stop_deactivates() {
        let _guard = GUARD.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let rotation = RotationLogic::by_size(1_000_000, 1).unwrap();
        start(dir.path(), "a.log", rotation, LogRecordDetails::simple()).unwrap();
        assert!(is_active());
        stop();
        assert!(!is_active());
    }

    #[test]
    fn dispatch_writes_prefixed_records_while_active() {
        let _guard = GUARD.lock().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let rotation = RotationLogic::by_size(1_000_000, 1).unwrap();
        start(dir.path(), "a.log", rotation, LogRecordDetails::simple()).unwrap();

        dispatch(&record("X", "hello"));
        dispatch(&record("Y", "world"));
        stop();

        let content = std::fs::read_to_string(dir.path().join("a.log")).unwrap();
        assert!(content.contains("[X]: "));
        assert!(content.contains("[Y]: "));
    }

    #[test]
    fn dispatch_is_a_no_op_before_start() {
        let _guard = GUARD.lock().unwrap();
        stop();
        dispatch(&record("Z", "ignored"));
    }
}
