//! The `Logger` type: sink ownership, emission, and lifecycle state.
//!
//! Emission builds one [`crate::record::LogRecord`] via
//! [`crate::record::LogRecordBuilder`] and fans it out to this logger's own
//! [`crate::sink::Sink`] trait objects: a console sink plus an ordered
//! list of file sinks.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::audit;
use crate::debug::lifecycle_notice;
use crate::error::{PyrologError, Result};
use crate::level::{self, Severity};
use crate::record::{CallSite, ExceptionInfo, Fields, LogRecord, LogRecordBuilder};
use crate::registry;
use crate::sink::Sink;

/// A named logger.
///
/// Holds at most one console sink and an ordered list of file sinks.
pub struct Logger {
    name: String,
    explicit_severity: AtomicU32,
    console_sink: RwLock<Option<Arc<dyn Sink>>>,
    file_sinks: RwLock<Vec<Arc<dyn Sink>>>,
    retired: AtomicBool,
    destroyed: AtomicBool,
    last_record: Mutex<Option<LogRecord>>,
}

impl Logger {
    pub(crate) fn new(name: String, severity: Severity) -> Self {
        Logger {
            name,
            explicit_severity: AtomicU32::new(severity),
            console_sink: RwLock::new(None),
            file_sinks: RwLock::new(Vec::new()),
            retired: AtomicBool::new(false),
            destroyed: AtomicBool::new(false),
            last_record: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn explicit_severity(&self) -> Severity {
        self.explicit_severity.load(Ordering::SeqCst)
    }

    pub fn is_retired(&self) -> bool {
        self.retired.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    /// Returns true if a record at `severity` would be dispatched right now,
    /// given this logger's lifecycle state and effective severity.
    pub fn is_enabled(&self, severity: Severity) -> bool {
        if self.is_retired() || self.is_destroyed() {
            return false;
        }
        severity >= registry::effective_severity(&self.name)
    }

    fn check_not_destroyed(&self) -> Result<()> {
        if self.is_destroyed() {
            return Err(PyrologError::LifecycleViolation(format!(
                "logger '{}' has already been destroyed",
                self.name
            )));
        }
        Ok(())
    }

    /// Attaches a console sink, replacing any sink previously attached.
    ///
    /// Fails with `LifecycleViolation` if this logger has already been
    /// destroyed.
    pub fn add_console(&self, sink: Arc<dyn Sink>) -> Result<()> {
        self.check_not_destroyed()?;
        *self.console_sink.write() = Some(sink);
        Ok(())
    }

    /// Appends a file sink to this logger's ordered list of file sinks.
    ///
    /// Fails with `LifecycleViolation` if this logger has already been
    /// destroyed.
    pub fn add_file(&self, sink: Arc<dyn Sink>) -> Result<()> {
        self.check_not_destroyed()?;
        self.file_sinks.write().push(sink);
        Ok(())
    }

    /// Returns the last record emitted by this logger, for test inspection.
    pub fn get_record(&self) -> Option<LogRecord> {
        self.last_record.lock().clone()
    }

    /// Writes `text` verbatim to every attached sink, bypassing formatting
    /// entirely. Used for banners and gradients.
    pub fn raw(&self, text: &str) {
        if self.is_retired() || self.is_destroyed() {
            return;
        }
        if let Some(sink) = self.console_sink.read().as_ref() {
            sink.raw(text);
        }
        for sink in self.file_sinks.read().iter() {
            sink.raw(text);
        }
    }

    /// Builds and dispatches one record.
    ///
    /// Called by the per-level macros after they've already checked
    /// `is_enabled`; callers invoking this directly still get the
    /// lifecycle/severity guard below, so a double dispatch from a stale
    /// check is harmless, just wasted work.
    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &self,
        severity: Severity,
        level_name: &str,
        message: String,
        fields: Fields,
        call_site: CallSite,
        exc_info: Option<ExceptionInfo>,
        stack_info: Option<String>,
    ) {
        if self.is_retired() || self.is_destroyed() {
            return;
        }
        if !self.is_enabled(severity) {
            return;
        }

        let record = LogRecordBuilder {
            severity,
            level_name: level_name.to_string(),
            logger_name: self.name.clone(),
            message,
            fields,
            call_site,
            task_name: None,
            exc_info,
            stack_info,
        }
        .build();

        if let Some(sink) = self.console_sink.read().as_ref() {
            sink.emit(&record);
        }
        for sink in self.file_sinks.read().iter() {
            sink.emit(&record);
        }
        audit::dispatch(&record);

        *self.last_record.lock() = Some(record);
    }

    pub(crate) fn set_explicit_severity(&self, severity: Severity) {
        self.explicit_severity.store(severity, Ordering::SeqCst);
    }

    pub(crate) fn retire(&self) {
        if self.retired.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(sink) = self.console_sink.read().as_ref() {
            sink.flush();
            sink.close();
        }
        for sink in self.file_sinks.read().iter() {
            sink.flush();
            sink.close();
        }
    }

    pub(crate) fn mark_destroyed(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            lifecycle_notice(&self.name, "already destroyed");
        }
    }
}

/// Used by the generic `log!` macro for user-registered levels; resolves
/// severity from the level registry at call time since custom levels have
/// no dedicated convenience method.
pub fn resolve_level(name: &str) -> Option<(Severity, String)> {
    level::lookup(name).map(|entry| (entry.severity, entry.name))
}
