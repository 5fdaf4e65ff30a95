//! Standard-output sink.
//!
//! A direct writer to stdout through pyrolog's own rendering engine, with
//! output serialized by a mutex so interleaved writers never split a line.

use std::io::Write;

use parking_lot::Mutex;

use crate::debug::sink_failure;
use crate::format::{engine, LogRecordDetails};
use crate::record::LogRecord;
use crate::sink::Sink;

/// One per logger at most. Always renders with ANSI; callers wanting
/// plain text should not attach a console sink and instead inspect
/// `get_record()`, or wrap stdout themselves.
pub struct ConsoleSink {
    details: LogRecordDetails,
    writer: Mutex<()>,
}

impl ConsoleSink {
    pub fn new(details: LogRecordDetails) -> Self {
        ConsoleSink {
            details,
            writer: Mutex::new(()),
        }
    }
}

impl Sink for ConsoleSink {
    fn name(&self) -> &str {
        "console"
    }

    fn emit(&self, record: &LogRecord) {
        let rendered = engine::render(record, &self.details, true);
        let _guard = self.writer.lock();
        let mut stdout = std::io::stdout();
        if let Err(err) = writeln!(stdout, "{rendered}") {
            sink_failure(self.name(), "failed to write", &err);
        }
    }

    fn raw(&self, text: &str) {
        let _guard = self.writer.lock();
        let mut stdout = std::io::stdout();
        if let Err(err) = writeln!(stdout, "{text}") {
            sink_failure(self.name(), "failed to write raw text", &err);
        }
    }

    fn flush(&self) {
        let _guard = self.writer.lock();
        let _ = std::io::stdout().flush();
    }

    fn close(&self) {
        self.flush();
    }
}
