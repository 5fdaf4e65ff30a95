//! pyrolog: structured, color-aware, concurrency-safe application logging.
//!
//! A named hierarchy of loggers dispatches immutable records to a console
//! sink and zero or more rotating file sinks, with an optional process-wide
//! audit fan-out that mirrors every event into one central file. Built for
//! CLI tools, daemons, and multi-process applications that need readable
//! human output and safe file rotation under concurrency.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pyrolog::{format::LogRecordDetails, registry, sink::console::ConsoleSink};
//!
//! registry::initialize(pyrolog::level::INFO);
//! let logger = registry::get("app", pyrolog::level::NOTSET).unwrap();
//! logger.add_console(Arc::new(ConsoleSink::new(LogRecordDetails::simple()))).unwrap();
//! pyrolog::info!(logger, "started up");
//! ```

pub mod ansi;
pub mod audit;
pub mod debug;
pub mod error;
pub mod format;
pub mod level;
pub mod logger;
#[macro_use]
pub mod macros;
pub mod record;
pub mod registry;
pub mod rotation;
pub mod sink;

pub use error::{PyrologError, Result};
pub use logger::Logger;
pub use record::LogRecord;
