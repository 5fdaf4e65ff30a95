//! Format configuration: `OptionalRecordFields`, `MessagePartsOrder`, and
//! `LogRecordDetails`, with strict construction-time validation.
//!
//! Every invalid combination is rejected at construction with a message
//! naming the offending field, rather than deferred to render time.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{PyrologError, Result};

/// Which optional fields a formatter is allowed to render. Each flag gates
/// the corresponding [`FieldToken`] from appearing in a
/// [`LogRecordDetails`]'s `message_parts_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OptionalRecordFields {
    pub file_name: bool,
    pub file_path: bool,
    pub lineno: bool,
    pub func_name: bool,
    pub thread_id: bool,
    pub thread_name: bool,
    pub process_id: bool,
    pub process_name: bool,
    pub task_name: bool,
    pub relative_created: bool,
    pub logger_name: bool,
}

impl OptionalRecordFields {
    pub fn none() -> Self {
        OptionalRecordFields::default()
    }

    pub fn all() -> Self {
        OptionalRecordFields {
            file_name: true,
            file_path: true,
            lineno: true,
            func_name: true,
            thread_id: true,
            thread_name: true,
            process_id: true,
            process_name: true,
            task_name: true,
            relative_created: true,
            logger_name: true,
        }
    }

    fn is_enabled(&self, token: FieldToken) -> bool {
        match token {
            FieldToken::Level => true,
            FieldToken::FileName => self.file_name,
            FieldToken::FilePath => self.file_path,
            FieldToken::Lineno => self.lineno,
            FieldToken::FuncName => self.func_name,
            FieldToken::ThreadId => self.thread_id,
            FieldToken::ThreadName => self.thread_name,
            FieldToken::ProcessId => self.process_id,
            FieldToken::ProcessName => self.process_name,
            FieldToken::TaskName => self.task_name,
            FieldToken::RelativeCreated => self.relative_created,
            FieldToken::LoggerName => self.logger_name,
        }
    }
}

/// A single token in `message_parts_order`. `timestamp`, `message`,
/// `exc_info`, and `stack_info` are deliberately absent: they have fixed
/// positions and must never appear in the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldToken {
    Level,
    FileName,
    FilePath,
    Lineno,
    FuncName,
    ThreadId,
    ThreadName,
    ProcessId,
    ProcessName,
    TaskName,
    RelativeCreated,
    LoggerName,
}

impl FieldToken {
    fn parse(token: &str) -> Result<Self> {
        Ok(match token {
            "level" => FieldToken::Level,
            "file_name" => FieldToken::FileName,
            "file_path" => FieldToken::FilePath,
            "lineno" => FieldToken::Lineno,
            "func_name" => FieldToken::FuncName,
            "thread_id" => FieldToken::ThreadId,
            "thread_name" => FieldToken::ThreadName,
            "process_id" => FieldToken::ProcessId,
            "process_name" => FieldToken::ProcessName,
            "task_name" => FieldToken::TaskName,
            "relative_created" => FieldToken::RelativeCreated,
            "logger_name" => FieldToken::LoggerName,
            "timestamp" | "message" => {
                return Err(PyrologError::InvalidConfiguration(format!(
                    "'{token}' is fixed (timestamp is always first, message always last) and must not appear in message_parts_order"
                )));
            }
            "exc_info" | "stack_info" => {
                return Err(PyrologError::InvalidConfiguration(format!(
                    "'{token}' is a diagnostics field and must not appear in message_parts_order"
                )));
            }
            other => {
                return Err(PyrologError::InvalidConfiguration(format!(
                    "unknown message_parts_order token '{other}'"
                )));
            }
        })
    }
}

static FRACTIONAL_SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"%(\d+)f").unwrap());

/// Validates the date-format grammar: `%1f`..`%6f` are accepted fractional-
/// second widths; `%7f` and above are rejected.
fn validate_date_format(fmt: &str) -> Result<()> {
    for capture in FRACTIONAL_SECONDS.captures_iter(fmt) {
        let width: u32 = capture[1].parse().unwrap_or(0);
        if !(1..=6).contains(&width) {
            return Err(PyrologError::InvalidConfiguration(format!(
                "date-format specifier '%{}f' is out of range; only %1f..%6f are supported",
                &capture[1]
            )));
        }
    }
    Ok(())
}

/// Immutable rendering configuration for one formatter instance.
#[derive(Debug, Clone)]
pub struct LogRecordDetails {
    pub date_format: String,
    pub separator: char,
    pub optional_fields: OptionalRecordFields,
    pub message_parts_order: Vec<FieldToken>,
    pub color_all_fields: bool,
}

impl LogRecordDetails {
    /// Builds a details object from string tokens (the natural public
    /// surface: callers write `&["level", "lineno"]`), validating every
    /// invariant before returning.
    pub fn new(
        date_format: impl Into<String>,
        separator: char,
        optional_fields: OptionalRecordFields,
        message_parts_order: &[&str],
        color_all_fields: bool,
    ) -> Result<Self> {
        let date_format = date_format.into();
        validate_date_format(&date_format)?;

        let order: Vec<FieldToken> = message_parts_order
            .iter()
            .map(|t| FieldToken::parse(t))
            .collect::<Result<_>>()?;

        let level_count = order.iter().filter(|t| **t == FieldToken::Level).count();
        if !order.is_empty() && level_count != 1 {
            return Err(PyrologError::InvalidConfiguration(format!(
                "message_parts_order must contain 'level' exactly once when non-empty, found {level_count}"
            )));
        }

        for token in &order {
            if !optional_fields.is_enabled(*token) {
                return Err(PyrologError::InvalidConfiguration(format!(
                    "message_parts_order references a field disabled in optional_fields: {token:?}"
                )));
            }
        }

        Ok(LogRecordDetails {
            date_format,
            separator,
            optional_fields,
            message_parts_order: order,
            color_all_fields,
        })
    }

    /// The default "simple mode" details: empty bitset, empty order, default
    /// separator and date format.
    pub fn simple() -> Self {
        LogRecordDetails {
            date_format: "%Y-%m-%d %H:%M:%S%3f".to_string(),
            separator: '|',
            optional_fields: OptionalRecordFields::none(),
            message_parts_order: Vec::new(),
            color_all_fields: false,
        }
    }

    pub fn is_simple_mode(&self) -> bool {
        self.message_parts_order.is_empty()
    }
}
