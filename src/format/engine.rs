//! The rendering engine: one pipeline shared by the plain, color, and audit
//! formatter variants. Drives a declarative `message_parts_order`
//! rather than a fixed field layout, so callers can reorder, omit, or
//! color individual fields without touching this module.

use chrono::{DateTime, Local, Timelike};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::ansi::paint;
use crate::format::details::{FieldToken, LogRecordDetails};
use crate::level::{self, LevelStyle};
use crate::record::LogRecord;

const LEVEL_WIDTH: usize = 8;

static FRACTIONAL_SECONDS: Lazy<Regex> = Lazy::new(|| Regex::new(r"%(\d+)f").unwrap());

/// Expands `%1f`..`%6f` in `fmt` into zero-padded fractional-second digits of
/// `dt`, then hands the remainder to chrono's own strftime engine.
fn render_timestamp(dt: DateTime<Local>, fmt: &str) -> String {
    let nanos = dt.nanosecond();
    let expanded = FRACTIONAL_SECONDS.replace_all(fmt, |caps: &regex::Captures| {
        let width: usize = caps[1].parse().unwrap_or(3);
        let scaled = nanos / 10u32.pow(9 - width as u32);
        format!("{scaled:0width$}")
    });
    dt.format(&expanded).to_string()
}

fn field_token_value(record: &LogRecord, token: FieldToken) -> String {
    match token {
        FieldToken::Level => format!("{:<width$}", record.level_name, width = LEVEL_WIDTH),
        FieldToken::FileName => record.call_site.file_name.clone(),
        FieldToken::FilePath => record.call_site.file_path.clone(),
        FieldToken::Lineno => record.call_site.line_number.to_string(),
        FieldToken::FuncName => record.call_site.function_name.clone(),
        FieldToken::ThreadId => record.thread.id.clone(),
        FieldToken::ThreadName => record.thread.name.clone(),
        FieldToken::ProcessId => record.process.id.to_string(),
        FieldToken::ProcessName => record.process.name.clone(),
        FieldToken::TaskName => record.task_name.clone().unwrap_or_default(),
        FieldToken::RelativeCreated => record.relative_created_ms.to_string(),
        FieldToken::LoggerName => record.logger_name.clone(),
    }
}

fn colorize_field(token: FieldToken, text: String, style: &LevelStyle, details: &LogRecordDetails) -> String {
    if token == FieldToken::Level {
        paint(&text, style)
    } else if details.color_all_fields {
        paint(&text, &style.dimmed())
    } else {
        text
    }
}

/// Renders one `LogRecord` under `details`, with or without ANSI (`color`).
/// Returns the full line, including any trailing diagnostics lines.
pub fn render(record: &LogRecord, details: &LogRecordDetails, color: bool) -> String {
    let local_time: DateTime<Local> = record.timestamp.into();
    let timestamp = render_timestamp(local_time, &details.date_format);
    let style = level::lookup(&record.level_name).map(|e| e.style);

    let mut line = timestamp;

    let sep = format!(" {} ", details.separator);

    if details.is_simple_mode() {
        let level_text = format!("{:<width$}", record.level_name, width = LEVEL_WIDTH);
        let level_rendered = match (&style, color) {
            (Some(style), true) => paint(&level_text, style),
            _ => level_text,
        };
        line.push_str(&sep);
        line.push_str(&level_rendered);
    } else {
        for token in &details.message_parts_order {
            let raw = field_token_value(record, *token);
            let rendered = match (&style, color) {
                (Some(style), true) => colorize_field(*token, raw, style, details),
                _ => raw,
            };
            line.push_str(&sep);
            line.push_str(&rendered);
        }
    }

    line.push_str(&sep);
    let message = match (&style, color) {
        (Some(style), true) => paint(&record.message, style),
        _ => record.message.clone(),
    };
    line.push_str(&message);

    line.push_str(&record.fields.render());

    if let Some(exc) = &record.exc_info {
        line.push('\n');
        line.push_str(&format!("{}: {}\n{}", exc.type_name, exc.value, exc.rendered_traceback));
    }
    if let Some(stack) = &record.stack_info {
        line.push('\n');
        line.push_str(stack);
    }

    line
}

/// Wraps a rendered line with the audit fan-out's `[<source-logger-name>]: `
/// prefix.
pub fn render_audit(record: &LogRecord, details: &LogRecordDetails, color: bool) -> String {
    let body = render(record, details, color);
    format!("[{}]: {body}", record.logger_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::details::OptionalRecordFields;
    use crate::record::{CallSite, Fields, LogRecordBuilder};

    fn sample_record() -> LogRecord {
        LogRecordBuilder {
            severity: 20,
            level_name: "INFO".to_string(),
            logger_name: "demo".to_string(),
            message: "hello".to_string(),
            fields: Fields::new(),
            call_site: CallSite::new("src/main.rs", 12, "run"),
            task_name: None,
            exc_info: None,
            stack_info: None,
        }
        .build()
    }

    #[test]
    fn simple_mode_places_timestamp_level_message_in_order() {
        let details = LogRecordDetails::simple();
        let record = sample_record();
        let rendered = render(&record, &details, false);
        let level_pos = rendered.find("INFO").unwrap();
        let message_pos = rendered.find("hello").unwrap();
        assert!(level_pos < message_pos);
        assert!(rendered.starts_with(|c: char| c.is_ascii_digit()));
    }

    #[test]
    fn color_mode_wraps_level_with_ansi() {
        let details = LogRecordDetails::simple();
        let record = sample_record();
        let rendered = render(&record, &details, true);
        assert!(rendered.contains("\u{1b}["));
    }

    #[test]
    fn plain_mode_has_no_ansi() {
        let details = LogRecordDetails::simple();
        let record = sample_record();
        let rendered = render(&record, &details, false);
        assert!(!rendered.contains('\u{1b}'));
    }

    #[test]
    fn ordered_fields_render_between_level_and_message() {
        let details = LogRecordDetails::new(
            "%Y-%m-%d",
            '|',
            OptionalRecordFields { lineno: true, ..OptionalRecordFields::none() },
            &["lineno", "level"],
            false,
        )
        .unwrap();
        let record = sample_record();
        let rendered = render(&record, &details, false);
        let lineno_pos = rendered.find("12").unwrap();
        let level_pos = rendered.find("INFO").unwrap();
        let message_pos = rendered.find("hello").unwrap();
        assert!(lineno_pos < level_pos);
        assert!(level_pos < message_pos);
    }

    #[test]
    fn structured_fields_render_after_message() {
        let details = LogRecordDetails::simple();
        let mut record = sample_record();
        record.fields.push("k", "v");
        let rendered = render(&record, &details, false);
        assert!(rendered.ends_with("{ k = 'v' }"));
    }

    #[test]
    fn audit_rendering_prefixes_source_logger_name() {
        let details = LogRecordDetails::simple();
        let record = sample_record();
        let rendered = render_audit(&record, &details, false);
        assert!(rendered.starts_with("[demo]: "));
    }
}
