//! Convenience `{time}`/`{level}`/`{message}`/`{extra}` template strings,
//! supplemental to the declarative `message_parts_order` pipeline.
//!
//! This is a thin sugar layer over [`crate::format::engine`]. It does not
//! bypass the strict validation in [`crate::format::details`]; `{extra}`
//! renders the same structured-fields fragment `engine::render` appends.

use chrono::{DateTime, Local};

use crate::record::LogRecord;

/// Renders `template` by substituting `{time}`, `{level}`, `{message}`, and
/// `{extra}` placeholders. Unknown placeholders are left verbatim. This is
/// a convenience layer, not a strict grammar like `LogRecordDetails`.
pub fn format_with_template(template: &str, record: &LogRecord, date_format: &str) -> String {
    let local_time: DateTime<Local> = record.timestamp.into();
    let time = local_time.format(date_format).to_string();

    template
        .replace("{time}", &time)
        .replace("{level}", &record.level_name)
        .replace("{message}", &record.message)
        .replace("{extra}", record.fields.render().trim())
}
