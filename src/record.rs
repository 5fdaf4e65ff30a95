//! The immutable log record and its structured-field data model.
//!
//! A standalone value type rather than a `serde_json::Value` or a
//! `tracing::Event` builder. pyrolog depends on neither `tracing` nor
//! `serde_json`.

use std::time::{Duration, SystemTime};

use crate::level::Severity;

/// A structured field value attached to a record's merged fields mapping.
/// Nested maps render recursively.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
    Map(Fields),
}

impl FieldValue {
    /// Renders this value following the serialization rule: strings
    /// single-quoted, numbers/booleans unquoted, null literal, maps
    /// recursive.
    pub fn render(&self) -> String {
        match self {
            FieldValue::Str(s) => format!("'{s}'"),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Null => "null".to_string(),
            FieldValue::Map(fields) => format!("{{ {} }}", fields.render_inner()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_string())
    }
}
impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}
impl From<i64> for FieldValue {
    fn from(i: i64) -> Self {
        FieldValue::Int(i)
    }
}
impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}
impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

/// An ordered mapping of field name to value. Order is insertion order;
/// preserved through to rendering so repeated runs of the same call produce
/// stable output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fields(pub Vec<(String, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Fields(Vec::new())
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.0.push((key.into(), value.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Merges `other` into `self`. On key collision `other`'s value wins,
    /// replacing in place so relative order is preserved.
    pub fn merge(mut self, other: Fields) -> Fields {
        for (key, value) in other.0 {
            if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
                slot.1 = value;
            } else {
                self.0.push((key, value));
            }
        }
        self
    }

    /// Renders as `key = value, key = value` without the surrounding braces.
    /// The caller wraps with `{ ... }` and a leading space.
    pub fn render_inner(&self) -> String {
        self.0
            .iter()
            .map(|(key, value)| format!("{key} = {}", value.render()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Renders the full `{ key = value, ... }` fragment, or an empty string
    /// if there are no fields.
    pub fn render(&self) -> String {
        if self.is_empty() {
            String::new()
        } else {
            format!(" {{ {} }}", self.render_inner())
        }
    }
}

/// Call-site metadata captured by the emission macros via `file!()`,
/// `line!()`, and a type-name trick for the enclosing function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSite {
    pub file_path: String,
    pub file_name: String,
    pub line_number: u32,
    pub function_name: String,
}

impl CallSite {
    pub fn new(file_path: &str, line_number: u32, function_name: &str) -> Self {
        let file_name = file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(file_path)
            .to_string();
        CallSite {
            file_path: file_path.to_string(),
            file_name,
            line_number,
            function_name: function_name.to_string(),
        }
    }
}

/// Thread identity captured at emission time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub id: String,
    pub name: String,
}

/// Process identity captured once per process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub id: u32,
    pub name: String,
}

/// Rendered exception diagnostics, attached when the caller passes
/// `exc_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExceptionInfo {
    pub type_name: String,
    pub value: String,
    pub rendered_traceback: String,
}

impl ExceptionInfo {
    /// Builds an `ExceptionInfo` from a Rust error, walking `source()` to
    /// render a traceback-like chain. Rust has no interpreter-level
    /// traceback; the `source()` chain is the idiomatic stand-in.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        let mut rendered_traceback = String::new();
        let mut cause = err.source();
        while let Some(source) = cause {
            rendered_traceback.push_str(&format!("  caused by: {source}\n"));
            cause = source.source();
        }
        ExceptionInfo {
            type_name: std::any::type_name_of_val(err).to_string(),
            value: err.to_string(),
            rendered_traceback,
        }
    }
}

/// An immutable snapshot of a single log event, captured once at emission
/// and offered unchanged to every attached sink. Sinks must not mutate it.
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub timestamp: SystemTime,
    pub severity: Severity,
    pub level_name: String,
    pub logger_name: String,
    pub message: String,
    pub fields: Fields,
    pub call_site: CallSite,
    pub thread: ThreadInfo,
    pub process: ProcessInfo,
    pub task_name: Option<String>,
    pub relative_created_ms: u128,
    pub exc_info: Option<ExceptionInfo>,
    pub stack_info: Option<String>,
}

/// Process start time, used to compute `relative_created_ms`. Captured
/// once, lazily, on first record construction.
static PROCESS_START: std::sync::OnceLock<SystemTime> = std::sync::OnceLock::new();

fn process_start() -> SystemTime {
    *PROCESS_START.get_or_init(SystemTime::now)
}

pub struct LogRecordBuilder {
    pub severity: Severity,
    pub level_name: String,
    pub logger_name: String,
    pub message: String,
    pub fields: Fields,
    pub call_site: CallSite,
    pub task_name: Option<String>,
    pub exc_info: Option<ExceptionInfo>,
    pub stack_info: Option<String>,
}

impl LogRecordBuilder {
    pub fn build(self) -> LogRecord {
        let now = SystemTime::now();
        let relative: Duration = now
            .duration_since(process_start())
            .unwrap_or(Duration::ZERO);
        let thread = std::thread::current();
        LogRecord {
            timestamp: now,
            severity: self.severity,
            level_name: self.level_name,
            logger_name: self.logger_name,
            message: self.message,
            fields: self.fields,
            call_site: self.call_site,
            thread: ThreadInfo {
                id: format!("{:?}", thread.id()),
                name: thread.name().unwrap_or("unnamed").to_string(),
            },
            process: ProcessInfo {
                id: std::process::id(),
                name: std::env::current_exe()
                    .ok()
                    .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
                    .unwrap_or_else(|| "unknown".to_string()),
            },
            task_name: self.task_name,
            relative_created_ms: relative.as_millis(),
            exc_info: self.exc_info,
            stack_info: self.stack_info,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_render_matches_spec_serialization() {
        assert_eq!(FieldValue::from("x").render(), "'x'");
        assert_eq!(FieldValue::Int(42).render(), "42");
        assert_eq!(FieldValue::Bool(true).render(), "true");
        assert_eq!(FieldValue::Null.render(), "null");
    }

    #[test]
    fn fields_merge_keyword_wins_on_collision() {
        let mut base = Fields::new();
        base.push("a", 1i64);
        base.push("b", 2i64);
        let mut kw = Fields::new();
        kw.push("b", 3i64);
        let merged = base.merge(kw);
        assert_eq!(merged.0, vec![
            ("a".to_string(), FieldValue::Int(1)),
            ("b".to_string(), FieldValue::Int(3)),
        ]);
    }

    #[test]
    fn fields_render_wraps_with_braces_and_leading_space() {
        let mut fields = Fields::new();
        fields.push("k", "v");
        assert_eq!(fields.render(), " { k = 'v' }");
    }

    #[test]
    fn empty_fields_render_to_empty_string() {
        assert_eq!(Fields::new().render(), "");
    }

    #[test]
    fn nested_map_renders_recursively() {
        let mut inner = Fields::new();
        inner.push("n", 1i64);
        let mut outer = Fields::new();
        outer.push("m", FieldValue::Map(inner));
        assert_eq!(outer.render(), " { m = { n = 1 } }");
    }

    #[test]
    fn call_site_extracts_file_name_from_path() {
        let site = CallSite::new("/src/app/main.rs", 10, "run");
        assert_eq!(site.file_name, "main.rs");
    }

    #[test]
    fn exception_info_from_error_renders_source_chain() {
        #[derive(Debug)]
        struct Root;
        impl std::fmt::Display for Root {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "root cause")
            }
        }
        impl std::error::Error for Root {}

        #[derive(Debug)]
        struct Wrapper(Root);
        impl std::fmt::Display for Wrapper {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "wrapped failure")
            }
        }
        impl std::error::Error for Wrapper {
            fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
                Some(&self.0)
            }
        }

        let err = Wrapper(Root);
        let info = ExceptionInfo::from_error(&err);
        assert_eq!(info.value, "wrapped failure");
        assert!(info.rendered_traceback.contains("root cause"));
        assert!(info.type_name.contains("Wrapper"));
    }
}
