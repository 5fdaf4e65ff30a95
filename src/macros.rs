//! Emission macros.
//!
//! Call-site capture happens at the caller's own expansion site via
//! `file!()`/`line!()`/a function-name trick, since there's no runtime
//! frame inspection to fall back on. Each macro checks `is_enabled`
//! *before* formatting its arguments, so message construction is genuinely
//! lazy.
//!
//! A trailing `; fields: expr, exc_info: expr, stack_info: expr` clause
//! (any subset, any order) mirrors the full emission signature's
//! `fields`/`exc_info`/`stack_info` keyword arguments.

/// Recovers the name of the enclosing function via the classic
/// type-name-of-a-local-fn trick. Not part of any public API surface on its
/// own, used internally by the per-level macros.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __f() {}
        fn __type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let __name = __type_name_of(__f);
        &__name[..__name.len() - 5]
    }};
}

/// Tt-muncher that folds an optional `fields: expr, exc_info: expr,
/// stack_info: expr` clause (any subset, any order, comma-separated) into a
/// `(fields, Option<exc_info>, Option<stack_info>)` tuple expression. Not
/// part of the public API; used internally by [`__pyrolog_emit`].
#[macro_export]
macro_rules! __pyrolog_meta {
    (@ $fields:expr, $exc:expr, $stack:expr) => {
        ($fields, $exc, $stack)
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; fields: $val:expr) => {
        ($val, $exc, $stack)
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; fields: $val:expr, $($rest:tt)*) => {
        $crate::__pyrolog_meta!(@ $val, $exc, $stack ; $($rest)*)
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; exc_info: $val:expr) => {
        ($fields, Some($val), $stack)
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; exc_info: $val:expr, $($rest:tt)*) => {
        $crate::__pyrolog_meta!(@ $fields, Some($val), $stack ; $($rest)*)
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; stack_info: $val:expr) => {
        ($fields, $exc, Some($val))
    };
    (@ $fields:expr, $exc:expr, $stack:expr ; stack_info: $val:expr, $($rest:tt)*) => {
        $crate::__pyrolog_meta!(@ $fields, $exc, Some($val) ; $($rest)*)
    };
}

/// Internal emission primitive shared by every per-level macro and by
/// [`log`]. Not part of the public API; use the level macros instead.
#[macro_export]
macro_rules! __pyrolog_emit {
    ($logger:expr, $severity:expr, $level_name:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {{
        let __logger = &$logger;
        if __logger.is_enabled($severity) {
            let __call_site = $crate::record::CallSite::new(file!(), line!(), $crate::function_name!());
            let __message = format!($fmt $(, $arg)*);
            let (__fields, __exc, __stack) = $crate::__pyrolog_meta!(
                @ $crate::record::Fields::new(), None, None $(; $($meta)*)?
            );
            __logger.emit($severity, $level_name, __message, __fields, __call_site, __exc, __stack);
        }
    }};
}

/// Emits at `TRACE`. `logger, "template", args...`, optionally followed by
/// `; fields: expr, exc_info: expr, stack_info: expr` (any subset, any
/// order).
#[macro_export]
macro_rules! trace {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::TRACE, "TRACE", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

#[macro_export]
macro_rules! debug {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::DEBUG, "DEBUG", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::INFO, "INFO", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

#[macro_export]
macro_rules! warning {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::WARNING, "WARNING", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::ERROR, "ERROR", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

#[macro_export]
macro_rules! critical {
    ($logger:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {
        $crate::__pyrolog_emit!($logger, $crate::level::CRITICAL, "CRITICAL", $fmt $(, $arg)* $(; $($meta)*)?)
    };
}

/// Emits at a level looked up by name at call time, the shim for
/// user-registered levels keyed by the level-name string. A name with no
/// registered level is silently a no-op, consistent with the rest of the
/// library never raising from an emission call path.
#[macro_export]
macro_rules! log {
    ($logger:expr, $level_name:expr, $fmt:literal $(, $arg:expr)* $(; $($meta:tt)*)?) => {{
        if let Some((__severity, __name)) = $crate::logger::resolve_level($level_name) {
            $crate::__pyrolog_emit!($logger, __severity, &__name, $fmt $(, $arg)* $(; $($meta)*)?);
        }
    }};
}

#[cfg(test)]
mod tests {
    use crate::level::INFO;
    use crate::logger::Logger;
    use crate::record::ExceptionInfo;

    #[test]
    fn info_macro_emits_when_enabled() {
        let logger = Logger::new("macros.info".to_string(), INFO);
        crate::info!(logger, "hello {}", "world");
        let record = logger.get_record().unwrap();
        assert_eq!(record.message, "hello world");
        assert_eq!(record.level_name, "INFO");
    }

    #[test]
    fn debug_macro_is_a_no_op_below_threshold() {
        let logger = Logger::new("macros.debug".to_string(), INFO);
        crate::debug!(logger, "hidden");
        assert!(logger.get_record().is_none());
    }

    #[test]
    fn fields_clause_attaches_structured_fields() {
        let mut fields = crate::record::Fields::new();
        fields.push("k", "v");
        let logger = Logger::new("macros.fields".to_string(), INFO);
        crate::info!(logger, "hello"; fields: fields);
        let record = logger.get_record().unwrap();
        assert_eq!(record.fields.render(), " { k = 'v' }");
    }

    #[test]
    fn exc_info_clause_attaches_exception_diagnostics() {
        let logger = Logger::new("macros.exc_info".to_string(), INFO);
        let exc = ExceptionInfo {
            type_name: "std::io::Error".to_string(),
            value: "disk full".to_string(),
            rendered_traceback: String::new(),
        };
        crate::error!(logger, "write failed"; exc_info: exc);
        let record = logger.get_record().unwrap();
        assert_eq!(record.exc_info.unwrap().value, "disk full");
    }

    #[test]
    fn fields_and_stack_info_clauses_combine() {
        let mut fields = crate::record::Fields::new();
        fields.push("k", 1i64);
        let logger = Logger::new("macros.combo".to_string(), INFO);
        crate::warning!(logger, "slow path"; fields: fields, stack_info: "frame0\nframe1".to_string());
        let record = logger.get_record().unwrap();
        assert_eq!(record.fields.render(), " { k = 1 }");
        assert_eq!(record.stack_info.unwrap(), "frame0\nframe1");
    }

    #[test]
    fn generic_log_macro_resolves_custom_level() {
        crate::level::register_level("NOTICE", 25, crate::level::LevelStyle::new(35), true).unwrap();
        let logger = Logger::new("macros.generic".to_string(), 20);
        crate::log!(logger, "NOTICE", "custom level message");
        let record = logger.get_record().unwrap();
        assert_eq!(record.level_name, "NOTICE");
        assert_eq!(record.severity, 25);
    }

    #[test]
    fn generic_log_macro_is_a_no_op_for_unknown_level() {
        let logger = Logger::new("macros.unknown".to_string(), INFO);
        crate::log!(logger, "NOT_A_LEVEL", "dropped");
        assert!(logger.get_record().is_none());
    }
}
