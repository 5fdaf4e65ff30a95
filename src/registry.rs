//! Logger registry and lifecycle.
//!
//! A single `Lazy<RwLock<...>>` singleton behind a handful of free
//! functions, keyed by dotted logger name, mapping each name to an
//! `Arc<Logger>` so sinks and lifecycle flags live on the logger itself.

use std::sync::Arc;

use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{PyrologError, Result};
use crate::level::{self, LevelStyle, Severity, INFO, NOTSET};
use crate::logger::Logger;

const ROOT_NAME: &str = "root";

struct RegistryState {
    root_severity: Severity,
    loggers: AHashMap<String, Arc<Logger>>,
}

static REGISTRY: Lazy<RwLock<RegistryState>> = Lazy::new(|| {
    RwLock::new(RegistryState {
        root_severity: INFO,
        loggers: AHashMap::new(),
    })
});

/// Installs the internal root with `default_severity`.
///
/// Idempotent if called again with the same severity; otherwise replaces
/// the root's severity.
pub fn initialize(default_severity: Severity) {
    REGISTRY.write().root_severity = default_severity;
}

/// Returns a snapshot mapping of every registered level name to its
/// severity.
pub fn levels() -> AHashMap<String, Severity> {
    level::levels()
}

/// Returns the logger named `name`, creating it if absent.
///
/// A logger that already exists and is retired is returned as-is;
/// retirement is only undone by an explicit [`destroy`] followed by a
/// fresh call to this function. The name `root` is reserved for the
/// registry's internal root logger and is rejected.
pub fn get(name: &str, severity: Severity) -> Result<Arc<Logger>> {
    if name == ROOT_NAME {
        return Err(PyrologError::NameConflict(
            "'root' is reserved for the registry's internal root logger".to_string(),
        ));
    }
    let mut state = REGISTRY.write();
    if let Some(existing) = state.loggers.get(name) {
        return Ok(existing.clone());
    }
    let logger = Arc::new(Logger::new(name.to_string(), severity));
    state.loggers.insert(name.to_string(), logger.clone());
    Ok(logger)
}

/// Adds or overrides a level.
pub fn register_level(
    name: &str,
    severity: Severity,
    style: LevelStyle,
    allow_override: bool,
) -> Result<()> {
    level::register_level(name, severity, style, allow_override)
}

/// Replaces every known level's style with the given theme, or restores
/// the built-in defaults when `theme` is `None`.
pub fn apply_color_theme(theme: Option<&AHashMap<String, LevelStyle>>) {
    level::apply_color_theme(theme)
}

/// Flushes and closes a logger's sinks and marks it retired.
///
/// Subsequent emissions are silently dropped and the name remains
/// reserved. Fails with `LifecycleViolation` if the logger has already
/// been destroyed.
pub fn retire(logger: &Arc<Logger>) -> Result<()> {
    if logger.is_destroyed() {
        return Err(PyrologError::LifecycleViolation(format!(
            "logger '{}' has already been destroyed",
            logger.name()
        )));
    }
    logger.retire();
    Ok(())
}

/// Retires the logger, then removes it from the registry so a subsequent
/// [`get`] creates a fresh logger under the same name.
///
/// Fails with `LifecycleViolation` if the logger has already been
/// destroyed. The registry entry is only removed if it still points at
/// this exact logger, so destroying a stale handle after the name has
/// already been recreated by `get` leaves the new logger untouched.
pub fn destroy(logger: &Arc<Logger>) -> Result<()> {
    if logger.is_destroyed() {
        return Err(PyrologError::LifecycleViolation(format!(
            "logger '{}' has already been destroyed",
            logger.name()
        )));
    }
    logger.retire();
    let mut state = REGISTRY.write();
    if let Some(current) = state.loggers.get(logger.name()) {
        if Arc::ptr_eq(current, logger) {
            state.loggers.remove(logger.name());
        }
    }
    logger.mark_destroyed();
    Ok(())
}

/// Walks the dotted-name parent chain starting at `name` for the first
/// logger with an explicit (non-NOTSET) severity, falling back to the
/// root's severity if none is found.
pub fn effective_severity(name: &str) -> Severity {
    let state = REGISTRY.read();
    let mut current = name;
    loop {
        if let Some(logger) = state.loggers.get(current) {
            let severity = logger.explicit_severity();
            if severity != NOTSET {
                return severity;
            }
        }
        match current.rfind('.') {
            Some(idx) => current = &current[..idx],
            None => break,
        }
    }
    state.root_severity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{DEBUG, WARNING};

    #[test]
    fn get_rejects_root_name() {
        let err = get("root", INFO).unwrap_err();
        assert!(matches!(err, PyrologError::NameConflict(_)));
    }

    #[test]
    fn get_is_idempotent_for_the_same_name() {
        let a = get("registry.idempotent", INFO).unwrap();
        let b = get("registry.idempotent", WARNING).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn destroy_frees_the_name_for_recreation() {
        let first = get("registry.destroy_me", INFO).unwrap();
        destroy(&first).unwrap();
        let second = get("registry.destroy_me", INFO).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!second.is_destroyed());
    }

    #[test]
    fn destroy_twice_is_a_lifecycle_violation() {
        let logger = get("registry.destroy_twice", INFO).unwrap();
        destroy(&logger).unwrap();
        let err = destroy(&logger).unwrap_err();
        assert!(matches!(err, PyrologError::LifecycleViolation(_)));
    }

    #[test]
    fn destroying_a_stale_handle_does_not_remove_the_recreated_logger() {
        let first = get("registry.stale", INFO).unwrap();
        destroy(&first).unwrap();
        let second = get("registry.stale", INFO).unwrap();

        // `first` is a stale Arc for a name that has already been recreated.
        // Calling destroy on it again is rejected outright...
        assert!(destroy(&first).is_err());

        // ...and even if a caller could replay the registry-removal step, the
        // ptr_eq guard means it would never touch the live second logger.
        let still_there = get("registry.stale", NOTSET).unwrap();
        assert!(Arc::ptr_eq(&second, &still_there));
    }

    #[test]
    fn notset_child_inherits_from_parent() {
        initialize(INFO);
        let parent = get("registry.parent", DEBUG).unwrap();
        let _child = get("registry.parent.child", NOTSET).unwrap();
        assert_eq!(effective_severity("registry.parent.child"), DEBUG);
        let _ = parent;
    }

    #[test]
    fn notset_with_no_ancestor_falls_back_to_root() {
        initialize(WARNING);
        let _logger = get("registry.orphan", NOTSET).unwrap();
        assert_eq!(effective_severity("registry.orphan"), WARNING);
    }
}
