//! Level registry: severity integers, default styles, and runtime
//! registration of new levels.
//!
//! A mutable table rather than a fixed match over a handful of built-in
//! variants, since pyrolog owns its whole rendering pipeline and needs to
//! support user-registered levels at runtime.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::{PyrologError, Result};

/// Non-negative severity integer. Higher is more severe. `Severity::NOTSET`
/// (0) means "inherit from parent" when used as a logger's explicit
/// severity.
pub type Severity = u32;

pub const NOTSET: Severity = 0;
pub const TRACE: Severity = 5;
pub const DEBUG: Severity = 10;
pub const INFO: Severity = 20;
pub const WARNING: Severity = 30;
pub const ERROR: Severity = 40;
pub const CRITICAL: Severity = 50;

/// Text intensity for a rendered level token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intensity {
    Normal,
    Bold,
    Dim,
}

/// Style flags orthogonal to color and intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StyleFlags {
    pub underline: bool,
    pub italic: bool,
    pub strike: bool,
}

/// Immutable color/style description for a level.
///
/// `foreground`/`background` are ANSI 256-color codes (0-255), rendered as
/// `ESC [ 38 ; 5 ; N m` / `ESC [ 48 ; 5 ; N m`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelStyle {
    pub foreground: u8,
    pub background: Option<u8>,
    pub intensity: Intensity,
    pub flags: StyleFlags,
}

impl LevelStyle {
    pub const fn new(foreground: u8) -> Self {
        LevelStyle {
            foreground,
            background: None,
            intensity: Intensity::Normal,
            flags: StyleFlags {
                underline: false,
                italic: false,
                strike: false,
            },
        }
    }

    pub const fn with_background(mut self, background: u8) -> Self {
        self.background = Some(background);
        self
    }

    pub const fn with_intensity(mut self, intensity: Intensity) -> Self {
        self.intensity = intensity;
        self
    }

    /// Returns a dimmed variant of this style, used when `color_all_fields`
    /// is set on `LogRecordDetails`.
    pub fn dimmed(&self) -> Self {
        LevelStyle {
            intensity: Intensity::Dim,
            ..*self
        }
    }
}

/// A registered level: name, severity, and default style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelEntry {
    pub name: String,
    pub severity: Severity,
    pub style: LevelStyle,
}

fn default_levels() -> AHashMap<String, LevelEntry> {
    let mut map = AHashMap::new();
    let builtins: &[(&str, Severity, LevelStyle)] = &[
        ("TRACE", TRACE, LevelStyle::new(37).with_intensity(Intensity::Dim)), // white, dim
        ("DEBUG", DEBUG, LevelStyle::new(36)),                               // cyan
        ("INFO", INFO, LevelStyle::new(32)),                                 // green
        ("WARNING", WARNING, LevelStyle::new(33)),                          // yellow
        ("ERROR", ERROR, LevelStyle::new(31)),                              // red
        (
            "CRITICAL",
            CRITICAL,
            LevelStyle::new(231)
                .with_background(124)
                .with_intensity(Intensity::Bold),
        ),
    ];
    for (name, severity, style) in builtins {
        map.insert(
            name.to_string(),
            LevelEntry {
                name: name.to_string(),
                severity: *severity,
                style: *style,
            },
        );
    }
    map
}

struct LevelRegistry {
    levels: AHashMap<String, LevelEntry>,
}

static LEVEL_REGISTRY: Lazy<RwLock<LevelRegistry>> = Lazy::new(|| {
    RwLock::new(LevelRegistry {
        levels: default_levels(),
    })
});

/// Returns a snapshot mapping of level name to severity.
pub fn levels() -> AHashMap<String, Severity> {
    LEVEL_REGISTRY
        .read()
        .levels
        .iter()
        .map(|(name, entry)| (name.clone(), entry.severity))
        .collect()
}

/// Looks up a registered level's severity and style by name. Lookups are
/// case-sensitive: level names are tokens, not free text.
pub fn lookup(name: &str) -> Option<LevelEntry> {
    LEVEL_REGISTRY.read().levels.get(name).cloned()
}

/// Registers a new level, or overrides an existing one.
///
/// Fails with `NameConflict` if `name` already exists with a *different*
/// severity and `allow_override` is false. Registering an existing name
/// with the *same* severity is a no-op rather than an error: it cannot
/// represent a meaningful conflict since nothing about the level changes.
pub fn register_level(
    name: &str,
    severity: Severity,
    style: LevelStyle,
    allow_override: bool,
) -> Result<()> {
    if name.is_empty() {
        return Err(PyrologError::InvalidConfiguration(
            "level name must not be empty".to_string(),
        ));
    }
    let mut registry = LEVEL_REGISTRY.write();
    if let Some(existing) = registry.levels.get(name) {
        if existing.severity != severity && !allow_override {
            return Err(PyrologError::NameConflict(format!(
                "level '{name}' already registered with severity {}, refusing to change to {severity} without an explicit override",
                existing.severity
            )));
        }
    }
    registry.levels.insert(
        name.to_string(),
        LevelEntry {
            name: name.to_string(),
            severity,
            style,
        },
    );
    Ok(())
}

/// Replaces every known level's style with the provided theme. Passing
/// `None` restores the built-in defaults.
pub fn apply_color_theme(theme: Option<&AHashMap<String, LevelStyle>>) {
    let mut registry = LEVEL_REGISTRY.write();
    match theme {
        Some(theme) => {
            for (name, style) in theme {
                if let Some(entry) = registry.levels.get_mut(name) {
                    entry.style = *style;
                }
            }
        }
        None => {
            registry.levels = default_levels();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_severities_match_spec() {
        assert_eq!(lookup("TRACE").unwrap().severity, 5);
        assert_eq!(lookup("DEBUG").unwrap().severity, 10);
        assert_eq!(lookup("INFO").unwrap().severity, 20);
        assert_eq!(lookup("WARNING").unwrap().severity, 30);
        assert_eq!(lookup("ERROR").unwrap().severity, 40);
        assert_eq!(lookup("CRITICAL").unwrap().severity, 50);
    }

    #[test]
    fn register_level_rejects_severity_collision() {
        let err = register_level("INFO", 21, LevelStyle::new(32), false).unwrap_err();
        assert!(matches!(err, PyrologError::NameConflict(_)));
    }

    #[test]
    fn register_level_same_severity_is_a_no_op() {
        register_level("INFO", 20, LevelStyle::new(32), false).unwrap();
    }

    #[test]
    fn register_level_with_override_replaces_severity() {
        register_level("NOTICE", 25, LevelStyle::new(35), false).unwrap();
        register_level("NOTICE", 26, LevelStyle::new(35), true).unwrap();
        assert_eq!(lookup("NOTICE").unwrap().severity, 26);
    }

    #[test]
    fn apply_color_theme_restores_defaults_on_none() {
        let mut theme = AHashMap::new();
        theme.insert("INFO".to_string(), LevelStyle::new(99));
        apply_color_theme(Some(&theme));
        assert_eq!(lookup("INFO").unwrap().style.foreground, 99);

        apply_color_theme(None);
        assert_eq!(lookup("INFO").unwrap().style.foreground, 32);
    }

    #[test]
    fn dimmed_preserves_color_but_changes_intensity() {
        let style = LevelStyle::new(32);
        let dim = style.dimmed();
        assert_eq!(dim.foreground, 32);
        assert_eq!(dim.intensity, Intensity::Dim);
    }
}
