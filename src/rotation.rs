//! Rotation policy: triggers, wall-time anchoring, and retention rules.
//!
//! Covers size triggers, named cadences, weekday/EVERYDAY wall-clock
//! anchoring, and independent age-based expiration.

use chrono::{DateTime, Datelike, Local, TimeZone, Timelike, Weekday};

use crate::error::{PyrologError, Result};

/// Rotation cadence. `Unset` means "no time-based trigger"; `max_bytes` must
/// then carry the sink's only trigger. At least one of max-bytes or when
/// must be set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum When {
    Unset,
    Second,
    Minute,
    Hour,
    Weekday(Weekday),
    Everyday,
}

/// Wall-clock anchor used by `Everyday` and `Weekday` cadences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl Default for Anchor {
    fn default() -> Self {
        Anchor { hour: 0, minute: 0, second: 0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationScale {
    Seconds,
    Minutes,
    Hours,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationRule {
    pub scale: ExpirationScale,
    pub interval: u64,
}

impl ExpirationRule {
    pub fn new(scale: ExpirationScale, interval: u64) -> Result<Self> {
        if interval == 0 {
            return Err(PyrologError::InvalidConfiguration(
                "expiration_rule interval must be >= 1".to_string(),
            ));
        }
        Ok(ExpirationRule { scale, interval })
    }

    /// Total age, as a `chrono::Duration`, beyond which a rotated file is
    /// expired.
    pub fn max_age(&self) -> chrono::Duration {
        let unit = match self.scale {
            ExpirationScale::Seconds => chrono::Duration::seconds(1),
            ExpirationScale::Minutes => chrono::Duration::minutes(1),
            ExpirationScale::Hours => chrono::Duration::hours(1),
            ExpirationScale::Days => chrono::Duration::days(1),
        };
        unit * self.interval as i32
    }
}

/// Immutable rotation configuration for a [`crate::sink::file::RotatingFileSink`].
#[derive(Debug, Clone)]
pub struct RotationLogic {
    pub max_bytes: Option<u64>,
    pub when: When,
    pub interval: u32,
    pub anchor: Anchor,
    pub backup_count: u32,
    pub expiration_rule: Option<ExpirationRule>,
    pub append_filename_pid: bool,
    pub append_filename_timestamp: bool,
}

#[allow(clippy::too_many_arguments)]
impl RotationLogic {
    pub fn new(
        max_bytes: Option<i64>,
        when: When,
        interval: i64,
        anchor: Anchor,
        backup_count: i64,
        expiration_rule: Option<ExpirationRule>,
        append_filename_pid: bool,
        append_filename_timestamp: bool,
    ) -> Result<Self> {
        let max_bytes = match max_bytes {
            Some(n) if n < 0 => {
                return Err(PyrologError::InvalidConfiguration(format!(
                    "max_bytes must be >= 0, got {n}"
                )));
            }
            Some(n) => Some(n as u64),
            None => None,
        };
        if max_bytes.is_none() && matches!(when, When::Unset) {
            return Err(PyrologError::InvalidConfiguration(
                "at least one of max_bytes or when must be set".to_string(),
            ));
        }
        if interval < 1 {
            return Err(PyrologError::InvalidConfiguration(format!(
                "interval must be >= 1, got {interval}"
            )));
        }
        if backup_count < 0 {
            return Err(PyrologError::InvalidConfiguration(format!(
                "backup_count must be >= 0, got {backup_count}"
            )));
        }
        Ok(RotationLogic {
            max_bytes,
            when,
            interval: interval as u32,
            anchor,
            backup_count: backup_count as u32,
            expiration_rule,
            append_filename_pid,
            append_filename_timestamp,
        })
    }

    /// Size-only rotation, the common case.
    pub fn by_size(max_bytes: u64, backup_count: u32) -> Result<Self> {
        RotationLogic::new(
            Some(max_bytes as i64),
            When::Unset,
            1,
            Anchor::default(),
            backup_count as i64,
            None,
            false,
            false,
        )
    }

    pub fn has_time_trigger(&self) -> bool {
        !matches!(self.when, When::Unset)
    }
}

/// Computes the next rotation boundary strictly after `from`, following the
/// anchoring rules below.
///
/// For `Everyday`/`Weekday` cadences, when the library starts mid-period the
/// first rotation lands at the next configured wall time after start, never
/// retroactively at a boundary already passed.
pub fn next_boundary(when: When, interval: u32, anchor: Anchor, from: DateTime<Local>) -> DateTime<Local> {
    match when {
        When::Unset => from,
        When::Second => from + chrono::Duration::seconds(interval as i64),
        When::Minute => from + chrono::Duration::minutes(interval as i64),
        When::Hour => from + chrono::Duration::hours(interval as i64),
        When::Everyday => next_daily_anchor(from, anchor),
        When::Weekday(target) => next_weekday_anchor(from, target, anchor),
    }
}

fn at_anchor(day: DateTime<Local>, anchor: Anchor) -> DateTime<Local> {
    day.with_hour(anchor.hour)
        .and_then(|d| d.with_minute(anchor.minute))
        .and_then(|d| d.with_second(anchor.second))
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(day)
}

fn next_daily_anchor(from: DateTime<Local>, anchor: Anchor) -> DateTime<Local> {
    let today_anchor = at_anchor(from, anchor);
    if today_anchor > from {
        today_anchor
    } else {
        at_anchor(from + chrono::Duration::days(1), anchor)
    }
}

fn next_weekday_anchor(from: DateTime<Local>, target: Weekday, anchor: Anchor) -> DateTime<Local> {
    let mut candidate = at_anchor(from, anchor);
    loop {
        if candidate.weekday() == target && candidate > from {
            return candidate;
        }
        candidate = at_anchor(candidate + chrono::Duration::days(1), anchor);
    }
}
