//! Run subdirectory names derived from the local clock

use crate::{Error, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Write;

/// Default run name pattern, e.g. `250208143005`
pub const DEFAULT_DATE_PATTERN: &str = "%y%m%d%H%M%S";

/// Check that `pattern` only contains valid strftime specifiers
pub fn validate_pattern(pattern: &str) -> Result<()> {
    if pattern.trim().is_empty() || StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
        return Err(Error::InvalidDatePattern {
            pattern: pattern.to_string(),
        });
    }
    Ok(())
}

/// Format `time` with `pattern`
pub fn format_date<Tz>(time: &DateTime<Tz>, pattern: &str) -> Result<String>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    validate_pattern(pattern)?;

    let mut formatted = String::new();
    write!(formatted, "{}", time.format(pattern)).map_err(|_| Error::InvalidDatePattern {
        pattern: pattern.to_string(),
    })?;
    Ok(formatted)
}

/// Current local date and time formatted with `pattern`
pub fn current_date_and_time(pattern: &str) -> Result<String> {
    format_date(&Local::now(), pattern)
}
