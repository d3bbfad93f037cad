use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;
use tracing::warn;

use crate::error::SnifferError;
use crate::models::HourField;

/// Timezone a corpus uses when none is configured.
pub const DEFAULT_TIMEZONE: &str = "US/Pacific";

// ── System timezone detection ─────────────────────────────────────────────────

/// Detect the IANA timezone name of the running system.
///
/// Falls back to `"UTC"` if detection fails.
pub fn get_system_timezone() -> String {
    iana_time_zone::get_timezone().unwrap_or_else(|_| "UTC".to_string())
}

/// Resolve a timezone identifier.
///
/// `"auto"` resolves to the system timezone (UTC when the system zone is not
/// a known IANA name); anything else must be a valid IANA identifier.
pub fn resolve_timezone(name: &str) -> crate::Result<Tz> {
    if name.eq_ignore_ascii_case("auto") {
        let system = get_system_timezone();
        return Ok(system.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "unrecognised system timezone \"{}\", falling back to UTC",
                system
            );
            Tz::UTC
        }));
    }
    name.parse::<Tz>()
        .map_err(|_| SnifferError::InvalidTimezone(name.to_string()))
}

// ── TimestampParser ───────────────────────────────────────────────────────────

/// Parses the date column of social-media exports.
pub struct TimestampParser;

impl TimestampParser {
    /// Parse `s` into a timestamp that keeps its original UTC offset.
    ///
    /// Accepts RFC 3339, RFC 2822, the Twitter API form
    /// (`Wed Oct 10 20:19:24 +0000 2018`), space-separated date-times with a
    /// numeric offset or a trailing `UTC`/`GMT`, and naive date-times or
    /// dates, which are taken as UTC.
    pub fn parse(s: &str) -> crate::Result<DateTime<FixedOffset>> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(SnifferError::TimestampParse(s.to_string()));
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(dt);
        }
        if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
            return Ok(dt);
        }

        const OFFSET_FORMATS: &[&str] = &[
            "%a %b %d %H:%M:%S %z %Y",
            "%Y-%m-%d %H:%M:%S%.f%:z",
            "%Y-%m-%d %H:%M:%S%:z",
            "%Y-%m-%d %H:%M:%S%.f %z",
            "%Y-%m-%d %H:%M:%S %z",
            "%Y-%m-%dT%H:%M:%S%.f%z",
        ];
        for fmt in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(trimmed, fmt) {
                return Ok(dt);
            }
        }

        let naive_part = trimmed
            .strip_suffix(" UTC")
            .or_else(|| trimmed.strip_suffix(" GMT"))
            .unwrap_or(trimmed);

        const NAIVE_FORMATS: &[&str] = &[
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M:%S%.f",
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%d %H:%M",
        ];
        for fmt in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(naive_part, fmt) {
                return Ok(naive.and_utc().fixed_offset());
            }
        }
        if let Ok(date) = NaiveDate::parse_from_str(naive_part, "%Y-%m-%d") {
            if let Some(naive) = date.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc().fixed_offset());
            }
        }

        Err(SnifferError::TimestampParse(s.to_string()))
    }
}

// ── TimeFeatures ──────────────────────────────────────────────────────────────

/// Temporal features derived from a single timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeFeatures {
    pub hour: f64,
    pub hour_utc: f64,
    pub weekday: u32,
}

// ── TimezoneHandler ───────────────────────────────────────────────────────────

/// Derives local/UTC hour features in a fixed corpus timezone.
#[derive(Debug, Clone, Copy)]
pub struct TimezoneHandler {
    tz: Tz,
}

impl Default for TimezoneHandler {
    fn default() -> Self {
        Self::new(Tz::US__Pacific)
    }
}

impl TimezoneHandler {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    /// Build a handler from an IANA identifier or `"auto"`.
    pub fn from_name(name: &str) -> crate::Result<Self> {
        resolve_timezone(name).map(Self::new)
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }

    /// IANA name of the configured zone, e.g. `"US/Pacific"`.
    pub fn name(&self) -> &'static str {
        self.tz.name()
    }

    /// Label shown on plots for the given hour column.
    pub fn display_label(&self, field: HourField) -> &'static str {
        match field {
            HourField::Local => self.name(),
            HourField::Utc => "UTC",
        }
    }

    /// Derive `hour`, `hour_utc` and `weekday` from `date`.
    ///
    /// The minute fraction is taken from `date` as written, before any
    /// conversion, and is shared by both hour columns. The weekday is also
    /// taken from the unconverted timestamp.
    pub fn derive_features(&self, date: &DateTime<FixedOffset>) -> TimeFeatures {
        let fractional_hour = f64::from(date.minute()) / 60.0;
        let local = date.with_timezone(&self.tz);
        let utc = date.with_timezone(&Utc);

        TimeFeatures {
            hour: f64::from(local.hour()) + fractional_hour,
            hour_utc: f64::from(utc.hour()) + fractional_hour,
            weekday: date.weekday().num_days_from_monday(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
