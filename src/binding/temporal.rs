//! Textual interchange formats for `datetime`, `time` and `timedelta`.
//!
//! Datetimes are RFC 3339; naive ISO 8601 datetimes (no offset) are read as
//! UTC. Durations are ISO 8601 (`P1DT2H30M`) or a plain number of seconds.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static ISO_DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<sign>[-+])?P(?:(?P<weeks>\d+(?:\.\d+)?)W)?(?:(?P<days>\d+(?:\.\d+)?)D)?(?:T(?:(?P<hours>\d+(?:\.\d+)?)H)?(?:(?P<minutes>\d+(?:\.\d+)?)M)?(?:(?P<seconds>\d+(?:\.\d+)?)S)?)?$",
    )
    .expect("ISO 8601 duration regex is valid")
});

const MICROS_PER_SECOND: i128 = 1_000_000;

pub fn parse_datetime(raw: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt);
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Seconds since the Unix epoch, fractional part kept to the microsecond.
pub fn datetime_from_timestamp(secs: f64) -> Option<DateTime<FixedOffset>> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1e6).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp_micros(micros as i64).map(|dt| dt.fixed_offset())
}

#[must_use]
pub fn format_datetime(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}

#[must_use]
pub fn format_time(t: &NaiveTime) -> String {
    t.format("%H:%M:%S%.f").to_string()
}

pub fn duration_from_seconds(secs: f64) -> Option<TimeDelta> {
    if !secs.is_finite() {
        return None;
    }
    let micros = (secs * 1e6).round();
    if micros.abs() > i64::MAX as f64 {
        return None;
    }
    Some(TimeDelta::microseconds(micros as i64))
}

/// ISO 8601 duration or a decimal number of seconds.
pub fn parse_duration(raw: &str) -> Option<TimeDelta> {
    if let Ok(secs) = raw.parse::<f64>() {
        return duration_from_seconds(secs);
    }

    let caps = ISO_DURATION.captures(raw)?;
    // "P" and "PT" alone carry no component
    if raw.trim_start_matches(['-', '+']).len() <= 1 || raw.ends_with('T') {
        return None;
    }

    let component = |name: &str, unit_secs: f64| -> Option<f64> {
        match caps.name(name) {
            Some(m) => m.as_str().parse::<f64>().ok().map(|v| v * unit_secs),
            None => Some(0.0),
        }
    };
    let total = component("weeks", 604_800.0)?
        + component("days", 86_400.0)?
        + component("hours", 3_600.0)?
        + component("minutes", 60.0)?
        + component("seconds", 1.0)?;
    let signed = if caps.name("sign").map(|m| m.as_str()) == Some("-") {
        -total
    } else {
        total
    };
    duration_from_seconds(signed)
}

/// Shortest ISO 8601 form: `P1DT2H`, `PT1M30.5S`, `-PT5S`, `PT0S`.
#[must_use]
pub fn format_duration(d: &TimeDelta) -> String {
    let total = i128::from(d.num_seconds()) * MICROS_PER_SECOND
        + i128::from(d.subsec_nanos() / 1_000);
    let negative = total < 0;
    let mut rem = total.unsigned_abs();

    let micros_per_second = MICROS_PER_SECOND.unsigned_abs();
    let days = rem / (86_400 * micros_per_second);
    rem %= 86_400 * micros_per_second;
    let hours = rem / (3_600 * micros_per_second);
    rem %= 3_600 * micros_per_second;
    let minutes = rem / (60 * micros_per_second);
    rem %= 60 * micros_per_second;
    let seconds = rem / micros_per_second;
    let fraction = rem % micros_per_second;

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push('P');
    if days > 0 {
        out.push_str(&format!("{days}D"));
    }
    if hours > 0 || minutes > 0 || seconds > 0 || fraction > 0 || days == 0 {
        out.push('T');
        if hours > 0 {
            out.push_str(&format!("{hours}H"));
        }
        if minutes > 0 {
            out.push_str(&format!("{minutes}M"));
        }
        if seconds > 0 || fraction > 0 || (hours == 0 && minutes == 0) {
            if fraction > 0 {
                let frac = format!("{fraction:06}");
                out.push_str(&format!("{seconds}.{}S", frac.trim_end_matches('0')));
            } else {
                out.push_str(&format!("{seconds}S"));
            }
        }
    }
    out
}
