//! Temporal extent parsing and normalization.
//!
//! Capabilities documents describe the dates a layer has data for in several
//! ways: comma separated ISO 8601 instants, `start/end/period` intervals, or a
//! mix of both. Everything is normalized to one model: ascending, unique epoch
//! milliseconds, each anchored to 12:00 UTC on the instant's calendar date.
//!
//! Midnight and noon variants of the same day fold into one instant.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Hard cap on instants enumerated from a single interval.
pub const MAX_INTERVAL_INSTANTS: usize = 100_000;

const MS_PER_DAY: i64 = 86_400_000;

/// One segment of a raw temporal extent, discriminated by grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemporalExtent {
    /// Explicit instants, in document order.
    ExplicitList { instants: Vec<String> },
    /// `start/end/period`
    IntervalWithPeriod {
        start: String,
        end: String,
        period: String,
    },
}

impl TemporalExtent {
    /// Split a raw extent body into segments.
    ///
    /// Consecutive explicit instants are grouped into one `ExplicitList`;
    /// every fragment containing `/` becomes its own interval segment.
    pub fn split(raw: &str) -> Vec<TemporalExtent> {
        let mut segments = Vec::new();
        let mut instants = Vec::new();

        for fragment in raw.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if fragment.contains('/') {
                if !instants.is_empty() {
                    segments.push(TemporalExtent::ExplicitList {
                        instants: std::mem::take(&mut instants),
                    });
                }
                let mut parts = fragment.splitn(3, '/').map(str::trim);
                segments.push(TemporalExtent::IntervalWithPeriod {
                    start: parts.next().unwrap_or_default().to_string(),
                    end: parts.next().unwrap_or_default().to_string(),
                    period: parts.next().unwrap_or_default().to_string(),
                });
            } else {
                instants.push(fragment.to_string());
            }
        }

        if !instants.is_empty() {
            segments.push(TemporalExtent::ExplicitList { instants });
        }
        segments
    }
}

/// A temporal extent fragment that matched none of the known grammars.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unable to parse date fragment \"{fragment}\": {reason}")]
pub struct DateParseError {
    pub fragment: String,
    pub reason: String,
}

impl DateParseError {
    fn new(fragment: &str, reason: impl Into<String>) -> Self {
        Self {
            fragment: fragment.to_string(),
            reason: reason.into(),
        }
    }
}

/// Normalized days plus the fragments that had to be skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalParse {
    pub days: Vec<i64>,
    pub errors: Vec<DateParseError>,
}

/// Parse a raw extent body into ascending, unique, noon-anchored epoch ms.
///
/// Unparseable fragments are skipped and logged.
pub fn parse_temporal_extent(raw: &str) -> Vec<i64> {
    let parsed = parse_temporal_extent_detailed(raw);
    for error in &parsed.errors {
        warn!(fragment = %error.fragment, reason = %error.reason, "Skipping date fragment");
    }
    parsed.days
}

/// Same as [`parse_temporal_extent`] but returns skipped fragments instead of logging them.
pub fn parse_temporal_extent_detailed(raw: &str) -> TemporalParse {
    let mut days = BTreeSet::new();
    let mut errors = Vec::new();

    for segment in TemporalExtent::split(raw) {
        match segment {
            TemporalExtent::ExplicitList { instants } => {
                for instant in instants {
                    match parse_calendar_date(&instant) {
                        Some(date) => {
                            days.insert(noon_ms(date));
                        }
                        None => errors.push(DateParseError::new(&instant, "not an ISO 8601 date")),
                    }
                }
            }
            TemporalExtent::IntervalWithPeriod { start, end, period } => {
                let fragment = format!("{}/{}/{}", start, end, period);
                match enumerate_interval(&start, &end, &period) {
                    Ok(instants) => days.extend(instants.into_iter().map(|i| noon_ms(i.date()))),
                    Err(reason) => errors.push(DateParseError::new(&fragment, reason)),
                }
            }
        }
    }

    TemporalParse {
        days: days.into_iter().collect(),
        errors,
    }
}

/// Normalize a list of raw date fragments (each may itself be an interval).
pub fn parse_layer_days<S: AsRef<str>>(fragments: &[S]) -> Vec<i64> {
    let joined = fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(",");
    parse_temporal_extent(&joined)
}

/// Merge two day lists into one ascending, unique list.
pub fn union_days(a: &[i64], b: &[i64]) -> Vec<i64> {
    a.iter()
        .chain(b.iter())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Enumerate `start + k * period` for every k that stays on or before `end`.
fn enumerate_interval(start: &str, end: &str, period: &str) -> Result<Vec<NaiveDateTime>, String> {
    let start_dt = parse_naive_datetime(start).ok_or_else(|| format!("invalid start \"{}\"", start))?;
    let end_dt = parse_naive_datetime(end).ok_or_else(|| format!("invalid end \"{}\"", end))?;
    if start_dt > end_dt {
        return Err("interval start is after its end".to_string());
    }

    if period.is_empty() {
        return Ok(vec![start_dt, end_dt]);
    }
    let period = IsoPeriod::parse(period).ok_or_else(|| format!("invalid period \"{}\"", period))?;
    if period.is_zero() {
        return Err("zero-length period".to_string());
    }

    let mut instants = Vec::new();
    for k in 0.. {
        // a step past the representable range is past `end` too
        let Some(instant) = period.step(start_dt, k).filter(|i| *i <= end_dt) else {
            break;
        };
        if instants.len() >= MAX_INTERVAL_INSTANTS {
            return Err(format!("more than {} instants", MAX_INTERVAL_INSTANTS));
        }
        instants.push(instant);
    }
    Ok(instants)
}

/// An ISO 8601 duration such as `P10D`, `P1M`, `P1Y2M10D`, `P2W` or `PT6H`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IsoPeriod {
    pub months: u32,
    pub days: i64,
    pub seconds: i64,
}

impl IsoPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        let body = s.trim().strip_prefix('P').or_else(|| s.trim().strip_prefix('p'))?;
        if body.is_empty() {
            return None;
        }

        let mut period = IsoPeriod::default();
        let mut in_time = false;
        let mut number = String::new();
        let mut seen_component = false;

        for c in body.chars() {
            match c {
                'T' | 't' => {
                    if in_time || !number.is_empty() {
                        return None;
                    }
                    in_time = true;
                }
                '0'..='9' | '.' => number.push(c),
                unit => {
                    let value: f64 = number.parse().ok()?;
                    number.clear();
                    seen_component = true;
                    match (in_time, unit.to_ascii_uppercase()) {
                        (false, 'Y') => {
                            period.months = period.months.checked_add(whole(value)?.checked_mul(12)?)?
                        }
                        (false, 'M') => period.months = period.months.checked_add(whole(value)?)?,
                        (false, 'W') => {
                            period.days = period.days.checked_add(i64::from(whole(value)?) * 7)?
                        }
                        (false, 'D') => period.days = period.days.checked_add(i64::from(whole(value)?))?,
                        (true, 'H') => period.seconds = period.seconds.checked_add(seconds(value, 3600.0)?)?,
                        (true, 'M') => period.seconds = period.seconds.checked_add(seconds(value, 60.0)?)?,
                        (true, 'S') => period.seconds = period.seconds.checked_add(seconds(value, 1.0)?)?,
                        _ => return None,
                    }
                }
            }
        }

        (number.is_empty() && seen_component).then_some(period)
    }

    pub fn is_zero(&self) -> bool {
        self.months == 0 && self.days == 0 && self.seconds == 0
    }

    /// `start + k * self`, month arithmetic clamped to the end of shorter months.
    fn step(&self, start: NaiveDateTime, k: u32) -> Option<NaiveDateTime> {
        let months = self.months.checked_mul(k)?;
        let shifted = start.checked_add_months(Months::new(months))?;
        shifted
            .checked_add_signed(Duration::try_days(self.days.checked_mul(i64::from(k))?)?)?
            .checked_add_signed(Duration::try_seconds(self.seconds.checked_mul(i64::from(k))?)?)
    }
}

/// A non-negative integer component that fits `u32`.
fn whole(value: f64) -> Option<u32> {
    (value.fract() == 0.0 && (0.0..=u32::MAX as f64).contains(&value)).then_some(value as u32)
}

fn seconds(value: f64, unit: f64) -> Option<i64> {
    let total = value * unit;
    (total.is_finite() && (0.0..i64::MAX as f64).contains(&total)).then_some(total as i64)
}

/// The calendar date of an ISO 8601 instant, as written (time and zone ignored).
///
/// Accepts `YYYY-MM-DD`, `YYYY-MM` and `YYYY`, optionally followed by a `T`
/// time part in any shape.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let date_part = s.trim().split(['T', 't', ' ']).next()?;
    if let Ok(date) = NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", date_part), "%Y-%m-%d") {
        return Some(date);
    }
    if date_part.len() == 4 && date_part.chars().all(|c| c.is_ascii_digit()) {
        return NaiveDate::from_ymd_opt(date_part.parse().ok()?, 1, 1);
    }
    None
}

/// An ISO 8601 instant as written; the zone designator is dropped and a
/// missing or unreadable time means midnight.
pub fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    let date = parse_calendar_date(s)?;
    let time = s
        .split_once(['T', 't'])
        .map(|(_, t)| strip_zone(t))
        .and_then(|t| {
            ["%H:%M:%S%.f", "%H:%M:%S", "%H:%M"]
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(t, fmt).ok())
        })
        .unwrap_or(NaiveTime::MIN);
    Some(date.and_time(time))
}

fn strip_zone(time: &str) -> &str {
    let time = time.trim_end_matches(['Z', 'z']);
    match time.rfind(['+', '-']) {
        Some(idx) if idx > 0 => &time[..idx],
        _ => time,
    }
}

/// Epoch milliseconds of 12:00 UTC on `date`.
pub fn noon_ms(date: NaiveDate) -> i64 {
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    Utc.from_utc_datetime(&noon).timestamp_millis()
}

/// Rewrite an instant to 12:00 UTC on its calendar date: `2022-10-25T12:00:00Z`.
pub fn set_noon(s: &str) -> Option<String> {
    parse_calendar_date(s).map(|date| format!("{}T12:00:00Z", date.format("%Y-%m-%d")))
}

/// Format an epoch-ms day as `YYYY-MM-DD` (the form request `time` params use).
pub fn format_day(ms: i64) -> Option<String> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// A closed time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    fn from_ms(start: i64, end: i64) -> Option<Self> {
        Some(Self::new(
            Utc.timestamp_millis_opt(start).single()?,
            Utc.timestamp_millis_opt(end).single()?,
        ))
    }
}

/// First and last day of an ascending day list.
pub fn day_range(days: &[i64]) -> Option<TimeRange> {
    TimeRange::from_ms(*days.first()?, *days.last()?)
}

/// Collapse an ascending day list into runs whose members are at most
/// `step_days` apart.
pub fn day_ranges(days: &[i64], step_days: i64) -> Vec<TimeRange> {
    let max_gap = step_days.max(1) * MS_PER_DAY;
    let mut ranges = Vec::new();
    let mut iter = days.iter().copied();

    let Some(first) = iter.next() else {
        return ranges;
    };
    let (mut start, mut end) = (first, first);
    for day in iter {
        if day - end > max_gap {
            ranges.extend(TimeRange::from_ms(start, end));
            start = day;
        }
        end = day;
    }
    ranges.extend(TimeRange::from_ms(start, end));
    ranges
}
