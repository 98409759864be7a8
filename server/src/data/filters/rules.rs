//! Operator rule table
//!
//! Every `(field, suffix)` pair a lead list query understands, in the order
//! the rules are applied. Each rule receives the condition accumulated so far
//! for its field and returns the next one. A rule whose value does not parse
//! hands the accumulated condition back unchanged.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

use super::types::{Condition, LeadField, Range, Scalar, TextPattern};

/// `(accumulated, raw value) -> accumulated`
pub type MergeFn = fn(Option<Condition>, &str) -> Option<Condition>;

#[derive(Clone, Copy)]
pub struct Rule {
    pub field: LeadField,
    pub suffix: &'static str,
    pub apply: MergeFn,
}

impl Rule {
    const fn new(field: LeadField, suffix: &'static str, apply: MergeFn) -> Self {
        Self {
            field,
            suffix,
            apply,
        }
    }

    /// Query parameter this rule reads (`score_gt`, `email`, ...)
    pub fn param_name(&self) -> String {
        format!("{}{}", self.field.as_str(), self.suffix)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("field", &self.field)
            .field("suffix", &self.suffix)
            .finish()
    }
}

use LeadField::*;

pub const RULES: &[Rule] = &[
    // text: exact, contains
    Rule::new(Email, "", text_exact),
    Rule::new(Email, "_contains", text_contains),
    Rule::new(Company, "", text_exact),
    Rule::new(Company, "_contains", text_contains),
    Rule::new(City, "", text_exact),
    Rule::new(City, "_contains", text_contains),
    // enum: exact, in
    Rule::new(Status, "", enum_exact),
    Rule::new(Status, "_in", enum_in),
    Rule::new(Source, "", enum_exact),
    Rule::new(Source, "_in", enum_in),
    // numeric: exact, gt, lt, between
    Rule::new(Score, "", number_exact),
    Rule::new(Score, "_gt", bound_gt::<f64>),
    Rule::new(Score, "_lt", bound_lt::<f64>),
    Rule::new(Score, "_between", between::<f64>),
    Rule::new(LeadValue, "", number_exact),
    Rule::new(LeadValue, "_gt", bound_gt::<f64>),
    Rule::new(LeadValue, "_lt", bound_lt::<f64>),
    Rule::new(LeadValue, "_between", between::<f64>),
    // date: on, before, after, between
    Rule::new(CreatedAt, "_on", date_on),
    Rule::new(CreatedAt, "_before", bound_lt::<DateTime<Utc>>),
    Rule::new(CreatedAt, "_after", bound_gt::<DateTime<Utc>>),
    Rule::new(CreatedAt, "_between", between::<DateTime<Utc>>),
    Rule::new(LastActivityAt, "_on", date_on),
    Rule::new(LastActivityAt, "_before", bound_lt::<DateTime<Utc>>),
    Rule::new(LastActivityAt, "_after", bound_gt::<DateTime<Utc>>),
    Rule::new(LastActivityAt, "_between", between::<DateTime<Utc>>),
    // boolean: exact
    Rule::new(IsQualified, "", bool_exact),
];

// =============================================================================
// Value parsing
// =============================================================================

/// Finite decimal number; surrounding whitespace allowed
pub fn try_parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Instant from an RFC 3339 timestamp, a zone-less date-time (server-local),
/// or a bare `YYYY-MM-DD` date (server-local midnight)
pub fn try_parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive_datetime(trimmed) {
        return local_to_utc(naive, Earliest);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| local_to_utc(d.and_time(NaiveTime::MIN), Earliest))
}

/// `true` / `false`, case-insensitive
pub fn try_parse_bool(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

#[derive(Clone, Copy)]
enum Resolve {
    Earliest,
    Latest,
}
use Resolve::{Earliest, Latest};

/// Server-local wall clock to UTC; DST gaps resolve to nothing, folds pick a side
fn local_to_utc(naive: NaiveDateTime, resolve: Resolve) -> Option<DateTime<Utc>> {
    let local = Local.from_local_datetime(&naive);
    match resolve {
        Earliest => local.earliest(),
        Latest => local.latest(),
    }
    .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar day named by `raw`, in server-local time
fn try_parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .or_else(|| try_parse_date(raw).map(|dt| dt.with_timezone(&Local).date_naive()))
}

/// Inclusive `[00:00:00.000, 23:59:59.999]` span of a local calendar day
pub fn local_day_span(day: NaiveDate) -> Option<Range<DateTime<Utc>>> {
    let start = local_to_utc(day.and_time(NaiveTime::MIN), Earliest)?;
    let end = local_to_utc(day.and_hms_milli_opt(23, 59, 59, 999)?, Latest)?;
    Some(Range {
        gte: Some(start),
        lte: Some(end),
        ..Range::default()
    })
}

// =============================================================================
// Range-valued operators (numeric and date)
// =============================================================================

/// Value type usable in a range condition
pub trait Bound: PartialOrd + Copy {
    fn parse(raw: &str) -> Option<Self>;
    fn into_condition(range: Range<Self>) -> Condition;
    fn from_condition(condition: Condition) -> Option<Range<Self>>;
}

impl Bound for f64 {
    fn parse(raw: &str) -> Option<Self> {
        try_parse_number(raw)
    }

    fn into_condition(range: Range<Self>) -> Condition {
        Condition::NumberRange(range)
    }

    fn from_condition(condition: Condition) -> Option<Range<Self>> {
        match condition {
            Condition::NumberRange(r) => Some(r),
            _ => None,
        }
    }
}

impl Bound for DateTime<Utc> {
    fn parse(raw: &str) -> Option<Self> {
        try_parse_date(raw)
    }

    fn into_condition(range: Range<Self>) -> Condition {
        Condition::DateRange(range)
    }

    fn from_condition(condition: Condition) -> Option<Range<Self>> {
        match condition {
            Condition::DateRange(r) => Some(r),
            _ => None,
        }
    }
}

/// Merge one bound into the accumulated range. A non-range condition
/// (e.g. numeric equality) is discarded in favour of a fresh range.
fn merge_bound<T: Bound>(
    current: Option<Condition>,
    raw: &str,
    set: fn(&mut Range<T>, T),
) -> Option<Condition> {
    let Some(value) = T::parse(raw) else {
        return current;
    };
    let mut range = current.and_then(T::from_condition).unwrap_or_default();
    set(&mut range, value);
    Some(T::into_condition(range))
}

fn bound_gt<T: Bound>(current: Option<Condition>, raw: &str) -> Option<Condition> {
    merge_bound::<T>(current, raw, |r, v| r.gt = Some(v))
}

fn bound_lt<T: Bound>(current: Option<Condition>, raw: &str) -> Option<Condition> {
    merge_bound::<T>(current, raw, |r, v| r.lt = Some(v))
}

/// `"a,b"` to `[min, max]`, replacing whatever was accumulated.
/// Only the first two comma parts are read; both must parse.
fn between<T: Bound>(current: Option<Condition>, raw: &str) -> Option<Condition> {
    let mut parts = raw.split(',');
    let a = parts.next().and_then(T::parse);
    let b = parts.next().and_then(T::parse);
    match (a, b) {
        (Some(a), Some(b)) => Some(T::into_condition(Range::closed(a, b))),
        _ => current,
    }
}

// =============================================================================
// Other operators
// =============================================================================

fn text_exact(_: Option<Condition>, raw: &str) -> Option<Condition> {
    Some(Condition::Pattern(TextPattern::exact(raw)))
}

fn text_contains(_: Option<Condition>, raw: &str) -> Option<Condition> {
    Some(Condition::Pattern(TextPattern::contains(raw)))
}

fn enum_exact(_: Option<Condition>, raw: &str) -> Option<Condition> {
    Some(Condition::Eq(Scalar::Text(raw.to_string())))
}

fn enum_in(_: Option<Condition>, raw: &str) -> Option<Condition> {
    Some(Condition::In(raw.split(',').map(String::from).collect()))
}

fn number_exact(current: Option<Condition>, raw: &str) -> Option<Condition> {
    match try_parse_number(raw) {
        Some(n) => Some(Condition::Eq(Scalar::Number(n))),
        None => current,
    }
}

fn date_on(current: Option<Condition>, raw: &str) -> Option<Condition> {
    match try_parse_day(raw).and_then(local_day_span) {
        Some(span) => Some(Condition::DateRange(span)),
        None => current,
    }
}

fn bool_exact(current: Option<Condition>, raw: &str) -> Option<Condition> {
    match try_parse_bool(raw) {
        Some(b) => Some(Condition::Eq(Scalar::Bool(b))),
        None => current,
    }
}
