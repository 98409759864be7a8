//! Predicate type definitions
//!
//! A [`Predicate`] is an owner scope plus at most one [`Condition`] per
//! filterable lead field, ANDed together.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value, json};

/// Lead fields that can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LeadField {
    Email,
    Company,
    City,
    Status,
    Source,
    Score,
    LeadValue,
    CreatedAt,
    LastActivityAt,
    IsQualified,
}

impl LeadField {
    pub const ALL: [LeadField; 10] = [
        Self::Email,
        Self::Company,
        Self::City,
        Self::Status,
        Self::Source,
        Self::Score,
        Self::LeadValue,
        Self::CreatedAt,
        Self::LastActivityAt,
        Self::IsQualified,
    ];

    /// Query parameter stem and storage column name
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Company => "company",
            Self::City => "city",
            Self::Status => "status",
            Self::Source => "source",
            Self::Score => "score",
            Self::LeadValue => "lead_value",
            Self::CreatedAt => "created_at",
            Self::LastActivityAt => "last_activity_at",
            Self::IsQualified => "is_qualified",
        }
    }
}

impl fmt::Display for LeadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Literal compared by equality
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Case-insensitive literal text match
///
/// The literal never carries pattern syntax: regex metacharacters
/// are escaped whenever the pattern is rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPattern {
    pub literal: String,
    /// Whole-value match when true, substring match otherwise
    pub anchored: bool,
}

impl TextPattern {
    pub fn exact(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            anchored: true,
        }
    }

    pub fn contains(literal: impl Into<String>) -> Self {
        Self {
            literal: literal.into(),
            anchored: false,
        }
    }

    /// Regex source equivalent to this pattern (to be used case-insensitively)
    pub fn regex(&self) -> String {
        let escaped = regex::escape(&self.literal);
        if self.anchored {
            format!("^{}$", escaped)
        } else {
            escaped
        }
    }
}

/// Open/closed interval; each bound is optional
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    pub gt: Option<T>,
    pub gte: Option<T>,
    pub lt: Option<T>,
    pub lte: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Self {
            gt: None,
            gte: None,
            lt: None,
            lte: None,
        }
    }
}

impl<T: PartialOrd + Copy> Range<T> {
    /// Inclusive `[min(a, b), max(a, b)]`
    pub fn closed(a: T, b: T) -> Self {
        let (lo, hi) = if b < a { (b, a) } else { (a, b) };
        Self {
            gte: Some(lo),
            lte: Some(hi),
            ..Self::default()
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.gt.is_none_or(|b| value > b)
            && self.gte.is_none_or(|b| value >= b)
            && self.lt.is_none_or(|b| value < b)
            && self.lte.is_none_or(|b| value <= b)
    }

    /// Bounds in `gt, gte, lt, lte` order with their document operator names
    pub fn bounds(&self) -> impl Iterator<Item = (&'static str, T)> + '_ {
        [
            ("$gt", self.gt),
            ("$gte", self.gte),
            ("$lt", self.lt),
            ("$lte", self.lte),
        ]
        .into_iter()
        .filter_map(|(op, bound)| bound.map(|b| (op, b)))
    }
}

/// Match condition for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Eq(Scalar),
    Pattern(TextPattern),
    In(Vec<String>),
    NumberRange(Range<f64>),
    DateRange(Range<DateTime<Utc>>),
}

impl Condition {
    fn to_document(&self) -> Value {
        match self {
            Self::Eq(Scalar::Text(s)) => json!(s),
            Self::Eq(Scalar::Number(n)) => json!(n),
            Self::Eq(Scalar::Bool(b)) => json!(b),
            Self::Pattern(p) => json!({ "$regex": p.regex(), "$options": "i" }),
            Self::In(values) => json!({ "$in": values }),
            Self::NumberRange(r) => Value::Object(
                r.bounds()
                    .map(|(op, n)| (op.to_string(), json!(n)))
                    .collect(),
            ),
            Self::DateRange(r) => Value::Object(
                r.bounds()
                    .map(|(op, d)| {
                        (
                            op.to_string(),
                            json!(d.to_rfc3339_opts(SecondsFormat::Millis, true)),
                        )
                    })
                    .collect(),
            ),
        }
    }
}

/// Owner-scoped lead selection
///
/// The owner lives in its own slot; field conditions can never replace it.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    owner: String,
    conditions: BTreeMap<LeadField, Condition>,
}

impl Predicate {
    /// Predicate matching every lead of `owner`
    pub fn for_owner(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            conditions: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn get(&self, field: LeadField) -> Option<&Condition> {
        self.conditions.get(&field)
    }

    /// Field conditions in stable field order
    pub fn conditions(&self) -> impl Iterator<Item = (LeadField, &Condition)> {
        self.conditions.iter().map(|(f, c)| (*f, c))
    }

    /// True when only the owner scope applies
    pub fn is_unconstrained(&self) -> bool {
        self.conditions.is_empty()
    }

    pub(super) fn take(&mut self, field: LeadField) -> Option<Condition> {
        self.conditions.remove(&field)
    }

    pub(super) fn set(&mut self, field: LeadField, condition: Condition) {
        self.conditions.insert(field, condition);
    }

    /// Document-store rendering: `{owner: .., <field>: <condition>, ..}`
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("owner".to_string(), json!(self.owner));
        for (field, condition) in &self.conditions {
            doc.insert(field.as_str().to_string(), condition.to_document());
        }
        Value::Object(doc)
    }
}
