//! Lead list filtering
//!
//! Translates list-query parameters such as `score_gt=40` or
//! `email_contains=acme` into an owner-scoped [`Predicate`], then compiles
//! it to a parameterized SQL `WHERE` body.
//!
//! Parameter names are `<field><suffix>`. See [`RULES`] for the full table.

mod builder;
mod rules;
mod sql;
mod types;

pub use builder::build_lead_filter;
pub use rules::{
    Bound, MergeFn, RULES, Rule, local_day_span, try_parse_bool, try_parse_date, try_parse_number,
};
pub use sql::{SqlParams, SqlValue};
pub use types::{Condition, LeadField, Predicate, Range, Scalar, TextPattern};
