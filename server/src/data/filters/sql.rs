//! Predicate to SQL compilation
//!
//! Produces a parameterized `WHERE` body with `?` placeholders. Column names
//! come from [`LeadField`] only, never from request input.
//!
//! Text patterns compile to `REGEXP` with a `(?i)` regex, so case folding is
//! Unicode-aware. The connection must register the function (sqlx
//! `with_regexp`).

use super::types::{Condition, LeadField, Predicate, Range, Scalar, TextPattern};
use crate::utils::sql::placeholders;

/// Typed bind value, in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Real(f64),
    Integer(i64),
    Bool(bool),
}

/// Collects SQL parameters during query building (maintains insertion order)
#[derive(Debug, Default)]
pub struct SqlParams {
    pub values: Vec<SqlValue>,
}

impl Predicate {
    /// `WHERE` body for this predicate; the owner clause always comes first
    pub fn to_sql(&self, params: &mut SqlParams) -> String {
        let mut clauses = vec!["owner = ?".to_string()];
        params.values.push(SqlValue::Text(self.owner().to_string()));

        for (field, condition) in self.conditions() {
            condition.push_sql(field, params, &mut clauses);
        }

        clauses.join(" AND ")
    }
}

impl Condition {
    fn push_sql(&self, field: LeadField, params: &mut SqlParams, clauses: &mut Vec<String>) {
        let col = field.as_str();
        match self {
            Self::Eq(scalar) => {
                params.values.push(match scalar {
                    Scalar::Text(s) => SqlValue::Text(s.clone()),
                    Scalar::Number(n) => SqlValue::Real(*n),
                    Scalar::Bool(b) => SqlValue::Bool(*b),
                });
                clauses.push(format!("{} = ?", col));
            }
            Self::Pattern(pattern) => {
                params.values.push(SqlValue::Text(sql_regex(pattern)));
                clauses.push(format!("{} REGEXP ?", col));
            }
            Self::In(values) => {
                params
                    .values
                    .extend(values.iter().cloned().map(SqlValue::Text));
                clauses.push(format!("{} IN ({})", col, placeholders(values.len())));
            }
            Self::NumberRange(range) => push_range(col, range, SqlValue::Real, params, clauses),
            Self::DateRange(range) => push_range(
                col,
                range,
                |d| SqlValue::Integer(d.timestamp_millis()),
                params,
                clauses,
            ),
        }
    }
}

fn sql_regex(pattern: &TextPattern) -> String {
    format!("(?i){}", pattern.regex())
}

fn push_range<T: PartialOrd + Copy>(
    col: &str,
    range: &Range<T>,
    to_value: impl Fn(T) -> SqlValue,
    params: &mut SqlParams,
    clauses: &mut Vec<String>,
) {
    for (op, bound) in range.bounds() {
        let sql_op = match op {
            "$gt" => ">",
            "$gte" => ">=",
            "$lt" => "<",
            _ => "<=",
        };
        params.values.push(to_value(bound));
        clauses.push(format!("{} {} ?", col, sql_op));
    }
}
