//! Filter predicates and their rendering into REST query parameters.
//!
//! A top-level conjunction becomes one `column=op.value` parameter per
//! condition; the service ANDs separate parameters together. Disjunctions and
//! negated groups become a single `or=(...)` / `not.and=(...)` parameter whose
//! members use the nested `column.op.value` form.

use crate::error::ClientError;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use core_types::RowSchema;
use rust_decimal::Decimal;
use std::fmt;

/// Comparison operators understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-sensitive pattern match; `*` is the wildcard.
    Like,
    /// Case-insensitive pattern match.
    ILike,
    /// `IS NULL` / `IS TRUE` / `IS FALSE`.
    Is,
    /// Membership in a list operand.
    In,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Like => "like",
            Operator::ILike => "ilike",
            Operator::Is => "is",
            Operator::In => "in",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The right-hand side of a condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Null,
    Bool(bool),
    Integer(i64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
    List(Vec<Operand>),
}

impl Operand {
    /// Renders the value as it appears after `op.` in a top-level parameter.
    fn render(&self) -> String {
        match self {
            Operand::Null => "null".to_string(),
            Operand::Bool(b) => b.to_string(),
            Operand::Integer(i) => i.to_string(),
            Operand::Decimal(d) => d.to_string(),
            Operand::Text(s) => s.clone(),
            Operand::Date(d) => d.format("%Y-%m-%d").to_string(),
            Operand::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Operand::List(items) => {
                let inner = items.iter().map(Operand::render_nested).collect::<Vec<_>>();
                format!("({})", inner.join(","))
            }
        }
    }

    /// Renders the value inside a logic group or list, where reserved
    /// characters would otherwise split the expression.
    fn render_nested(&self) -> String {
        match self {
            Operand::Text(_) | Operand::Date(_) | Operand::Timestamp(_) => quote_if_needed(&self.render()),
            _ => self.render(),
        }
    }
}

fn quote_if_needed(value: &str) -> String {
    let reserved = |c: char| matches!(c, ',' | '.' | ':' | '(' | ')' | '"' | '\\') || c.is_whitespace();
    if value.is_empty() || value.chars().any(reserved) {
        format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        value.to_string()
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Text(v.to_string())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Text(v)
    }
}

impl From<&String> for Operand {
    fn from(v: &String) -> Self {
        Operand::Text(v.clone())
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Bool(v)
    }
}

impl From<i32> for Operand {
    fn from(v: i32) -> Self {
        Operand::Integer(v as i64)
    }
}

impl From<i64> for Operand {
    fn from(v: i64) -> Self {
        Operand::Integer(v)
    }
}

impl From<u32> for Operand {
    fn from(v: u32) -> Self {
        Operand::Integer(v as i64)
    }
}

impl From<Decimal> for Operand {
    fn from(v: Decimal) -> Self {
        Operand::Decimal(v)
    }
}

impl From<NaiveDate> for Operand {
    fn from(v: NaiveDate) -> Self {
        Operand::Date(v)
    }
}

impl From<DateTime<Utc>> for Operand {
    fn from(v: DateTime<Utc>) -> Self {
        Operand::Timestamp(v)
    }
}

impl<T: Into<Operand>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        v.map_or(Operand::Null, Into::into)
    }
}

impl<T: Into<Operand>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::List(v.into_iter().map(Into::into).collect())
    }
}

/// A single `field operator operand` test. `field` is the record field name,
/// not the remote column name.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub operand: Operand,
}

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn condition(field: impl Into<String>, operator: Operator, operand: impl Into<Operand>) -> Self {
        Predicate::Condition(Condition {
            field: field.into(),
            operator,
            operand: operand.into(),
        })
    }

    pub fn eq(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Eq, value)
    }

    pub fn neq(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Neq, value)
    }

    pub fn gt(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: impl Into<Operand>) -> Self {
        Self::condition(field, Operator::Lte, value)
    }

    pub fn is_null(field: impl Into<String>) -> Self {
        Self::condition(field, Operator::Is, Operand::Null)
    }

    pub fn in_list<T: Into<Operand>>(field: impl Into<String>, values: impl IntoIterator<Item = T>) -> Self {
        let list = values.into_iter().map(Into::into).collect();
        Self::condition(field, Operator::In, Operand::List(list))
    }

    /// Conjunction of all members.
    pub fn all(members: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::And(members.into_iter().collect())
    }

    /// Disjunction of all members.
    pub fn any(members: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Or(members.into_iter().collect())
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Validates the tree against `schema` and appends its top-level query
    /// parameters to `out`.
    pub fn write_params(&self, schema: &RowSchema, out: &mut Vec<(String, String)>) -> Result<(), ClientError> {
        match self {
            Predicate::Condition(c) => {
                let (column, value) = render_condition(c, schema)?;
                out.push((column.to_string(), value));
            }
            Predicate::And(members) => {
                non_empty("and", members)?;
                for member in members {
                    member.write_params(schema, out)?;
                }
            }
            Predicate::Or(members) => {
                out.push(("or".to_string(), render_group_members("or", members, schema)?));
            }
            Predicate::Not(inner) => match inner.as_ref() {
                Predicate::Condition(c) => {
                    let (column, value) = render_condition(c, schema)?;
                    out.push((column.to_string(), format!("not.{}", value)));
                }
                Predicate::And(members) => {
                    out.push(("not.and".to_string(), render_group_members("and", members, schema)?));
                }
                Predicate::Or(members) => {
                    out.push(("not.or".to_string(), render_group_members("or", members, schema)?));
                }
                // Double negation cancels out.
                Predicate::Not(twice) => twice.write_params(schema, out)?,
            },
        }
        Ok(())
    }

    /// Renders the predicate as a member of a logic group.
    fn render_nested(&self, schema: &RowSchema) -> Result<String, ClientError> {
        match self {
            Predicate::Condition(c) => {
                let (column, value) = render_condition_nested(c, schema)?;
                Ok(format!("{}.{}", column, value))
            }
            Predicate::And(members) => Ok(format!("and{}", render_group_members("and", members, schema)?)),
            Predicate::Or(members) => Ok(format!("or{}", render_group_members("or", members, schema)?)),
            Predicate::Not(inner) => match inner.as_ref() {
                Predicate::Condition(c) => {
                    let (column, value) = render_condition_nested(c, schema)?;
                    Ok(format!("{}.not.{}", column, value))
                }
                Predicate::Not(twice) => twice.render_nested(schema),
                group => Ok(format!("not.{}", group.render_nested(schema)?)),
            },
        }
    }
}

fn non_empty(kind: &str, members: &[Predicate]) -> Result<(), ClientError> {
    if members.is_empty() {
        return Err(ClientError::Validation(format!("an '{}' group needs at least one member", kind)));
    }
    Ok(())
}

fn render_group_members(kind: &str, members: &[Predicate], schema: &RowSchema) -> Result<String, ClientError> {
    non_empty(kind, members)?;
    let rendered = members
        .iter()
        .map(|m| m.render_nested(schema))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(format!("({})", rendered.join(",")))
}

/// Checks the operator/operand pairing and resolves the column.
fn check_condition(c: &Condition, schema: &RowSchema) -> Result<&'static str, ClientError> {
    let column = schema.column_for(&c.field)?;
    match (c.operator, &c.operand) {
        (Operator::In, Operand::List(_)) => Ok(column),
        (Operator::In, _) => Err(ClientError::Validation(format!(
            "'in' on field '{}' needs a list operand",
            c.field
        ))),
        (_, Operand::List(_)) => Err(ClientError::Validation(format!(
            "a list operand is only valid with 'in' (field '{}', operator '{}')",
            c.field, c.operator
        ))),
        (Operator::Is, Operand::Null | Operand::Bool(_)) => Ok(column),
        (Operator::Is, _) => Err(ClientError::Validation(format!(
            "'is' on field '{}' accepts only null, true or false",
            c.field
        ))),
        _ => Ok(column),
    }
}

fn render_condition(c: &Condition, schema: &RowSchema) -> Result<(&'static str, String), ClientError> {
    let column = check_condition(c, schema)?;
    Ok((column, format!("{}.{}", c.operator, c.operand.render())))
}

fn render_condition_nested(c: &Condition, schema: &RowSchema) -> Result<(&'static str, String), ClientError> {
    let column = check_condition(c, schema)?;
    let value = match &c.operand {
        list @ Operand::List(_) => list.render(),
        scalar => scalar.render_nested(),
    };
    Ok((column, format!("{}.{}", c.operator, value)))
}
