use crate::error::MappingError;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use core_types::{ColumnType, FieldDef, Record};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};
use std::str::FromStr;

/// Maps one raw row onto `T`, reading every field its schema declares.
pub fn map_row<T: Record>(raw: &Map<String, Value>) -> Result<T, MappingError> {
    let projection: Vec<&FieldDef> = T::schema().fields.iter().collect();
    map_projected_row(raw, &projection)
}

/// Maps one raw row onto `T`, reading only the projected fields.
///
/// Each projected column is looked up by name and coerced to its declared
/// type. Fields outside the projection keep their `Default` value.
pub fn map_projected_row<T: Record>(raw: &Map<String, Value>, projection: &[&FieldDef]) -> Result<T, MappingError> {
    let mut normalized = Map::with_capacity(projection.len());

    for def in projection {
        let value = match raw.get(def.column) {
            None | Some(Value::Null) if def.nullable => Value::Null,
            None | Some(Value::Null) => {
                return Err(MappingError::MissingColumn { column: def.column.to_string() });
            }
            Some(value) => coerce(def, value)?,
        };
        normalized.insert(def.field.to_string(), value);
    }

    serde_json::from_value(Value::Object(normalized)).map_err(|e| MappingError::Decode {
        table: T::schema().qualified_name(),
        message: e.to_string(),
    })
}

/// Maps a response body, which must be a JSON array of row objects.
pub fn map_rows<T: Record>(body: &str, projection: &[&FieldDef]) -> Result<Vec<T>, MappingError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| MappingError::Shape(format!("response is not valid JSON: {}", e)))?;

    let Value::Array(rows) = value else {
        return Err(MappingError::Shape("expected a JSON array of rows".to_string()));
    };

    rows.iter()
        .map(|row| match row {
            Value::Object(map) => map_projected_row(map, projection),
            other => Err(MappingError::Shape(format!("expected a row object, found {}", describe(other)))),
        })
        .collect()
}

/// Coerces a non-null raw value into the canonical JSON form the record's
/// serde implementation expects for the declared column type.
fn coerce(def: &FieldDef, value: &Value) -> Result<Value, MappingError> {
    let fail = || MappingError::Coercion {
        column: def.column.to_string(),
        expected: def.column_type,
        found: describe(value),
    };

    match def.column_type {
        ColumnType::Text => match value {
            Value::String(_) => Ok(value.clone()),
            _ => Err(fail()),
        },
        ColumnType::Integer => {
            let n = read_integer(value).ok_or_else(fail)?;
            let n = i32::try_from(n).map_err(|_| fail())?;
            Ok(Value::Number(Number::from(n)))
        }
        ColumnType::BigInt => {
            let n = read_integer(value).ok_or_else(fail)?;
            Ok(Value::Number(Number::from(n)))
        }
        ColumnType::Decimal => {
            let text = match value {
                Value::Number(n) => n.to_string(),
                Value::String(s) => s.trim().to_string(),
                _ => return Err(fail()),
            };
            let decimal = Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .map_err(|_| fail())?;
            Ok(Value::String(decimal.to_string()))
        }
        ColumnType::Date => {
            let text = value.as_str().ok_or_else(fail)?;
            let date = parse_date(text).ok_or_else(fail)?;
            Ok(Value::String(date.format("%Y-%m-%d").to_string()))
        }
        ColumnType::Timestamp => {
            let text = value.as_str().ok_or_else(fail)?;
            let ts = parse_timestamp(text).ok_or_else(fail)?;
            Ok(Value::String(ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        }
        ColumnType::Boolean => match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
            _ => Err(fail()),
        },
    }
}

fn read_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Accepts `YYYY-MM-DD` or any timestamp form, keeping the date as written.
fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    parse_with_offset(text)
        .map(|ts| ts.date_naive())
        .or_else(|| parse_naive(text).map(|naive| naive.date()))
}

/// Accepts RFC 3339, naive timestamps (read as UTC) and bare dates (midnight UTC).
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Some(ts) = parse_with_offset(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Some(naive) = parse_naive(text) {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn parse_with_offset(text: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(text)
        .ok()
        // Postgres renders offsets as `+00` without minutes.
        .or_else(|| DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z").ok())
}

fn parse_naive(text: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .into_iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

/// Short description of a raw value for error messages.
fn describe(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    };
    if rendered.chars().count() > 40 {
        let cut: String = rendered.chars().take(40).collect();
        format!("{}…", cut)
    } else {
        rendered
    }
}
