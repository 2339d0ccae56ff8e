use std::fmt;

/// The value type a remote column is declared with.
///
/// The result mapper coerces raw response values into this type before a row
/// is decoded into its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text,
    /// 32-bit integer (`int4`).
    Integer,
    /// 64-bit integer (`int8`).
    BigInt,
    Decimal,
    /// Calendar date without a time component.
    Date,
    /// Point in time, normalized to UTC.
    Timestamp,
    Boolean,
}

impl ColumnType {
    /// Returns the Postgres type name this column type corresponds to.
    pub fn pg_name(&self) -> &'static str {
        match self {
            ColumnType::Text => "text",
            ColumnType::Integer => "int4",
            ColumnType::BigInt => "int8",
            ColumnType::Decimal => "numeric",
            ColumnType::Date => "date",
            ColumnType::Timestamp => "timestamptz",
            ColumnType::Boolean => "bool",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.pg_name())
    }
}
