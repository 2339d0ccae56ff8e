use crate::enums::ColumnType;
use crate::error::CoreError;
use serde::de::DeserializeOwned;
use std::collections::HashSet;

/// Describes how one field of a record maps onto a remote column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// The field name on the Rust record.
    pub field: &'static str,
    /// The column name on the remote table.
    pub column: &'static str,
    pub column_type: ColumnType,
    pub nullable: bool,
}

impl FieldDef {
    /// A non-nullable field whose column shares its name.
    pub const fn required(name: &'static str, column_type: ColumnType) -> Self {
        Self { field: name, column: name, column_type, nullable: false }
    }

    /// A nullable field whose column shares its name.
    pub const fn optional(name: &'static str, column_type: ColumnType) -> Self {
        Self { field: name, column: name, column_type, nullable: true }
    }

    /// Maps the field onto a column with a different name.
    pub const fn with_column(self, column: &'static str) -> Self {
        Self { column, ..self }
    }
}

/// Static metadata describing how a record type maps onto a remote table.
///
/// Descriptors are declared once as `static` values and shared by reference
/// between every query that targets the table. They are never mutated.
#[derive(Debug, PartialEq, Eq)]
pub struct RowSchema {
    pub schema: &'static str,
    pub table: &'static str,
    /// Column name of the primary key.
    pub primary_key: &'static str,
    pub fields: &'static [FieldDef],
}

impl RowSchema {
    pub const fn new(
        schema: &'static str,
        table: &'static str,
        primary_key: &'static str,
        fields: &'static [FieldDef],
    ) -> Self {
        Self { schema, table, primary_key, fields }
    }

    /// Looks up a field by its record field name.
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.field == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    /// Resolves a field name to its column name, failing for unknown fields.
    pub fn column_for(&self, name: &str) -> Result<&'static str, CoreError> {
        self.field(name)
            .map(|f| f.column)
            .ok_or_else(|| CoreError::UnknownField {
                table: self.qualified_name(),
                field: name.to_string(),
            })
    }

    /// The field holding the primary key column.
    pub fn primary_key_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.column == self.primary_key)
    }

    /// Field names in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.field)
    }

    /// `schema.table`, as used in log lines and error messages.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Checks the descriptor's internal consistency.
    ///
    /// The primary key must be a declared, non-nullable column, and neither
    /// field names nor column names may repeat.
    pub fn validate(&self) -> Result<(), CoreError> {
        let invalid = |msg: String| CoreError::InvalidSchema(self.qualified_name(), msg);

        if self.fields.is_empty() {
            return Err(invalid("no fields declared".to_string()));
        }

        let mut fields = HashSet::new();
        let mut columns = HashSet::new();
        for def in self.fields {
            if !fields.insert(def.field) {
                return Err(invalid(format!("field '{}' declared twice", def.field)));
            }
            if !columns.insert(def.column) {
                return Err(invalid(format!("column '{}' mapped twice", def.column)));
            }
        }

        match self.primary_key_field() {
            None => Err(invalid(format!(
                "primary key '{}' is not a declared column",
                self.primary_key
            ))),
            Some(pk) if pk.nullable => Err(invalid(format!(
                "primary key '{}' must not be nullable",
                self.primary_key
            ))),
            Some(_) => Ok(()),
        }
    }
}

/// A typed record backed by a remote table.
///
/// Decoding goes through serde after the result mapper has normalized a raw
/// row against [`Record::schema`]. Fields left out of a query's projection
/// keep their `Default` value.
pub trait Record: DeserializeOwned + Default + Send {
    fn schema() -> &'static RowSchema;
}
