use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Table {table} has no field named '{field}'")]
    UnknownField { table: String, field: String },

    #[error("Invalid row schema for {0}: {1}")]
    InvalidSchema(String, String),
}
