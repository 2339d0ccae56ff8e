pub mod enums;
pub mod error;
pub mod records;
pub mod schema;

// Re-export the core types to provide a clean public API.
pub use enums::ColumnType;
pub use error::CoreError;
pub use records::{
    AcledEvent, FactbookCountry, WorldBankIndicator, ACLED_EVENTS, FACTBOOK_COUNTRIES,
    WORLD_BANK_INDICATORS,
};
pub use schema::{FieldDef, Record, RowSchema};
