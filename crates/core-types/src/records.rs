use crate::enums::ColumnType::{BigInt, Date, Decimal as Numeric, Integer, Text, Timestamp};
use crate::schema::{FieldDef, Record, RowSchema};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==============================================================================
// acled.events
// ==============================================================================

static ACLED_EVENT_FIELDS: [FieldDef; 31] = [
    FieldDef::required("event_id_cnty", Text),
    FieldDef::optional("event_date", Date),
    FieldDef::optional("year", Integer),
    FieldDef::optional("time_precision", Integer),
    FieldDef::optional("disorder_type", Text),
    FieldDef::optional("event_type", Text),
    FieldDef::optional("sub_event_type", Text),
    FieldDef::optional("actor1", Text),
    FieldDef::optional("assoc_actor_1", Text),
    FieldDef::optional("inter1", Integer),
    FieldDef::optional("actor2", Text),
    FieldDef::optional("assoc_actor_2", Text),
    FieldDef::optional("inter2", Integer),
    FieldDef::optional("interaction", Integer),
    FieldDef::optional("civilian_targeting", Text),
    FieldDef::optional("iso", Text),
    FieldDef::optional("region", Text),
    FieldDef::optional("country", Text),
    FieldDef::optional("admin1", Text),
    FieldDef::optional("admin2", Text),
    FieldDef::optional("admin3", Text),
    FieldDef::optional("location", Text),
    FieldDef::optional("latitude", Numeric),
    FieldDef::optional("longitude", Numeric),
    FieldDef::optional("geo_precision", Integer),
    FieldDef::optional("source", Text),
    FieldDef::optional("source_scale", Text),
    FieldDef::optional("notes", Text),
    FieldDef::optional("fatalities", Integer),
    FieldDef::optional("tags", Text),
    FieldDef::optional("timestamp", BigInt),
];

pub static ACLED_EVENTS: RowSchema =
    RowSchema::new("acled", "events", "event_id_cnty", &ACLED_EVENT_FIELDS);

/// A single political violence or protest event from the ACLED dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcledEvent {
    pub event_id_cnty: String,
    pub event_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub time_precision: Option<i32>,
    pub disorder_type: Option<String>,
    pub event_type: Option<String>,
    pub sub_event_type: Option<String>,
    pub actor1: Option<String>,
    pub assoc_actor_1: Option<String>,
    pub inter1: Option<i32>,
    pub actor2: Option<String>,
    pub assoc_actor_2: Option<String>,
    pub inter2: Option<i32>,
    pub interaction: Option<i32>,
    pub civilian_targeting: Option<String>,
    pub iso: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub admin1: Option<String>,
    pub admin2: Option<String>,
    pub admin3: Option<String>,
    pub location: Option<String>,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub geo_precision: Option<i32>,
    pub source: Option<String>,
    pub source_scale: Option<String>,
    pub notes: Option<String>,
    pub fatalities: Option<i32>,
    pub tags: Option<String>,
    /// Unix seconds of the last upstream modification.
    pub timestamp: Option<i64>,
}

impl Record for AcledEvent {
    fn schema() -> &'static RowSchema {
        &ACLED_EVENTS
    }
}

// ==============================================================================
// cia_factbook.countries
// ==============================================================================

static FACTBOOK_COUNTRY_FIELDS: [FieldDef; 7] = [
    FieldDef::required("country_name", Text),
    FieldDef::required("category", Text),
    FieldDef::required("subcategory_level1", Text),
    FieldDef::required("subcategory_level2", Text),
    FieldDef::required("subcategory_level3", Text),
    FieldDef::optional("data", Text),
    FieldDef::optional("last_updated", Timestamp),
];

pub static FACTBOOK_COUNTRIES: RowSchema =
    RowSchema::new("cia_factbook", "countries", "country_name", &FACTBOOK_COUNTRY_FIELDS);

/// One categorized fact about a country from the CIA World Factbook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactbookCountry {
    pub country_name: String,
    pub category: String,
    pub subcategory_level1: String,
    pub subcategory_level2: String,
    pub subcategory_level3: String,
    pub data: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Record for FactbookCountry {
    fn schema() -> &'static RowSchema {
        &FACTBOOK_COUNTRIES
    }
}

// ==============================================================================
// world_bank.indicators
// ==============================================================================

static WORLD_BANK_INDICATOR_FIELDS: [FieldDef; 6] = [
    FieldDef::required("country_name", Text),
    FieldDef::optional("country_code", Text),
    FieldDef::optional("indicator_name", Text),
    FieldDef::optional("indicator_code", Text),
    FieldDef::optional("year", Integer),
    FieldDef::optional("value", Numeric),
];

pub static WORLD_BANK_INDICATORS: RowSchema =
    RowSchema::new("world_bank", "indicators", "country_name", &WORLD_BANK_INDICATOR_FIELDS);

/// A yearly development indicator value for a country.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldBankIndicator {
    pub country_name: String,
    pub country_code: Option<String>,
    pub indicator_name: Option<String>,
    pub indicator_code: Option<String>,
    pub year: Option<i32>,
    pub value: Option<Decimal>,
}

impl Record for WorldBankIndicator {
    fn schema() -> &'static RowSchema {
        &WORLD_BANK_INDICATORS
    }
}
