//! The canned read queries the CLI runs.

use api_client::{ClientError, Predicate, ResultSet, Session};
use chrono::NaiveDate;
use core_types::{AcledEvent, FactbookCountry, WorldBankIndicator};

/// Events on or after `since`, newest columns only.
pub async fn events_since(
    session: &Session,
    since: NaiveDate,
    limit: usize,
) -> Result<ResultSet<AcledEvent>, ClientError> {
    session
        .from::<AcledEvent>()
        .select(["event_id_cnty", "event_date", "disorder_type", "fatalities"])
        .gte("event_date", since)
        .limit(limit)
        .execute()
        .await
}

/// Every factbook entry for one country.
pub async fn country_facts(session: &Session, country: &str) -> Result<ResultSet<FactbookCountry>, ClientError> {
    session
        .from::<FactbookCountry>()
        .select(["country_name", "category", "data"])
        .eq("country_name", country)
        .execute()
        .await
}

/// Indicator values for one country from `from_year` onwards.
pub async fn indicators_since(
    session: &Session,
    country: &str,
    from_year: i32,
    limit: usize,
) -> Result<ResultSet<WorldBankIndicator>, ClientError> {
    session
        .from::<WorldBankIndicator>()
        .select(["country_name", "indicator_name", "year", "value"])
        .filter_where(Predicate::all([
            Predicate::eq("country_name", country),
            Predicate::gte("year", from_year),
        ]))
        .limit(limit)
        .execute()
        .await
}
