use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, Table};
use core_types::{AcledEvent, FactbookCountry, WorldBankIndicator};
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One human-readable line per row.
    Lines,
    /// A bordered table.
    Table,
}

/// Empty for `None`, like an unset nullable column.
fn opt<T: Display>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn or_na(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("N/A")
}

fn table(header: Vec<&str>, rows: Vec<Vec<String>>) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(header);
    for row in rows {
        table.add_row(row);
    }
    table.to_string()
}

pub fn render_events(events: &[AcledEvent], format: OutputFormat) -> String {
    match format {
        OutputFormat::Lines => events
            .iter()
            .map(|e| {
                format!(
                    "Event ID: {}, Date: {}, Disorder: {}, Fatalities: {}",
                    e.event_id_cnty,
                    opt(&e.event_date),
                    or_na(&e.disorder_type),
                    opt(&e.fatalities)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => table(
            vec!["Event ID", "Date", "Disorder", "Fatalities"],
            events
                .iter()
                .map(|e| {
                    vec![
                        e.event_id_cnty.clone(),
                        opt(&e.event_date),
                        or_na(&e.disorder_type).to_string(),
                        opt(&e.fatalities),
                    ]
                })
                .collect(),
        ),
    }
}

pub fn render_countries(countries: &[FactbookCountry], format: OutputFormat) -> String {
    match format {
        OutputFormat::Lines => countries
            .iter()
            .map(|c| format!("Country: {}, Category: {}, Data: {}", c.country_name, c.category, or_na(&c.data)))
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => table(
            vec!["Country", "Category", "Data"],
            countries
                .iter()
                .map(|c| vec![c.country_name.clone(), c.category.clone(), or_na(&c.data).to_string()])
                .collect(),
        ),
    }
}

pub fn render_indicators(indicators: &[WorldBankIndicator], format: OutputFormat) -> String {
    match format {
        OutputFormat::Lines => indicators
            .iter()
            .map(|i| {
                format!(
                    "Country: {}, Indicator: {}, Year: {}, Value: {}",
                    i.country_name,
                    or_na(&i.indicator_name),
                    opt(&i.year),
                    opt(&i.value)
                )
            })
            .collect::<Vec<_>>()
            .join("\n"),
        OutputFormat::Table => table(
            vec!["Country", "Indicator", "Year", "Value"],
            indicators
                .iter()
                .map(|i| {
                    vec![
                        i.country_name.clone(),
                        or_na(&i.indicator_name).to_string(),
                        opt(&i.year),
                        opt(&i.value),
                    ]
                })
                .collect(),
        ),
    }
}
