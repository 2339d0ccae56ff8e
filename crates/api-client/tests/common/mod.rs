//! An in-memory stand-in for the REST backend.
//!
//! It checks the key and schema headers the way the real gateway does, and
//! understands enough of the query syntax (`select`, `column=op.value` with
//! eq/neq/gt/gte/lt/lte, single-column `order`, `limit`) to serve the tests.

#![allow(dead_code)]

use api_client::{ClientError, HttpRequest, HttpResponse, SessionFactory, Transport};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ENDPOINT: &str = "https://demo.supabase.co";
pub const API_KEY: &str = "anon-test-key";

pub struct FakeBackend {
    api_key: Mutex<String>,
    /// schema -> table -> rows
    tables: HashMap<String, HashMap<String, Vec<Value>>>,
    requests: Mutex<Vec<HttpRequest>>,
    next_failure: Mutex<Option<HttpResponse>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            api_key: Mutex::new(API_KEY.to_string()),
            tables: HashMap::new(),
            requests: Mutex::new(Vec::new()),
            next_failure: Mutex::new(None),
        }
    }

    pub fn with_table(mut self, schema: &str, table: &str, rows: Vec<Value>) -> Self {
        self.tables
            .entry(schema.to_string())
            .or_default()
            .insert(table.to_string(), rows);
        self
    }

    /// The backend with the three demo datasets loaded.
    pub fn seeded() -> Self {
        Self::new()
            .with_table("acled", "events", acled_rows())
            .with_table("cia_factbook", "countries", factbook_rows())
            .with_table("world_bank", "indicators", world_bank_rows())
    }

    pub fn rotate_key(&self, key: &str) {
        *self.api_key.lock().unwrap() = key.to_string();
    }

    /// Makes the next table request fail with the given response.
    pub fn fail_next_query(&self, status: u16, body: Value) {
        *self.next_failure.lock().unwrap() = Some(HttpResponse { status, body: body.to_string() });
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests that targeted a table, i.e. everything but handshakes.
    pub fn table_requests(&self) -> Vec<HttpRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.url.path() != "/rest/v1/")
            .collect()
    }

    fn respond(&self, request: &HttpRequest) -> HttpResponse {
        let expected_key = self.api_key.lock().unwrap().clone();
        let bearer = format!("Bearer {}", expected_key);
        if request.header("apikey") != Some(expected_key.as_str()) || request.header("Authorization") != Some(bearer.as_str()) {
            return reply(401, json!({ "message": "Invalid API key", "hint": "Double check your key" }));
        }

        let schema = request.header("Accept-Profile").unwrap_or("public");
        let Some(tables) = self.tables.get(schema) else {
            let mut exposed: Vec<&String> = self.tables.keys().collect();
            exposed.sort();
            return reply(
                406,
                json!({
                    "code": "PGRST106",
                    "message": format!("The schema must be one of the following: {:?}", exposed),
                }),
            );
        };

        let path = request.url.path();
        if path == "/rest/v1/" {
            return reply(200, json!({ "swagger": "2.0" }));
        }

        if let Some(failure) = self.next_failure.lock().unwrap().take() {
            return failure;
        }

        let table = path.trim_start_matches("/rest/v1/");
        let Some(rows) = tables.get(table) else {
            return reply(404, json!({ "code": "42P01", "message": format!("relation \"{}.{}\" does not exist", schema, table) }));
        };

        match run_query(rows, &request.query) {
            Ok(rows) => reply(200, Value::Array(rows)),
            Err(error) => reply(400, error),
        }
    }
}

#[async_trait]
impl Transport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(self.respond(&request))
    }
}

/// A transport whose every request fails before reaching a server.
pub struct UnreachableTransport;

#[async_trait]
impl Transport for UnreachableTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, ClientError> {
        Err(ClientError::Network("connection refused".to_string()))
    }
}

/// Accepts every handshake, then drops every table request.
pub struct DroppingTransport;

#[async_trait]
impl Transport for DroppingTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ClientError> {
        if request.url.path() == "/rest/v1/" {
            return Ok(HttpResponse { status: 200, body: "{}".to_string() });
        }
        Err(ClientError::Network("request timed out".to_string()))
    }
}

pub fn factory(backend: &Arc<FakeBackend>) -> SessionFactory {
    SessionFactory::with_transport(ENDPOINT, API_KEY, backend.clone()).unwrap()
}

fn reply(status: u16, body: Value) -> HttpResponse {
    HttpResponse { status, body: body.to_string() }
}

fn run_query(rows: &[Value], query: &[(String, String)]) -> Result<Vec<Value>, Value> {
    let mut selected: Vec<Value> = Vec::new();
    'rows: for row in rows {
        for (key, value) in query {
            if matches!(key.as_str(), "select" | "order" | "limit") {
                continue;
            }
            let (op, operand) = value
                .split_once('.')
                .ok_or_else(|| json!({ "code": "PGRST100", "message": format!("failed to parse filter ({})", value) }))?;
            if !matches_condition(row.get(key), op, operand)? {
                continue 'rows;
            }
        }
        selected.push(row.clone());
    }

    if let Some((_, order)) = query.iter().find(|(k, _)| k == "order") {
        let (column, direction) = order.split_once('.').unwrap_or((order.as_str(), "asc"));
        selected.sort_by(|a, b| {
            let ordering = compare_values(a.get(column), b.get(column));
            if direction == "desc" { ordering.reverse() } else { ordering }
        });
    }

    if let Some((_, limit)) = query.iter().find(|(k, _)| k == "limit") {
        let limit: usize = limit
            .parse()
            .map_err(|_| json!({ "code": "PGRST102", "message": "invalid limit" }))?;
        selected.truncate(limit);
    }

    let columns: Option<Vec<&str>> = query
        .iter()
        .find(|(k, _)| k == "select")
        .filter(|(_, v)| v != "*")
        .map(|(_, v)| v.split(',').collect());

    Ok(selected
        .into_iter()
        .map(|row| match (&columns, row) {
            (Some(columns), Value::Object(map)) => {
                let projected: Map<String, Value> = map
                    .into_iter()
                    .filter(|(k, _)| columns.contains(&k.as_str()))
                    .collect();
                Value::Object(projected)
            }
            (_, row) => row,
        })
        .collect())
}

fn matches_condition(value: Option<&Value>, op: &str, operand: &str) -> Result<bool, Value> {
    let ordering = match value {
        None | Some(Value::Null) => return Ok(false),
        Some(Value::Number(n)) => {
            let rhs: f64 = operand.parse().map_err(|_| {
                json!({ "code": "22P02", "message": format!("invalid input syntax for type integer: \"{}\"", operand) })
            })?;
            n.as_f64().and_then(|lhs| lhs.partial_cmp(&rhs))
        }
        Some(Value::String(s)) => Some(s.as_str().cmp(operand)),
        Some(other) => Some(other.to_string().as_str().cmp(operand)),
    };
    let Some(ordering) = ordering else { return Ok(false) };

    Ok(match op {
        "eq" => ordering == Ordering::Equal,
        "neq" => ordering != Ordering::Equal,
        "gt" => ordering == Ordering::Greater,
        "gte" => ordering != Ordering::Less,
        "lt" => ordering == Ordering::Less,
        "lte" => ordering != Ordering::Greater,
        other => {
            return Err(json!({ "code": "PGRST100", "message": format!("unsupported operator '{}'", other) }));
        }
    })
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            x.as_f64().partial_cmp(&y.as_f64()).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (None | Some(Value::Null), None | Some(Value::Null)) => Ordering::Equal,
        // Nulls sort last, as in Postgres ascending order.
        (None | Some(Value::Null), _) => Ordering::Greater,
        (_, None | Some(Value::Null)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

pub fn acled_rows() -> Vec<Value> {
    vec![
        json!({ "event_id_cnty": "JOR1", "event_date": "1998-06-14", "year": 1998, "disorder_type": "Political violence", "fatalities": 2, "latitude": 31.95, "timestamp": 1618275000 }),
        json!({ "event_id_cnty": "JOR2", "event_date": "2003-03-20", "year": 2003, "disorder_type": "Demonstrations", "fatalities": 0, "latitude": "32.0833", "timestamp": 1618275001 }),
        json!({ "event_id_cnty": "JOR3", "event_date": "1999-12-31", "year": 1999, "disorder_type": null, "fatalities": null, "latitude": null, "timestamp": null }),
        json!({ "event_id_cnty": "JOR4", "event_date": "2016-12-18", "year": 2016, "disorder_type": "Political violence", "fatalities": 14, "latitude": 31.1667, "timestamp": 1618275002 }),
        json!({ "event_id_cnty": "JOR5", "event_date": "2000-01-01", "year": 2000, "disorder_type": "Strategic developments", "fatalities": 0, "latitude": 29.5267, "timestamp": 1618275003 }),
    ]
}

pub fn factbook_rows() -> Vec<Value> {
    vec![
        json!({
            "country_name": "Jordan",
            "category": "Geography",
            "subcategory_level1": "Area",
            "subcategory_level2": "total",
            "subcategory_level3": "",
            "data": "89,342 sq km",
            "last_updated": "2024-05-01T08:30:00+00:00"
        }),
        json!({
            "country_name": "Lebanon",
            "category": "Geography",
            "subcategory_level1": "Area",
            "subcategory_level2": "total",
            "subcategory_level3": "",
            "data": null,
            "last_updated": null
        }),
    ]
}

pub fn world_bank_rows() -> Vec<Value> {
    vec![
        json!({ "country_name": "Jordan", "country_code": "JOR", "indicator_name": "GDP growth (annual %)", "indicator_code": "NY.GDP.MKTP.KD.ZG", "year": 1999, "value": 3.4 }),
        json!({ "country_name": "Jordan", "country_code": "JOR", "indicator_name": "GDP growth (annual %)", "indicator_code": "NY.GDP.MKTP.KD.ZG", "year": 2000, "value": 4.24 }),
        json!({ "country_name": "Jordan", "country_code": "JOR", "indicator_name": "GDP growth (annual %)", "indicator_code": "NY.GDP.MKTP.KD.ZG", "year": 2001, "value": "5.27" }),
        json!({ "country_name": "Jordan", "country_code": "JOR", "indicator_name": null, "indicator_code": null, "year": 2005, "value": null }),
        json!({ "country_name": "Lebanon", "country_code": "LBN", "indicator_name": "GDP growth (annual %)", "indicator_code": "NY.GDP.MKTP.KD.ZG", "year": 2001, "value": 4.5 }),
    ]
}
