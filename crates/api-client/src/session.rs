use crate::auth::session_headers;
use crate::error::ClientError;
use crate::mapper::map_rows;
use crate::query::{QueryBuilder, QueryRequest};
use crate::responses::ServiceErrorResponse;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Transport};
use configuration::ServiceConfig;
use core_types::Record;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Path segments of the REST API below the project endpoint.
const REST_PREFIX: [&str; 2] = ["rest", "v1"];

/// PostgREST code returned when the requested schema is not exposed.
const SCHEMA_NOT_EXPOSED: &str = "PGRST106";

/// Opens sessions against one endpoint with one API key.
///
/// Sessions created by the same factory share its transport (for the HTTP
/// transport, one connection pool) but nothing mutable.
#[derive(Clone)]
pub struct SessionFactory {
    endpoint: Url,
    api_key: String,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl SessionFactory {
    /// Validates the endpoint and key and sets up the HTTP transport.
    /// No request is made until [`SessionFactory::create_session`].
    pub fn new(endpoint: &str, api_key: &str) -> Result<Self, ClientError> {
        let transport = Arc::new(HttpTransport::new()?);
        Self::with_transport(endpoint, api_key, transport)
    }

    /// Like [`SessionFactory::new`], with a caller-supplied transport.
    pub fn with_transport(endpoint: &str, api_key: &str, transport: Arc<dyn Transport>) -> Result<Self, ClientError> {
        let endpoint = parse_endpoint(endpoint)?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(ClientError::Configuration("API key must not be empty".to_string()));
        }
        Ok(Self {
            endpoint,
            api_key: api_key.to_string(),
            transport,
            timeout: None,
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClientError> {
        let factory = Self::new(&config.url, &config.key)?;
        Ok(match config.timeout() {
            Some(timeout) => factory.with_timeout(timeout),
            None => factory,
        })
    }

    /// Default timeout for the handshake and every query of created sessions.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Opens a session bound to `schema`.
    ///
    /// Resolves once the service has accepted the key for that schema.
    pub async fn create_session(&self, schema: &str) -> Result<Session, ClientError> {
        let schema = schema.trim();
        let headers = session_headers(&self.api_key, schema)?;
        handshake(self.transport.as_ref(), &self.endpoint, &headers, schema, self.timeout).await?;
        tracing::info!(schema, "Session opened.");

        Ok(Session {
            endpoint: self.endpoint.clone(),
            schema: schema.to_string(),
            headers,
            transport: Arc::clone(&self.transport),
            timeout: self.timeout,
        })
    }
}

impl fmt::Debug for SessionFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionFactory")
            .field("endpoint", &self.endpoint.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Opens a single authenticated session over HTTPS.
pub async fn create_session(endpoint: &str, api_key: &str, schema: &str) -> Result<Session, ClientError> {
    SessionFactory::new(endpoint, api_key)?.create_session(schema).await
}

/// An authenticated connection context bound to one schema.
pub struct Session {
    endpoint: Url,
    schema: String,
    /// Auth and profile headers, rebuilt on re-authentication.
    headers: Vec<(String, String)>,
    transport: Arc<dyn Transport>,
    timeout: Option<Duration>,
}

impl Session {
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Starts a query against the table behind `T`.
    pub fn from<T: Record>(&self) -> QueryBuilder<'_, T> {
        QueryBuilder::new(self)
    }

    /// Swaps in a new API key after the service rejected the old one.
    ///
    /// The new key is verified with the same handshake as session creation
    /// and only replaces the old one when the service accepts it. Sessions
    /// never refresh credentials on their own.
    pub async fn reauthenticate(&mut self, api_key: &str) -> Result<(), ClientError> {
        let headers = session_headers(api_key, &self.schema)?;
        handshake(self.transport.as_ref(), &self.endpoint, &headers, &self.schema, self.timeout).await?;
        self.headers = headers;
        Ok(())
    }

    /// Runs a validated request and maps the rows it returns.
    pub(crate) async fn fetch<T: Record>(
        &self,
        request: &QueryRequest,
        timeout: Option<Duration>,
    ) -> Result<Vec<T>, ClientError> {
        let url = rest_url(&self.endpoint, request.schema().table)?;
        let response = self
            .transport
            .send(HttpRequest {
                url,
                query: request.query_pairs(),
                headers: self.headers.clone(),
                timeout: timeout.or(self.timeout),
            })
            .await?;

        match response.status {
            200..=299 => Ok(map_rows::<T>(&response.body, request.projection())?),
            401 | 403 => Err(authentication_error(&response)),
            status => {
                let body = ServiceErrorResponse::parse(&response.body);
                Err(ClientError::Query {
                    status,
                    message: body.message_or(&format!("HTTP {}", status)),
                    code: body.code,
                    details: body.details,
                    hint: body.hint,
                })
            }
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.endpoint.as_str())
            .field("schema", &self.schema)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

/// Confirms that the service accepts the key for `schema`.
async fn handshake(
    transport: &dyn Transport,
    endpoint: &Url,
    headers: &[(String, String)],
    schema: &str,
    timeout: Option<Duration>,
) -> Result<(), ClientError> {
    let response = transport
        .send(HttpRequest {
            url: rest_url(endpoint, "")?,
            query: Vec::new(),
            headers: headers.to_vec(),
            timeout,
        })
        .await?;

    if response.is_success() {
        return Ok(());
    }

    let body = ServiceErrorResponse::parse(&response.body);
    match response.status {
        401 | 403 => Err(authentication_error(&response)),
        _ if response.status == 406 || body.code.as_deref() == Some(SCHEMA_NOT_EXPOSED) => {
            Err(ClientError::Configuration(format!(
                "schema '{}' is not exposed by the service: {}",
                schema,
                body.message_or("not acceptable")
            )))
        }
        status => Err(ClientError::Network(format!(
            "handshake failed with HTTP {}: {}",
            status,
            body.message_or("no response body")
        ))),
    }
}

fn authentication_error(response: &HttpResponse) -> ClientError {
    let body = ServiceErrorResponse::parse(&response.body);
    ClientError::Authentication(body.message_or(&format!("HTTP {}", response.status)))
}

fn parse_endpoint(endpoint: &str) -> Result<Url, ClientError> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ClientError::Configuration("service endpoint must not be empty".to_string()));
    }

    let url = Url::parse(endpoint)
        .map_err(|e| ClientError::Configuration(format!("invalid service endpoint '{}': {}", endpoint, e)))?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(ClientError::Configuration(format!(
            "service endpoint '{}' must be an http(s) URL",
            endpoint
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::Configuration(format!(
            "service endpoint '{}' must not carry a query or fragment",
            endpoint
        )));
    }
    Ok(url)
}

/// `{endpoint}/rest/v1/{table}`. An empty table yields the API root.
fn rest_url(endpoint: &Url, table: &str) -> Result<Url, ClientError> {
    let mut url = endpoint.clone();
    url.path_segments_mut()
        .map_err(|_| ClientError::Configuration(format!("service endpoint '{}' cannot take a path", endpoint)))?
        .pop_if_empty()
        .extend(REST_PREFIX)
        .push(table);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_urls_append_to_the_endpoint() {
        let endpoint = parse_endpoint("https://demo.supabase.co").unwrap();
        assert_eq!(rest_url(&endpoint, "events").unwrap().as_str(), "https://demo.supabase.co/rest/v1/events");
        assert_eq!(rest_url(&endpoint, "").unwrap().as_str(), "https://demo.supabase.co/rest/v1/");

        let prefixed = parse_endpoint("http://localhost:54321/proxy/").unwrap();
        assert_eq!(
            rest_url(&prefixed, "countries").unwrap().as_str(),
            "http://localhost:54321/proxy/rest/v1/countries"
        );
    }

    #[test]
    fn endpoint_validation() {
        for bad in ["", "   ", "not a url", "ftp://demo.example", "mailto:ops@demo.example", "https://demo.example/?x=1"] {
            assert!(matches!(parse_endpoint(bad), Err(ClientError::Configuration(_))), "{}", bad);
        }
        assert!(parse_endpoint(" https://demo.example ").is_ok());
    }

    #[test]
    fn factory_rejects_blank_keys_before_any_request() {
        let result = SessionFactory::new("https://demo.example", " ");
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn debug_output_hides_the_key() {
        let factory = SessionFactory::new("https://demo.example", "very-secret").unwrap();
        let printed = format!("{:?}", factory);
        assert!(!printed.contains("very-secret"));
    }
}
