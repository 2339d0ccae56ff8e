use serde::Deserialize;

/// The JSON error body the REST layer returns with 4xx/5xx responses.
///
/// Every field is optional: gateway errors (e.g. a rejected key) only carry
/// `message`, database errors carry all four.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServiceErrorResponse {
    pub code: Option<String>,
    pub message: Option<String>,
    pub details: Option<String>,
    pub hint: Option<String>,
}

impl ServiceErrorResponse {
    /// Parses an error body. Bodies that are not the expected JSON keep their
    /// raw text as the message.
    pub fn parse(body: &str) -> Self {
        match serde_json::from_str::<ServiceErrorResponse>(body) {
            Ok(parsed) if parsed.message.is_some() || parsed.code.is_some() => parsed,
            _ => Self {
                message: Some(body.trim().to_string()).filter(|m| !m.is_empty()),
                ..Self::default()
            },
        }
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_database_errors() {
        let body = r#"{"code":"22007","details":null,"hint":null,"message":"invalid input syntax for type date: \"soon\""}"#;
        let parsed = ServiceErrorResponse::parse(body);
        assert_eq!(parsed.code.as_deref(), Some("22007"));
        assert!(parsed.message.unwrap().contains("invalid input syntax"));
        assert_eq!(parsed.details, None);
    }

    #[test]
    fn keeps_plain_text_bodies() {
        let parsed = ServiceErrorResponse::parse("upstream connect error\n");
        assert_eq!(parsed.code, None);
        assert_eq!(parsed.message.as_deref(), Some("upstream connect error"));
    }

    #[test]
    fn empty_body_falls_back() {
        let parsed = ServiceErrorResponse::parse("");
        assert_eq!(parsed.message_or("HTTP 502"), "HTTP 502");
    }
}
