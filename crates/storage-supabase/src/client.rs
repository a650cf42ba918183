//! Thin PostgREST client for a Supabase project.
//!
//! Requests authenticate with the service role key, sent both as the
//! `apikey` header and as a bearer token.

use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use dailybars_core::errors::{ConfigError, DatabaseError, Error, Result};

/// Default timeout for PostgREST requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REST_PATH: &str = "/rest/v1/";

/// Longest slice of an error body kept in error messages.
const ERROR_BODY_LIMIT: usize = 200;

#[derive(Debug, serde::Deserialize)]
struct PostgrestErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PostgrestClient {
    client: reqwest::Client,
    base_url: Url,
    headers: HeaderMap,
}

impl PostgrestClient {
    /// Create a client for the project at `project_url`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL does not parse or the key
    /// cannot be sent as a header value.
    pub fn new(project_url: &str, service_role_key: &str) -> Result<Self> {
        let rest_url = format!("{}{}", project_url.trim_end_matches('/'), REST_PATH);
        let base_url = Url::parse(&rest_url).map_err(|e| {
            Error::Config(ConfigError::InvalidValue {
                key: "SUPABASE_URL".to_string(),
                value: project_url.to_string(),
                reason: e.to_string(),
            })
        })?;

        let invalid_key = |reason: String| {
            Error::Config(ConfigError::InvalidValue {
                key: "SUPABASE_SERVICE_ROLE_KEY".to_string(),
                value: "<redacted>".to_string(),
                reason,
            })
        };
        let mut apikey =
            HeaderValue::from_str(service_role_key).map_err(|e| invalid_key(e.to_string()))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", service_role_key))
            .map_err(|e| invalid_key(e.to_string()))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("apikey", apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                Error::Database(DatabaseError::ConnectionFailed(format!(
                    "Failed to initialize HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            base_url,
            headers,
        })
    }

    /// URL of a table endpoint with the given query parameters.
    pub fn table_url(&self, table: &str, query: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.join(table).map_err(|e| {
            Error::Database(DatabaseError::Internal(format!(
                "Invalid table name '{}': {}",
                table, e
            )))
        })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    /// GET rows from a table.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query)?;
        debug!("[Postgrest] GET {}", url);

        let response = self
            .client
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await
            .map_err(request_failed)?;

        let body = read_body(response).await?;
        parse_rows(&body)
    }

    /// POST rows to a table. `prefer` is sent as the `Prefer` header.
    ///
    /// Returns the rows echoed back when `prefer` asks for
    /// `return=representation`, otherwise an empty list.
    pub async fn insert<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, &str)],
        prefer: &'static str,
        rows: &B,
    ) -> Result<Vec<T>> {
        let url = self.table_url(table, query)?;
        debug!("[Postgrest] POST {} ({})", url, prefer);

        let response = self
            .client
            .post(url)
            .headers(self.headers.clone())
            .header("Prefer", prefer)
            .json(rows)
            .send()
            .await
            .map_err(request_failed)?;

        let body = read_body(response).await?;
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        parse_rows(&body)
    }
}

fn request_failed(err: reqwest::Error) -> Error {
    Error::Database(DatabaseError::ConnectionFailed(format!(
        "Request failed: {}",
        err
    )))
}

/// Read the body, turning a non-success status into an error.
async fn read_body(response: reqwest::Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await.map_err(|e| {
        Error::Database(DatabaseError::QueryFailed(format!(
            "Failed to read response: {}",
            e
        )))
    })?;

    if !status.is_success() {
        return Err(status_error(status, &body));
    }
    Ok(body)
}

fn parse_rows<T: DeserializeOwned>(body: &str) -> Result<Vec<T>> {
    serde_json::from_str(body).map_err(|e| {
        Error::Database(DatabaseError::QueryFailed(format!(
            "Failed to parse response: {} - {}",
            e,
            truncate(body)
        )))
    })
}

/// Map a PostgREST error status to a core error.
///
/// Rejected credentials become `Unauthorized`, which aborts the run.
pub(crate) fn status_error(status: StatusCode, body: &str) -> Error {
    let detail = match serde_json::from_str::<PostgrestErrorResponse>(body) {
        Ok(PostgrestErrorResponse {
            message: Some(message),
            hint,
        }) => match hint {
            Some(hint) => format!("{} ({})", message, hint),
            None => message,
        },
        _ => truncate(body),
    };
    let message = format!("HTTP {}: {}", status.as_u16(), detail);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Database(DatabaseError::Unauthorized(message))
        }
        _ => Error::Database(DatabaseError::QueryFailed(message)),
    }
}

fn truncate(body: &str) -> String {
    body.chars().take(ERROR_BODY_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> PostgrestClient {
        PostgrestClient::new("https://abc.supabase.co/", "service-key").unwrap()
    }

    #[test]
    fn test_table_url_encodes_filters() {
        let url = client()
            .table_url("instruments", &[("select", "*"), ("symbol", "eq.^GSPC"), ("limit", "1")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://abc.supabase.co/rest/v1/instruments?select=*&symbol=eq.%5EGSPC&limit=1"
        );
    }

    #[test]
    fn test_table_url_without_query() {
        let url = client().table_url("ohlcv_data", &[]).unwrap();
        assert_eq!(url.as_str(), "https://abc.supabase.co/rest/v1/ohlcv_data");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let err = PostgrestClient::new("not a url", "key").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_invalid_key_does_not_leak() {
        let err = PostgrestClient::new("https://abc.supabase.co", "bad\nkey").unwrap_err();
        assert!(!err.to_string().contains("bad"));
    }

    #[test]
    fn test_auth_statuses_are_fatal() {
        let body = r#"{"message":"Invalid API key","hint":"Double check your Supabase `anon` or `service_role` API key."}"#;
        for status in [StatusCode::UNAUTHORIZED, StatusCode::FORBIDDEN] {
            let err = status_error(status, body);
            assert!(matches!(err, Error::Database(DatabaseError::Unauthorized(_))));
            assert!(err.is_fatal());
            assert!(err.to_string().contains("Invalid API key"));
        }
    }

    #[test]
    fn test_other_statuses_are_query_failures() {
        let err = status_error(StatusCode::CONFLICT, "duplicate key value");
        assert!(matches!(err, Error::Database(DatabaseError::QueryFailed(_))));
        assert!(!err.is_fatal());
        assert!(err.to_string().contains("HTTP 409: duplicate key value"));
    }

    #[test]
    fn test_long_bodies_are_truncated() {
        let body = "x".repeat(1_000);
        let err = status_error(StatusCode::INTERNAL_SERVER_ERROR, &body);
        assert!(err.to_string().len() < 300);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_connection_failure() {
        let client = PostgrestClient::new("http://127.0.0.1:1", "key").unwrap();
        let err = client
            .select::<serde_json::Value>("instruments", &[("limit", "1")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Database(DatabaseError::ConnectionFailed(_))));
        assert!(!err.is_fatal());
    }
}
