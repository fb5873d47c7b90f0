//! REST client for the hosted backend's table API.
//!
//! Rows are addressed as `{url}/rest/v1/{table}` with PostgREST-style filter
//! parameters (`user_id=eq.abc`, `order=recorded_at.desc`, `limit=14`).

use std::time::Duration;

use reqwest::{header, Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::BackendConfig;
use crate::error::{Result, StoreError};

/// Accept header asking for a single JSON object instead of an array.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Filter, order and limit parameters for a table request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    params: Vec<(String, String)>,
    order: Vec<String>,
}

impl Query {
    /// `select=*`
    pub fn select_all() -> Self {
        Self {
            params: vec![("select".to_string(), "*".to_string())],
            order: Vec::new(),
        }
    }

    /// No parameters; used for mutations.
    pub fn filter() -> Self {
        Self::default()
    }

    fn op(mut self, column: &str, op: &str, value: impl std::fmt::Display) -> Self {
        self.params.push((column.to_string(), format!("{}.{}", op, value)));
        self
    }

    pub fn eq(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.op(column, "eq", value)
    }

    pub fn gte(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.op(column, "gte", value)
    }

    pub fn lte(self, column: &str, value: impl std::fmt::Display) -> Self {
        self.op(column, "lte", value)
    }

    /// Case-insensitive substring match.
    pub fn ilike_contains(self, column: &str, needle: &str) -> Self {
        self.op(column, "ilike", format!("%{}%", needle))
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        let dir = if ascending { "asc" } else { "desc" };
        self.order.push(format!("{}.{}", column, dir));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.params.push(("limit".to_string(), limit.to_string()));
        self
    }

    /// Encoded query string without the leading `?`.
    pub fn to_query_string(&self) -> String {
        let mut parts: Vec<String> = self
            .params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        if !self.order.is_empty() {
            parts.push(format!("order={}", urlencoding::encode(&self.order.join(","))));
        }
        parts.join("&")
    }
}

/// Error body returned by the table API.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// HTTP client for the table API. Cheap to clone.
#[derive(Debug, Clone)]
pub struct RestClient {
    config: BackendConfig,
    client: Client,
}

impl RestClient {
    /// Create a client. Fails when the URL or anon key is missing.
    pub fn new(config: BackendConfig) -> Result<Self> {
        config.validate().map_err(StoreError::Configuration)?;

        let mut headers = header::HeaderMap::new();
        headers.insert(
            "apikey",
            header::HeaderValue::from_str(&config.anon_key)
                .map_err(|e| StoreError::Configuration(format!("Invalid anon key: {}", e)))?,
        );
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", config.bearer()))
                .map_err(|e| StoreError::Configuration(format!("Invalid access token: {}", e)))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn table_url(&self, table: &str, query: &Query) -> String {
        let qs = query.to_query_string();
        let mut url = format!("{}/rest/v1/{}", self.config.base_url(), table);
        if !qs.is_empty() {
            url.push('?');
            url.push_str(&qs);
        }
        url
    }

    // ==================== Reads ====================

    /// Fetch every matching row.
    pub async fn fetch_many<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Vec<T>> {
        let url = self.table_url(table, query);
        debug!(table, %url, "GET rows");

        let response = self.client.get(&url).send().await?;
        let rows: Option<Vec<T>> = handle_response(response).await?;
        Ok(rows.unwrap_or_default())
    }

    /// Fetch exactly one row; "no rows" is `Ok(None)`.
    pub async fn fetch_one<T: DeserializeOwned>(&self, table: &str, query: &Query) -> Result<Option<T>> {
        let url = self.table_url(table, query);
        debug!(table, %url, "GET single row");

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .send()
            .await?;

        match handle_response(response).await {
            Ok(row) => Ok(row),
            Err(e) if e.is_no_rows() => Ok(None),
            Err(e) => Err(e),
        }
    }

    // ==================== Writes ====================

    /// Insert one row and return it as stored.
    pub async fn insert<B, T>(&self, table: &'static str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, &Query::filter());
        debug!(table, "POST row");

        let response = self
            .client
            .post(&url)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        handle_response(response)
            .await?
            .ok_or_else(|| StoreError::InvalidResponse(format!("insert into {} returned no row", table)))
    }

    /// Patch the rows matching `query` and return the single updated row.
    pub async fn update<B, T>(&self, table: &'static str, query: &Query, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.table_url(table, query);
        debug!(table, %url, "PATCH row");

        let response = self
            .client
            .patch(&url)
            .header(header::ACCEPT, SINGLE_OBJECT)
            .header("Prefer", "return=representation")
            .json(body)
            .send()
            .await?;

        match handle_response(response).await {
            Ok(Some(row)) => Ok(row),
            Ok(None) => Err(StoreError::NotFound { table }),
            Err(e) if e.is_no_rows() => Err(StoreError::NotFound { table }),
            Err(e) => Err(e),
        }
    }

    /// Delete the rows matching `query`.
    pub async fn delete(&self, table: &'static str, query: &Query) -> Result<()> {
        let url = self.table_url(table, query);
        debug!(table, %url, "DELETE rows");

        let response = self.client.delete(&url).send().await?;
        let _: Option<serde_json::Value> = handle_response(response).await?;
        Ok(())
    }
}

/// Map a response to its JSON body. An empty success body is `None`.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<Option<T>> {
    let status = response.status();

    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(backend_error(status, &body));
    }

    let bytes = response.bytes().await?;
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

fn backend_error(status: StatusCode, body: &str) -> StoreError {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(parsed) => StoreError::Backend {
            status: status.as_u16(),
            code: parsed.code.unwrap_or_default(),
            message: match (parsed.message, parsed.details) {
                (Some(m), Some(d)) => format!("{} ({})", m, d),
                (Some(m), None) => m,
                (None, Some(d)) => d,
                (None, None) => body.to_string(),
            },
        },
        Err(_) => StoreError::Backend {
            status: status.as_u16(),
            code: String::new(),
            message: body.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_string() {
        let q = Query::select_all()
            .eq("user_id", "u1")
            .order("recorded_at", false)
            .limit(14);
        assert_eq!(
            q.to_query_string(),
            "select=%2A&user_id=eq.u1&limit=14&order=recorded_at.desc"
        );
    }

    #[test]
    fn test_multi_order_joined() {
        let q = Query::filter().order("category", true).order("name", true);
        assert_eq!(q.to_query_string(), "order=category.asc%2Cname.asc");
    }

    #[test]
    fn test_ilike_encodes_wildcards() {
        let q = Query::filter().ilike_contains("name", "rice");
        assert_eq!(q.to_query_string(), "name=ilike.%25rice%25");
    }

    #[test]
    fn test_backend_error_parsing() {
        let err = backend_error(
            StatusCode::NOT_ACCEPTABLE,
            r#"{"code":"PGRST116","message":"JSON object requested, multiple (or no) rows returned","details":"The result contains 0 rows"}"#,
        );
        assert!(err.is_no_rows());

        let err = backend_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            StoreError::Backend { status, code, message } => {
                assert_eq!(status, 502);
                assert!(code.is_empty());
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_new_requires_key() {
        let err = RestClient::new(BackendConfig::default()).unwrap_err();
        assert!(matches!(err, StoreError::Configuration(_)));
    }
}
