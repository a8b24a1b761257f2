//! Data service client — generic row fetch, count, insert, delete.
//!
//! ARCHITECTURE
//! ============
//! The hosted database is reached through its REST row API, never directly.
//! Queries are built as filter/order/limit pairs and rendered into the query
//! string (`email=eq.x&order=date_notif.desc&limit=5`). JSON rows in, JSON
//! rows out; callers pick the fields they need.

use serde::Deserialize;

/// Remote data service configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub base_url: String,
    pub api_key: String,
}

impl DataConfig {
    /// Load from `DATA_SERVICE_URL` and `DATA_SERVICE_KEY`.
    /// Returns `None` if either is missing.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("DATA_SERVICE_URL").ok()?;
        let api_key = std::env::var("DATA_SERVICE_KEY").ok()?;
        Some(Self { base_url, api_key })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("data service error: {0}")]
    Service(String),
    #[error("row not found")]
    NotFound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gte,
    Lte,
}

impl FilterOp {
    fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

/// Filtered/ordered/limited row fetch against a named table.
#[derive(Debug, Clone)]
pub struct SelectQuery {
    table: String,
    columns: String,
    filters: Vec<(String, FilterOp, String)>,
    order: Option<(String, bool)>,
    limit: Option<u32>,
}

impl SelectQuery {
    #[must_use]
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_owned(),
            columns: "*".to_owned(),
            filters: Vec::new(),
            order: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = columns.to_owned();
        self
    }

    #[must_use]
    pub fn filter(mut self, column: &str, op: FilterOp, value: &str) -> Self {
        self.filters.push((column.to_owned(), op, value.to_owned()));
        self
    }

    #[must_use]
    pub fn eq(self, column: &str, value: &str) -> Self {
        self.filter(column, FilterOp::Eq, value)
    }

    #[must_use]
    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some((column.to_owned(), false));
        self
    }

    #[must_use]
    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some((column.to_owned(), true));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Render the query as key/value pairs, ready for the URL query string.
    #[must_use]
    pub(crate) fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_owned(), self.columns.clone())];
        for (column, op, value) in &self.filters {
            pairs.push((column.clone(), format!("{}.{value}", op.as_str())));
        }
        if let Some((column, ascending)) = &self.order {
            let direction = if *ascending { "asc" } else { "desc" };
            pairs.push(("order".to_owned(), format!("{column}.{direction}")));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_owned(), limit.to_string()));
        }
        pairs
    }
}

/// Parse the total from a `content-range` header (`0-4/27` or `*/0`).
pub(crate) fn parse_content_range(header: &str) -> Option<i64> {
    header.rsplit('/').next()?.parse().ok()
}

fn request(
    client: &reqwest::Client,
    method: reqwest::Method,
    config: &DataConfig,
    table: &str,
) -> reqwest::RequestBuilder {
    client
        .request(method, config.table_url(table))
        .header("apikey", &config.api_key)
        .header("Authorization", format!("Bearer {}", config.api_key))
}

/// Fetch matching rows as raw JSON values.
pub async fn fetch_rows(config: &DataConfig, query: &SelectQuery) -> Result<Vec<serde_json::Value>, DataError> {
    let client = reqwest::Client::new();
    let resp = request(&client, reqwest::Method::GET, config, query.table())
        .query(&query.query_pairs())
        .send()
        .await
        .map_err(|e| DataError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DataError::Service(format!("{status}: {body}")));
    }

    resp.json::<Vec<serde_json::Value>>()
        .await
        .map_err(|e| DataError::Service(e.to_string()))
}

/// Fetch exactly one matching row; absence is an error.
pub async fn fetch_single(config: &DataConfig, query: &SelectQuery) -> Result<serde_json::Value, DataError> {
    let rows = fetch_rows(config, query).await?;
    rows.into_iter().next().ok_or(DataError::NotFound)
}

/// Exact row count for a table, via the range headers of an empty page.
pub async fn count_rows(config: &DataConfig, table: &str) -> Result<i64, DataError> {
    let client = reqwest::Client::new();
    let resp = request(&client, reqwest::Method::GET, config, table)
        .query(&[("select", "*")])
        .header("Prefer", "count=exact")
        .header("Range", "0-0")
        .send()
        .await
        .map_err(|e| DataError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DataError::Service(format!("{status}: {body}")));
    }

    resp.headers()
        .get("content-range")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_content_range)
        .ok_or_else(|| DataError::Service("missing content-range header".to_owned()))
}

/// Insert rows into a table. The payload is an array of row objects.
pub async fn insert_rows(config: &DataConfig, table: &str, rows: &serde_json::Value) -> Result<(), DataError> {
    let client = reqwest::Client::new();
    let resp = request(&client, reqwest::Method::POST, config, table)
        .header("Prefer", "return=minimal")
        .json(rows)
        .send()
        .await
        .map_err(|e| DataError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DataError::Service(format!("{status}: {body}")));
    }
    Ok(())
}

/// Delete rows where `column` equals `value`.
pub async fn delete_rows(config: &DataConfig, table: &str, column: &str, value: &str) -> Result<(), DataError> {
    let client = reqwest::Client::new();
    let resp = request(&client, reqwest::Method::DELETE, config, table)
        .query(&[(column, format!("eq.{value}"))])
        .send()
        .await
        .map_err(|e| DataError::Service(e.to_string()))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(DataError::Service(format!("{status}: {body}")));
    }
    Ok(())
}

/// Deserialize a list of raw rows into a typed Vec, skipping rows that do not
/// match the expected shape.
pub fn decode_rows<T: for<'de> Deserialize<'de>>(rows: Vec<serde_json::Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value(row) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed row");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "data_test.rs"]
mod tests;
