// src/services/directory.rs

//! University directory access.
//!
//! Lookups never fail from the caller's point of view: an unreachable
//! directory, an error status or a malformed payload all read as "no
//! candidates", which the deriver turns into placeholder deadlines.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{DirectoryConfig, UniversityDirectoryEntry};
use crate::utils::contains_ci;
use crate::utils::http::{create_async_client, is_retryable};

/// Filters understood by the directory endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryQuery {
    /// Free-text search across name, city and region
    pub search: Option<String>,
    pub name: Option<String>,
    pub city: Option<String>,
    /// Candidate cap; zero means unbounded
    pub limit: usize,
}

impl DirectoryQuery {
    pub fn name_and_city(name: &str, city: &str, limit: usize) -> Self {
        Self {
            name: Some(name.to_string()),
            city: Some(city.to_string()),
            limit,
            ..Self::default()
        }
    }

    pub fn name(name: &str, limit: usize) -> Self {
        Self {
            name: Some(name.to_string()),
            limit,
            ..Self::default()
        }
    }

    pub fn city(city: &str, limit: usize) -> Self {
        Self {
            city: Some(city.to_string()),
            limit,
            ..Self::default()
        }
    }

    fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(city) = &self.city {
            pairs.push(("city", city.clone()));
        }
        if let Some(name) = &self.name {
            pairs.push(("name", name.clone()));
        }
        if self.limit > 0 {
            pairs.push(("limit", self.limit.to_string()));
        }
        pairs
    }
}

impl fmt::Display for DirectoryQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self
            .query_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v:?}"))
            .collect();
        write!(f, "[{}]", pairs.join(", "))
    }
}

/// Source of candidate universities.
#[async_trait]
pub trait UniversityDirectory: Send + Sync {
    /// Entries matching `query`, at most `query.limit` of them.
    async fn search(&self, query: &DirectoryQuery) -> Vec<UniversityDirectoryEntry>;
}

/// Envelope returned by `GET /api/universities`.
#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Value,
}

impl DirectoryResponse {
    fn into_entries(self) -> Vec<UniversityDirectoryEntry> {
        if !self.success {
            log::debug!("Directory answered success=false");
            return Vec::new();
        }
        match self.data {
            Value::Array(items) => entries_from_values(items),
            other => {
                log::warn!("Directory data is not an array: {}", type_name(&other));
                Vec::new()
            }
        }
    }
}

fn entries_from_values(items: Vec<Value>) -> Vec<UniversityDirectoryEntry> {
    items
        .into_iter()
        .filter_map(|item| {
            serde_json::from_value(item)
                .map_err(|e| log::debug!("Skipping malformed directory entry: {e}"))
                .ok()
        })
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Directory backed by the platform's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpDirectory {
    client: reqwest::Client,
    endpoint: Url,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpDirectory {
    /// Create a directory client from configuration.
    pub fn new(config: &DirectoryConfig) -> Result<Self> {
        Self::with_client(create_async_client(config)?, config)
    }

    /// Create a directory client around an existing HTTP client.
    pub fn with_client(client: reqwest::Client, config: &DirectoryConfig) -> Result<Self> {
        let endpoint = Url::parse(&format!(
            "{}/api/universities",
            config.base_url.trim_end_matches('/')
        ))?;
        Ok(Self {
            client,
            endpoint,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Full request URL for a query.
    pub fn request_url(&self, query: &DirectoryQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(query.query_pairs());
        url
    }

    /// Fetch candidates, surfacing failures as errors.
    pub async fn fetch(&self, query: &DirectoryQuery) -> Result<Vec<UniversityDirectoryEntry>> {
        let url = self.request_url(query);
        let mut attempt = 0;

        loop {
            let failure = match self.client.get(url.clone()).send().await {
                Ok(response) if response.status().is_success() => {
                    let bytes = response.bytes().await?;
                    let body: DirectoryResponse = serde_json::from_slice(&bytes)?;
                    return Ok(body.into_entries());
                }
                Ok(response) => {
                    let status = response.status();
                    (
                        Some(status),
                        AppError::directory(url.as_str(), format!("unexpected status {status}")),
                    )
                }
                Err(e) => (e.status(), AppError::from(e)),
            };

            let (status, error) = failure;
            if attempt >= self.max_retries || !is_retryable(status) {
                return Err(error);
            }

            attempt += 1;
            log::debug!(
                "Directory request failed ({}), retry {}/{}",
                error,
                attempt,
                self.max_retries
            );
            tokio::time::sleep(self.retry_delay).await;
        }
    }
}

#[async_trait]
impl UniversityDirectory for HttpDirectory {
    async fn search(&self, query: &DirectoryQuery) -> Vec<UniversityDirectoryEntry> {
        match self.fetch(query).await {
            Ok(mut entries) => {
                if query.limit > 0 {
                    entries.truncate(query.limit);
                }
                entries
            }
            Err(e) => {
                log::warn!("Directory lookup {} failed: {}", query, e);
                Vec::new()
            }
        }
    }
}

/// In-memory directory with the same filter semantics as the API.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    entries: Vec<UniversityDirectoryEntry>,
}

impl StaticDirectory {
    pub fn new(entries: Vec<UniversityDirectoryEntry>) -> Self {
        Self { entries }
    }

    /// Load entries from a JSON file holding either a plain array or the
    /// API's `{ "success": ..., "data": [...] }` envelope.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let value: Value = serde_json::from_str(&content)?;
        let entries = match value {
            Value::Array(_) => serde_json::from_value(value)?,
            Value::Object(_) => {
                let response: DirectoryResponse = serde_json::from_value(value)?;
                response.into_entries()
            }
            other => {
                return Err(AppError::validation(format!(
                    "{}: expected an array or an envelope, found {}",
                    path.as_ref().display(),
                    type_name(&other)
                )));
            }
        };
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[UniversityDirectoryEntry] {
        &self.entries
    }

    fn matches(entry: &UniversityDirectoryEntry, query: &DirectoryQuery) -> bool {
        let name_ok = query
            .name
            .as_deref()
            .is_none_or(|name| contains_ci(&entry.name, name));
        let city_ok = query
            .city
            .as_deref()
            .is_none_or(|city| entry.located_in(&city.to_lowercase()));
        let search_ok = query.search.as_deref().is_none_or(|term| {
            contains_ci(&entry.name, term) || entry.located_in(&term.to_lowercase())
        });
        name_ok && city_ok && search_ok
    }
}

#[async_trait]
impl UniversityDirectory for StaticDirectory {
    async fn search(&self, query: &DirectoryQuery) -> Vec<UniversityDirectoryEntry> {
        let limit = if query.limit == 0 {
            usize::MAX
        } else {
            query.limit
        };
        self.entries
            .iter()
            .filter(|entry| Self::matches(entry, query))
            .take(limit)
            .cloned()
            .collect()
    }
}
