//! Azure AI Search backend.
//!
//! `POST https://{service}.search.windows.net/indexes/{index}/docs/search`

use super::{SearchBackend, SearchQuery};
use askdocs_core::config::SearchConfig;
use askdocs_core::{AppError, AppResult};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AzureSearchRequest<'a> {
    search: &'a str,
    query_type: &'static str,
    semantic_configuration: &'a str,
    top: usize,
    select: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    vector_queries: Vec<AzureVectorQuery<'a>>,
}

#[derive(Debug, Serialize)]
struct AzureVectorQuery<'a> {
    kind: &'static str,
    vector: &'a [f32],
    k: usize,
    fields: &'a str,
}

/// Azure AI Search client bound to one index.
#[derive(Debug, Clone)]
pub struct AzureSearchBackend {
    client: Client,
    endpoint: String,
    index_name: String,
    query_key: String,
    api_version: String,
}

impl AzureSearchBackend {
    /// Create a backend from the `search` configuration section.
    ///
    /// `serviceName` is either a bare service name or a full endpoint URL.
    pub fn new(config: &SearchConfig) -> AppResult<Self> {
        let query_key = config.query_key.clone().ok_or_else(|| {
            AppError::Config("Azure AI Search requires a query key".to_string())
        })?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AppError::Search(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: service_endpoint(&config.service_name),
            index_name: config.index_name.clone(),
            query_key,
            api_version: config.api_version.clone(),
        })
    }

    fn search_url(&self) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            self.endpoint, self.index_name, self.api_version
        )
    }

    fn to_azure_request(query: &SearchQuery) -> AzureSearchRequest<'_> {
        AzureSearchRequest {
            search: &query.text,
            query_type: "semantic",
            semantic_configuration: &query.semantic_configuration,
            top: query.top,
            select: query.select.join(","),
            vector_queries: query
                .vector
                .iter()
                .map(|v| AzureVectorQuery {
                    kind: "vector",
                    vector: &v.vector,
                    k: v.k,
                    fields: &v.fields,
                })
                .collect(),
        }
    }
}

fn service_endpoint(service_name: &str) -> String {
    let service_name = service_name.trim().trim_end_matches('/');
    if service_name.starts_with("http://") || service_name.starts_with("https://") {
        service_name.to_string()
    } else {
        format!("https://{}.search.windows.net", service_name)
    }
}

#[async_trait::async_trait]
impl SearchBackend for AzureSearchBackend {
    fn provider_name(&self) -> &str {
        "azure"
    }

    fn index_name(&self) -> &str {
        &self.index_name
    }

    #[instrument(skip(self, query), fields(index = %self.index_name, vector = query.vector.is_some()))]
    async fn search(&self, query: &SearchQuery) -> AppResult<Value> {
        let url = self.search_url();
        debug!("Sending search request to {}", url);

        let response = self
            .client
            .post(&url)
            .header("api-key", &self.query_key)
            .json(&Self::to_azure_request(query))
            .send()
            .await
            .map_err(|e| AppError::Search(format!("Failed to send search request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Azure AI Search returned {}: {}", status, body);
            return Err(AppError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("Failed to parse search response: {}", e)))
    }
}
