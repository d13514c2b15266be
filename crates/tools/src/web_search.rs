//! Web search: instant-answer lookups against DuckDuckGo or Google.
//!
//! Transport sits behind [`SearchBackend`] so tests and offline hosts can
//! swap in canned responses. The backend returns raw JSON; turning it into
//! a one-line summary happens here.

use async_trait::async_trait;
use forgecore_config::ToolsConfig;
use forgecore_core::error::ToolError;
use forgecore_core::tool::SearchEngine;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

/// Reply when a response carries no usable text.
pub const NO_SUMMARY: &str = "No summary found.";

/// Fetches the raw JSON response for a query.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn fetch(&self, engine: SearchEngine, query: &str) -> Result<Value, ToolError>;
}

/// `reqwest`-backed transport.
pub struct HttpSearchBackend {
    client: reqwest::Client,
    duckduckgo_url: String,
    google_url: String,
    google_api_key: Option<String>,
    google_cx: Option<String>,
}

impl HttpSearchBackend {
    pub fn from_config(config: &ToolsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.search_timeout())
            .user_agent(concat!("forgecore/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            duckduckgo_url: config.duckduckgo_url.clone(),
            google_url: config.google_url.clone(),
            google_api_key: config.google_api_key.clone(),
            google_cx: config.google_cx.clone(),
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn fetch(&self, engine: SearchEngine, query: &str) -> Result<Value, ToolError> {
        let request = match engine {
            SearchEngine::DuckDuckGo => self.client.get(&self.duckduckgo_url).query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
            ]),
            SearchEngine::Google => {
                let (Some(key), Some(cx)) = (&self.google_api_key, &self.google_cx) else {
                    return Err(ToolError::Network(
                        "Google search needs an API key and a search engine id".into(),
                    ));
                };
                self.client
                    .get(&self.google_url)
                    .query(&[("key", key.as_str()), ("cx", cx.as_str()), ("q", query)])
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ToolError::Network(format!("HTTP {}", response.status())));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| ToolError::Network(e.to_string()))
    }
}

/// The web search tool.
pub struct WebSearch {
    backend: Arc<dyn SearchBackend>,
    enabled: bool,
}

impl WebSearch {
    pub fn new(backend: Arc<dyn SearchBackend>, enabled: bool) -> Self {
        Self { backend, enabled }
    }

    pub async fn search(&self, engine: SearchEngine, query: &str) -> Result<String, ToolError> {
        if !self.enabled {
            return Err(ToolError::Network("web search is disabled".into()));
        }

        debug!(engine = engine.as_str(), query, "Web search");
        let body = self.backend.fetch(engine, query).await?;

        match engine {
            SearchEngine::DuckDuckGo => Ok(summarize_duckduckgo(&body)),
            SearchEngine::Google => Ok(summarize_google(&body)),
        }
    }
}

fn non_empty_str(v: &Value) -> Option<&str> {
    v.as_str().map(str::trim).filter(|s| !s.is_empty())
}

/// `AbstractText`, else the first related topic, else [`NO_SUMMARY`].
pub fn summarize_duckduckgo(body: &Value) -> String {
    non_empty_str(&body["AbstractText"])
        .or_else(|| non_empty_str(&body["RelatedTopics"][0]["Text"]))
        .unwrap_or(NO_SUMMARY)
        .to_string()
}

/// Snippet of the first result, else [`NO_SUMMARY`].
pub fn summarize_google(body: &Value) -> String {
    non_empty_str(&body["items"][0]["snippet"])
        .unwrap_or(NO_SUMMARY)
        .to_string()
}
