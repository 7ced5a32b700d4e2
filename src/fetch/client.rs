//! Resilient fetcher
//!
//! The single network entry point. Every fetch consults the cache first; only
//! a miss pays for rate governance, the HTTP round trip and the retry loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};

use super::cache::FetchCache;
use super::error::{FetchError, FetchResult};
use super::governor::{authority, RateGovernor};
use super::retry::RetryPolicy;
use super::transport::HttpTransport;

/// Cached, rate-governed, retrying fetcher
pub struct Fetcher {
    cache: FetchCache,
    governor: Arc<RateGovernor>,
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl Fetcher {
    pub fn new(
        cache: FetchCache,
        governor: Arc<RateGovernor>,
        transport: Arc<dyn HttpTransport>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            cache,
            governor,
            transport,
            retry,
        }
    }

    pub fn cache(&self) -> &FetchCache {
        &self.cache
    }

    pub fn governor(&self) -> &RateGovernor {
        &self.governor
    }

    /// Fetch and parse a JSON document
    pub async fn fetch_json(&self, url: &str, cache_key: &str, ttl: Duration) -> FetchResult<Value> {
        self.fetch_with(url, cache_key, ttl, |body| {
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(format!("{}: {}", url, e)))
        })
        .await
    }

    /// Fetch a text document (HTML or plain text), cached as a JSON string
    pub async fn fetch_text(&self, url: &str, cache_key: &str, ttl: Duration) -> FetchResult<String> {
        match self.fetch_with(url, cache_key, ttl, |body| Ok(Value::String(body))).await? {
            Value::String(text) => Ok(text),
            other => Err(FetchError::Parse(format!(
                "expected text payload for {}, found {}",
                url,
                json_kind(&other)
            ))),
        }
    }

    async fn fetch_with<P>(&self, url: &str, cache_key: &str, ttl: Duration, parse: P) -> FetchResult<Value>
    where
        P: Fn(String) -> FetchResult<Value>,
    {
        let params = json!({ "url": url });

        if let Some(cached) = self.cache.get(cache_key, &params, ttl).await {
            tracing::debug!(url = %url, cache_key = %cache_key, "Cache hit");
            return Ok(cached);
        }
        tracing::debug!(url = %url, cache_key = %cache_key, "Cache miss");

        let host = authority(url)?;

        self.retry
            .run(|attempt| {
                let host = &host;
                let params = &params;
                let parse = &parse;
                async move {
                    let body = {
                        let _permit = self.governor.acquire(host).await;
                        tracing::debug!(url = %url, attempt = attempt, "GET");
                        self.transport.get(url).await?
                    };

                    let data = parse(body)?;
                    self.cache.set(cache_key, params, &data).await?;
                    Ok::<_, FetchError>(data)
                }
            })
            .await
            .map_err(|(attempts, last)| {
                tracing::error!(url = %url, attempts = attempts, error = %last, "Fetch failed");
                FetchError::Exhausted {
                    attempts,
                    last: Box::new(last),
                }
            })
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
