//! HTTP transports
//!
//! The fetcher talks to the network through [`HttpTransport`] so tests can
//! script responses without a live server.

use std::time::Duration;

use async_trait::async_trait;

use super::error::{FetchError, FetchResult};

/// A single HTTP GET
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Fetch `url` and return the body of a 2xx response
    async fn get(&self, url: &str) -> FetchResult<String>;
}

/// reqwest-backed transport with a fixed identifying User-Agent
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(user_agent: &str, timeout: Duration) -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> FetchResult<String> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response.text().await?)
    }
}

/// Scripted transport for tests.
///
/// Responses are served per URL in order; once a URL's script runs out its
/// last response repeats.
#[cfg(test)]
pub struct MockTransport {
    scripts: parking_lot::Mutex<std::collections::HashMap<String, Vec<FetchResult<String>>>>,
    calls: parking_lot::Mutex<Vec<String>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self {
            scripts: parking_lot::Mutex::new(std::collections::HashMap::new()),
            calls: parking_lot::Mutex::new(Vec::new()),
        }
    }

    /// Queue a response for `url`
    pub fn respond(&self, url: &str, response: FetchResult<String>) -> &Self {
        self.scripts
            .lock()
            .entry(url.to_string())
            .or_default()
            .push(response);
        self
    }

    pub fn ok(&self, url: &str, body: &str) -> &Self {
        self.respond(url, Ok(body.to_string()))
    }

    pub fn fail(&self, url: &str, status: u16) -> &Self {
        self.respond(
            url,
            Err(FetchError::Status {
                status,
                url: url.to_string(),
            }),
        )
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self, url: &str) -> usize {
        self.calls.lock().iter().filter(|u| u.as_str() == url).count()
    }
}

#[cfg(test)]
fn clone_result(result: &FetchResult<String>) -> FetchResult<String> {
    match result {
        Ok(body) => Ok(body.clone()),
        Err(FetchError::Status { status, url }) => Err(FetchError::Status {
            status: *status,
            url: url.clone(),
        }),
        Err(e) => Err(FetchError::Transport(e.to_string())),
    }
}

#[cfg(test)]
#[async_trait]
impl HttpTransport for MockTransport {
    async fn get(&self, url: &str) -> FetchResult<String> {
        self.calls.lock().push(url.to_string());

        let mut scripts = self.scripts.lock();
        match scripts.get_mut(url) {
            Some(script) if script.len() > 1 => script.remove(0),
            Some(script) if !script.is_empty() => clone_result(&script[0]),
            _ => Err(FetchError::Status {
                status: 404,
                url: url.to_string(),
            }),
        }
    }
}
