//! Application state management

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::diff::DiffService;
use crate::edgar::{EdgarClient, EdgarUrls};
use crate::fetch::{FetchCache, FetchError, Fetcher, GovernorConfig, HttpTransport, RateGovernor, ReqwestTransport, RetryPolicy};

/// Error type for state initialization
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Failed to initialize HTTP client: {0}")]
    HttpClient(#[from] FetchError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    edgar: EdgarClient,
    diff: DiffService,
}

impl AppState {
    /// Create state backed by a real HTTP client
    pub fn new(config: Config) -> Result<Self, StateError> {
        let transport = ReqwestTransport::new(&config.sec.user_agent, config.sec.timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Create state over any transport
    pub fn with_transport(config: Config, transport: Arc<dyn HttpTransport>) -> Self {
        let governor = RateGovernor::new(GovernorConfig {
            global_rate: config.rate.global_per_sec,
            host_rate: config.rate.host_per_sec,
            period: Duration::from_secs(1),
        });
        let fetcher = Fetcher::new(
            FetchCache::new(config.cache.dir.clone()),
            Arc::new(governor),
            transport,
            RetryPolicy::default(),
        );

        let urls = EdgarUrls {
            data_base: config.sec.data_base_url.clone(),
            www_base: config.sec.www_base_url.clone(),
        };
        let edgar = EdgarClient::new(Arc::new(fetcher), urls);
        let diff = DiffService::new(Arc::new(edgar.clone()));

        tracing::debug!(cache_dir = %config.cache.dir.display(), "Application state ready");

        Self {
            inner: Arc::new(AppStateInner { edgar, diff }),
        }
    }

    /// Get the EDGAR client
    pub fn edgar(&self) -> &EdgarClient {
        &self.inner.edgar
    }

    /// Get the diff service
    pub fn diff(&self) -> &DiffService {
        &self.inner.diff
    }
}
