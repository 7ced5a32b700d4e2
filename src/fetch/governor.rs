//! Rate governor
//!
//! Bounds outbound requests with two scopes that every call must hold: one
//! global scope and one scope per remote host. Each scope caps concurrency
//! with a semaphore and throughput with a sliding window of admission
//! timestamps. Acquisition only ever waits; it never fails.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

use super::error::{FetchError, FetchResult};

/// Governor configuration
#[derive(Debug, Clone)]
pub struct GovernorConfig {
    /// Admissions per period across all hosts
    pub global_rate: usize,
    /// Admissions per period for any single host
    pub host_rate: usize,
    /// Window length
    pub period: Duration,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        // SEC fair-use guidance is 10 requests per second; stay under it
        Self {
            global_rate: 8,
            host_rate: 2,
            period: Duration::from_secs(1),
        }
    }
}

/// One independently bounded domain (global, or a single host)
struct Scope {
    name: String,
    max_rate: usize,
    period: Duration,
    permits: Arc<Semaphore>,
    admissions: Mutex<VecDeque<Instant>>,
}

impl Scope {
    fn new(name: impl Into<String>, rate: usize, period: Duration) -> Self {
        let max_rate = rate.max(1);
        Self {
            name: name.into(),
            max_rate,
            period,
            permits: Arc::new(Semaphore::new(max_rate)),
            admissions: Mutex::new(VecDeque::with_capacity(max_rate)),
        }
    }

    async fn acquire(&self) -> ScopePermit {
        // The semaphore is never closed, so an error here cannot happen in
        // practice; fall back to window-only limiting if it ever does.
        let permit = self.permits.clone().acquire_owned().await.ok();

        loop {
            let wait = {
                let mut admissions = self.admissions.lock();
                let now = Instant::now();
                while let Some(&oldest) = admissions.front() {
                    if now.saturating_duration_since(oldest) >= self.period {
                        admissions.pop_front();
                    } else {
                        break;
                    }
                }

                if admissions.len() < self.max_rate {
                    admissions.push_back(now);
                    None
                } else {
                    admissions
                        .front()
                        .map(|&oldest| (oldest + self.period).saturating_duration_since(now))
                }
            };

            match wait {
                None => break,
                Some(delay) => {
                    tracing::trace!(scope = %self.name, delay_ms = delay.as_millis() as u64, "Rate window full, waiting");
                    tokio::time::sleep(delay).await;
                }
            }
        }

        ScopePermit { _permit: permit }
    }
}

/// Held slot in one scope; released on drop
struct ScopePermit {
    _permit: Option<OwnedSemaphorePermit>,
}

/// Both scopes for one outbound call.
///
/// Fields drop in declaration order, so the host scope is released before
/// the global one (reverse of acquisition).
pub struct GovernorPermit {
    _host: ScopePermit,
    _global: ScopePermit,
}

/// Process-wide rate governor
pub struct RateGovernor {
    config: GovernorConfig,
    global: Scope,
    hosts: Mutex<HashMap<String, Arc<Scope>>>,
}

impl Default for RateGovernor {
    fn default() -> Self {
        Self::new(GovernorConfig::default())
    }
}

impl RateGovernor {
    pub fn new(config: GovernorConfig) -> Self {
        Self {
            global: Scope::new("global", config.global_rate, config.period),
            hosts: Mutex::new(HashMap::new()),
            config,
        }
    }

    /// Wait for the global scope, then the host scope
    pub async fn acquire(&self, host: &str) -> GovernorPermit {
        let global = self.global.acquire().await;
        let host_scope = self.host_scope(host);
        let host = host_scope.acquire().await;

        GovernorPermit {
            _host: host,
            _global: global,
        }
    }

    /// Host scopes are created on first use and kept for the process lifetime
    fn host_scope(&self, host: &str) -> Arc<Scope> {
        let mut hosts = self.hosts.lock();
        hosts
            .entry(host.to_string())
            .or_insert_with(|| {
                tracing::debug!(host = %host, rate = self.config.host_rate, "Creating host rate scope");
                Arc::new(Scope::new(host, self.config.host_rate, self.config.period))
            })
            .clone()
    }

    /// Number of host scopes created so far
    pub fn host_count(&self) -> usize {
        self.hosts.lock().len()
    }

    /// Free concurrency slots in the global scope
    pub fn global_available(&self) -> usize {
        self.global.permits.available_permits()
    }
}

/// Authority (`host[:port]`) of a URL, used to select the host scope
pub fn authority(url: &str) -> FetchResult<String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| FetchError::InvalidUrl(format!("{}: {}", url, e)))?;
    let host = parsed
        .host_str()
        .ok_or_else(|| FetchError::InvalidUrl(format!("{} has no host", url)))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn governor(global_rate: usize, host_rate: usize) -> RateGovernor {
        RateGovernor::new(GovernorConfig {
            global_rate,
            host_rate,
            period: Duration::from_secs(1),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_bounds_admissions() {
        let governor = governor(2, 10);
        let start = Instant::now();

        drop(governor.acquire("data.sec.gov").await);
        drop(governor.acquire("www.sec.gov").await);
        assert!(start.elapsed() < Duration::from_millis(1));

        // Third admission has to wait for the first to leave the window
        drop(governor.acquire("data.sec.gov").await);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_host_scope_limits_single_host() {
        let governor = governor(10, 1);
        let start = Instant::now();

        drop(governor.acquire("data.sec.gov").await);
        drop(governor.acquire("www.sec.gov").await);
        assert!(start.elapsed() < Duration::from_millis(1));

        drop(governor.acquire("data.sec.gov").await);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_permit_released_on_drop() {
        let governor = governor(4, 4);

        let permit = governor.acquire("data.sec.gov").await;
        assert_eq!(governor.global_available(), 3);

        drop(permit);
        assert_eq!(governor.global_available(), 4);
    }

    #[tokio::test]
    async fn test_permit_released_on_error_path() {
        let governor = governor(4, 4);

        async fn failing_call(governor: &RateGovernor) -> Result<(), String> {
            let _permit = governor.acquire("data.sec.gov").await;
            Err("boom".to_string())
        }

        assert!(failing_call(&governor).await.is_err());
        assert_eq!(governor.global_available(), 4);
    }

    #[tokio::test]
    async fn test_host_scopes_created_lazily() {
        let governor = governor(8, 2);
        assert_eq!(governor.host_count(), 0);

        drop(governor.acquire("data.sec.gov").await);
        drop(governor.acquire("data.sec.gov").await);
        assert_eq!(governor.host_count(), 1);

        drop(governor.acquire("www.sec.gov").await);
        assert_eq!(governor.host_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_acquire_respects_window() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let period = Duration::from_millis(250);
        let governor = Arc::new(RateGovernor::new(GovernorConfig {
            global_rate: 3,
            host_rate: 10,
            period,
        }));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..12)
            .map(|i| {
                let governor = governor.clone();
                let in_flight = in_flight.clone();
                let peak = peak.clone();
                tokio::spawn(async move {
                    let host = if i % 2 == 0 { "data.sec.gov" } else { "www.sec.gov" };
                    let _permit = governor.acquire(host).await;
                    let admitted = Instant::now();
                    let now_in_flight = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now_in_flight, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    in_flight.fetch_sub(1, Ordering::SeqCst);
                    admitted
                })
            })
            .collect();

        let mut admissions = Vec::new();
        for task in tasks {
            admissions.push(task.await.unwrap());
        }
        admissions.sort();

        assert!(peak.load(Ordering::SeqCst) <= 3);
        // Any four consecutive admissions span at least one window
        let slack = Duration::from_millis(25);
        for window in admissions.windows(4) {
            assert!(window[3] - window[0] + slack >= period, "{:?}", window);
        }
        assert_eq!(governor.global_available(), 3);
    }

    #[test]
    fn test_authority() {
        assert_eq!(
            authority("https://data.sec.gov/submissions/CIK0000320193.json").unwrap(),
            "data.sec.gov"
        );
        assert_eq!(authority("http://localhost:8080/x").unwrap(), "localhost:8080");
        assert!(matches!(authority("not a url"), Err(FetchError::InvalidUrl(_))));
    }
}
