//! Fetch layer
//!
//! - `cache`: TTL-bounded persistent store keyed by operation fingerprint
//! - `governor`: global and per-host rate scopes
//! - `retry`: bounded retry with injectable backoff
//! - `transport`: the HTTP seam
//! - `client`: the resilient fetcher composing all of the above

mod cache;
mod client;
mod clock;
mod error;
mod governor;
mod retry;
mod transport;

pub use cache::FetchCache;
pub use client::Fetcher;
pub use clock::{Clock, SystemClock};
pub use error::{FetchError, FetchResult};
pub use governor::{authority, GovernorConfig, GovernorPermit, RateGovernor};
pub use retry::{BackoffFn, RetryPolicy};
pub use transport::{HttpTransport, ReqwestTransport};

#[cfg(test)]
pub(crate) use transport::MockTransport;
