//! Fetch cache
//!
//! Content-addressed, TTL-bounded store on the local filesystem. Each record
//! lives in its own file named by the SHA-256 fingerprint of the operation
//! name and its canonicalized parameters; there is no index.
//!
//! Reads fail soft: a missing, unreadable, malformed or expired record is
//! simply absent. Stale records are never deleted, only overwritten by the
//! next successful fetch for the same key.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use super::clock::{Clock, SystemClock};
use super::error::{FetchError, FetchResult};

/// On-disk record layout
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord<T> {
    ts: DateTime<Utc>,
    data: T,
}

/// Persistent fetch cache
#[derive(Clone)]
pub struct FetchCache {
    base_dir: PathBuf,
    clock: Arc<dyn Clock>,
}

impl FetchCache {
    /// Create a cache rooted at `base_dir`, using the system clock
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self::with_clock(base_dir, Arc::new(SystemClock))
    }

    /// Create a cache with a custom clock
    pub fn with_clock(base_dir: impl Into<PathBuf>, clock: Arc<dyn Clock>) -> Self {
        Self {
            base_dir: base_dir.into(),
            clock,
        }
    }

    /// Fingerprint of an operation name plus its parameters.
    ///
    /// Object keys are sorted recursively before hashing, so parameter maps
    /// that differ only in insertion order share a key.
    pub fn fingerprint(name: &str, params: &Value) -> String {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        hasher.update(canonical_json(params).to_string().as_bytes());
        hex::encode(hasher.finalize())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(key)
    }

    /// Look up a payload no older than `ttl`
    pub async fn get(&self, name: &str, params: &Value, ttl: Duration) -> Option<Value> {
        let key = Self::fingerprint(name, params);
        let raw = tokio::fs::read(self.entry_path(&key)).await.ok()?;

        let record: CacheRecord<Value> = match serde_json::from_slice(&raw) {
            Ok(record) => record,
            Err(e) => {
                tracing::debug!(name = %name, key = %key, error = %e, "Ignoring malformed cache record");
                return None;
            }
        };

        // A timestamp in the future counts as age zero
        let age = (self.clock.now() - record.ts).to_std().unwrap_or_default();
        if age > ttl {
            tracing::debug!(name = %name, key = %key, age_secs = age.as_secs(), "Cache entry expired");
            return None;
        }

        Some(record.data)
    }

    /// Write (or overwrite) the payload for `name` + `params`
    pub async fn set(&self, name: &str, params: &Value, data: &Value) -> FetchResult<()> {
        let key = Self::fingerprint(name, params);

        tokio::fs::create_dir_all(&self.base_dir)
            .await
            .map_err(|e| FetchError::CacheWrite(e.to_string()))?;

        let record = CacheRecord {
            ts: self.clock.now(),
            data,
        };
        let bytes = serde_json::to_vec(&record).map_err(|e| FetchError::CacheWrite(e.to_string()))?;

        tokio::fs::write(self.entry_path(&key), bytes)
            .await
            .map_err(|e| FetchError::CacheWrite(e.to_string()))?;

        tracing::debug!(name = %name, key = %key, "Cache entry written");
        Ok(())
    }
}

/// Rebuild a JSON value with every object's keys in sorted order
fn canonical_json(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonical_json(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonical_json).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::clock::MockClock;
    use serde_json::{json, Map};
    use tempfile::TempDir;

    fn cache_with_clock(dir: &TempDir) -> (FetchCache, Arc<MockClock>) {
        let clock = Arc::new(MockClock::new(Utc::now()));
        let cache = FetchCache::with_clock(dir.path().join("cache"), clock.clone());
        (cache, clock)
    }

    #[tokio::test]
    async fn test_set_then_get_returns_payload() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FetchCache::new(temp_dir.path());
        let params = json!({"url": "https://data.sec.gov/submissions/CIK0000320193.json"});
        let data = json!({"cik": "320193", "filings": {"recent": {"form": ["10-K", "10-Q"]}}, "n": 1.5});

        cache.set("subs_0000320193", &params, &data).await.unwrap();
        let cached = cache.get("subs_0000320193", &params, Duration::from_secs(60)).await;

        assert_eq!(cached, Some(data));
    }

    #[tokio::test]
    async fn test_missing_entry_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FetchCache::new(temp_dir.path());

        let cached = cache.get("nothing", &json!({}), Duration::from_secs(60)).await;
        assert!(cached.is_none());
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let mut first = Map::new();
        first.insert("url".to_string(), json!("https://www.sec.gov/a"));
        first.insert("form".to_string(), json!("10-K"));
        first.insert("nested".to_string(), json!({"b": 2, "a": 1}));

        let mut second = Map::new();
        second.insert("nested".to_string(), json!({"a": 1, "b": 2}));
        second.insert("form".to_string(), json!("10-K"));
        second.insert("url".to_string(), json!("https://www.sec.gov/a"));

        assert_eq!(
            FetchCache::fingerprint("op", &Value::Object(first)),
            FetchCache::fingerprint("op", &Value::Object(second))
        );
    }

    #[test]
    fn test_fingerprint_depends_on_name_and_params() {
        let params = json!({"url": "https://www.sec.gov/a"});
        let key = FetchCache::fingerprint("op", &params);

        assert_eq!(key.len(), 64);
        assert_ne!(key, FetchCache::fingerprint("other", &params));
        assert_ne!(key, FetchCache::fingerprint("op", &json!({"url": "https://www.sec.gov/b"})));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, clock) = cache_with_clock(&temp_dir);
        let params = json!({"url": "https://www.sec.gov/files/company_tickers.json"});
        let ttl = Duration::from_secs(100);

        cache.set("company_tickers", &params, &json!([1, 2, 3])).await.unwrap();

        clock.advance(chrono::Duration::seconds(99));
        assert_eq!(cache.get("company_tickers", &params, ttl).await, Some(json!([1, 2, 3])));

        clock.advance(chrono::Duration::seconds(2));
        assert!(cache.get("company_tickers", &params, ttl).await.is_none());
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_entry() {
        let temp_dir = TempDir::new().unwrap();
        let (cache, clock) = cache_with_clock(&temp_dir);
        let params = json!({"url": "u"});
        let ttl = Duration::from_secs(10);

        cache.set("op", &params, &json!("old")).await.unwrap();
        clock.advance(chrono::Duration::seconds(20));
        assert!(cache.get("op", &params, ttl).await.is_none());

        cache.set("op", &params, &json!("new")).await.unwrap();
        assert_eq!(cache.get("op", &params, ttl).await, Some(json!("new")));
    }

    #[tokio::test]
    async fn test_malformed_record_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = FetchCache::new(temp_dir.path());
        let params = json!({"url": "u"});
        let key = FetchCache::fingerprint("op", &params);

        tokio::fs::write(temp_dir.path().join(key), b"{not json").await.unwrap();

        assert!(cache.get("op", &params, Duration::from_secs(60)).await.is_none());
    }
}
