//! Thin asynchronous client for the tariff feed.
//!
//! - Fetches the raw tariff records and builds a [`RateTable`] snapshot.
//! - Maintains a 5-minute in-memory cache with stale and disk fallbacks.
//! - Either hands out a fully built table or fails explicitly; the engine is
//!   never given a partial one.

use std::{
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::domain::{RateTable, RawRecord};
use crate::infra::cache::{load_tariff_snapshot, save_tariff_snapshot, TariffSnapshot};

/// Matches the feed's refresh cadence; tariffs are edited a few times a day
/// at most.
const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
const USER_AGENT: &str = "fulfillment-calculator/1.0.0";

#[derive(Debug, Error)]
pub enum TariffClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tariff feed error: {0}")]
    Api(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

/// A rate table together with where and when it came from.
#[derive(Clone, Debug)]
pub struct CachedTable {
    pub table: RateTable,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl CachedTable {
    fn new(table: RateTable, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            table,
            fetched_at,
            status,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FeedEnvelope {
    status: String,
    #[serde(default)]
    tariffs: Option<Vec<RawRecord>>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Clone)]
pub struct TariffClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<Option<Cached>>>,
    ttl: Duration,
}

impl TariffClient {
    pub fn new(base: &str) -> Result<Self, TariffClientError> {
        let base_url = Url::parse(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Current rate table snapshot: fresh cache if available, otherwise a
    /// feed fetch, otherwise a stale in-memory or on-disk fallback. Fails
    /// only when no table can be produced at all.
    pub async fn get_rate_table(&self) -> Result<CachedTable, TariffClientError> {
        if let Some(payload) = self.cached_table().await {
            debug!("serving in-memory tariff cache");
            return Ok(payload);
        }

        match self.fetch_table().await {
            Ok(table) => {
                let snapshot = TariffSnapshot::new(table.clone());
                if let Err(error) = save_tariff_snapshot(&snapshot) {
                    warn!("failed to save tariff snapshot: {error}");
                }
                Ok(self.store_table(table).await)
            }
            Err(error) => {
                warn!("tariff fetch failed: {error}");
                if let Some(stale) = self.cached_table_stale().await {
                    warn!("falling back to stale in-memory tariffs");
                    return Ok(stale);
                }
                if let Some(snapshot) = load_tariff_snapshot() {
                    warn!(
                        "falling back to disk tariff snapshot (age: {})",
                        snapshot.age_string()
                    );
                    return Ok(CachedTable::new(
                        snapshot.table,
                        SystemTime::UNIX_EPOCH + Duration::from_secs(snapshot.cached_at),
                        CacheStatus::Stale,
                    ));
                }
                Err(error)
            }
        }
    }

    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch_table(&self) -> Result<RateTable, TariffClientError> {
        let mut url = self.base_url.clone();
        let cache_buster = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis().to_string())
            .unwrap_or_default();
        url.query_pairs_mut()
            .append_pair("action", "getTariffs")
            .append_pair("t", &cache_buster);

        debug!("requesting tariffs from {url}");
        let response = self.http.get(url).send().await?.error_for_status()?;
        let envelope: FeedEnvelope = response.json().await?;

        let records = parse_envelope(envelope)?;
        let table = RateTable::from_records(&records);
        if table.is_empty() {
            return Err(TariffClientError::Api(
                "tariff feed returned no usable rows".to_string(),
            ));
        }

        debug!("loaded {} tariff rows", table.row_count());
        Ok(table)
    }

    async fn cached_table(&self) -> Option<CachedTable> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_table_stale(&self) -> Option<CachedTable> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store_table(&self, table: RateTable) -> CachedTable {
        let fetched_at = SystemTime::now();
        let payload = CachedTable::new(table.clone(), fetched_at, CacheStatus::Fresh);
        *self.cache.lock().await = Some(Cached::new(table, fetched_at));
        payload
    }
}

/// Unwrap the feed envelope; anything but a success status with records is
/// an explicit failure.
fn parse_envelope(envelope: FeedEnvelope) -> Result<Vec<RawRecord>, TariffClientError> {
    let FeedEnvelope {
        status,
        tariffs,
        message,
    } = envelope;

    if status.eq_ignore_ascii_case("success") {
        tariffs.ok_or_else(|| TariffClientError::Api("response missing tariffs".to_string()))
    } else {
        Err(TariffClientError::Api(message.unwrap_or(status)))
    }
}

struct Cached {
    table: RateTable,
    fetched_at: SystemTime,
}

impl Cached {
    fn new(table: RateTable, fetched_at: SystemTime) -> Self {
        Self { table, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedTable> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedTable::new(
                self.table.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedTable {
        CachedTable::new(self.table.clone(), self.fetched_at, CacheStatus::Stale)
    }
}
