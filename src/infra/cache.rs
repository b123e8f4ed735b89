//! Persistent on-disk snapshot of the last successfully loaded rate table.
//!
//! Used as the final fallback when the tariff feed and the in-memory cache
//! are both unavailable, so a previously seen table can still price orders.

use std::{
    fs,
    path::PathBuf,
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::RateTable;

const CACHE_FILENAME: &str = "tariff_cache.json";

/// Snapshot TTL: 24 hours. Tariffs change rarely, but a quote against a
/// week-old sheet would be misleading.
pub const TARIFF_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A rate table snapshot with its capture time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TariffSnapshot {
    /// Unix timestamp (seconds) when this snapshot was taken.
    pub cached_at: u64,
    pub table: RateTable,
}

impl TariffSnapshot {
    pub fn new(table: RateTable) -> Self {
        let cached_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self { cached_at, table }
    }

    pub fn is_expired(&self) -> bool {
        self.age() > TARIFF_CACHE_TTL
    }

    pub fn age(&self) -> Duration {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Duration::from_secs(now.saturating_sub(self.cached_at))
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        let secs = self.age().as_secs();
        if secs < 60 {
            format!("{secs}s")
        } else if secs < 3600 {
            format!("{}m", secs / 60)
        } else if secs < 86400 {
            format!("{}h", secs / 3600)
        } else {
            format!("{}d", secs / 86400)
        }
    }
}

/// Snapshot file path in the local data directory.
fn cache_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fulfillment-calculator");
        let _ = fs::create_dir_all(&base);
        base.join(CACHE_FILENAME)
    })
    .clone()
}

/// Load the tariff snapshot from disk, if present and not expired.
pub fn load_tariff_snapshot() -> Option<TariffSnapshot> {
    let path = cache_path();

    if !path.exists() {
        debug!("no tariff snapshot at {}", path.display());
        return None;
    }

    match fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<TariffSnapshot>(&content) {
            Ok(snapshot) => {
                if snapshot.is_expired() {
                    debug!("tariff snapshot expired (age: {})", snapshot.age_string());
                    return None;
                }
                debug!(
                    "loaded tariff snapshot with {} rows (age: {})",
                    snapshot.table.row_count(),
                    snapshot.age_string()
                );
                Some(snapshot)
            }
            Err(error) => {
                warn!("failed to parse tariff snapshot: {error}");
                None
            }
        },
        Err(error) => {
            warn!("failed to read tariff snapshot: {error}");
            None
        }
    }
}

/// Save a tariff snapshot to disk.
pub fn save_tariff_snapshot(snapshot: &TariffSnapshot) -> Result<(), std::io::Error> {
    let path = cache_path();
    let content = serde_json::to_string(snapshot)?;
    fs::write(&path, content)?;
    debug!(
        "saved tariff snapshot ({} rows) to {}",
        snapshot.table.row_count(),
        path.display()
    );
    Ok(())
}
