//! External collaborators: the tariff feed client and its disk cache.

pub mod cache;
pub mod tariff_client;

pub use cache::{load_tariff_snapshot, save_tariff_snapshot, TariffSnapshot, TARIFF_CACHE_TTL};
pub use tariff_client::{CacheStatus, CachedTable, TariffClient, TariffClientError};
