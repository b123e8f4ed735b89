//! Fire-and-forget log of past calculations.
//!
//! Each successful calculation may be appended as one record; callers log a
//! failed save and move on, a calculation never depends on it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::{CalculationResult, OrderRequest};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "FulfillmentCalculator";
const APP_NAME: &str = "FulfillmentCalculator";

/// One persisted calculation: the inputs plus the computed total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalculationRecord {
    pub id: String,
    /// RFC 3339 timestamp of when the calculation ran.
    pub calculated_at: String,
    pub request: OrderRequest,
    pub grand_total: f64,
    pub currency_symbol: String,
}

impl CalculationRecord {
    pub fn new(request: &OrderRequest, result: &CalculationResult) -> CalculationRecord {
        let calculated_at = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();
        CalculationRecord {
            id: Uuid::new_v4().to_string(),
            calculated_at,
            request: request.clone(),
            grand_total: result.grand_total,
            currency_symbol: result.currency_symbol.to_string(),
        }
    }
}

fn history_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("history.json"))
}

/// Load the saved history, newest record last. Absent or unreadable history
/// is simply `None`.
pub fn load_history() -> Option<Vec<CalculationRecord>> {
    load_history_from(&history_file()?)
}

fn load_history_from(path: &Path) -> Option<Vec<CalculationRecord>> {
    let data = fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Append one record to the history file.
pub fn append_record(record: &CalculationRecord) -> Result<(), HistorySaveError> {
    let path = history_file().ok_or(HistorySaveError::StorageUnavailable)?;
    append_record_to(&path, record)
}

fn append_record_to(path: &Path, record: &CalculationRecord) -> Result<(), HistorySaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut records = load_history_from(path).unwrap_or_default();
    records.push(record.clone());
    let json = serde_json::to_string_pretty(&records)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HistorySaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}
