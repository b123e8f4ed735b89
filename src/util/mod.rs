//! Side collaborators: calculation history and CSV export.

pub mod export;
pub mod history;

pub use export::{export_to_file, read_csv, write_csv, ExportError};
pub use history::{append_record, load_history, CalculationRecord, HistorySaveError};
