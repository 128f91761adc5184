use std::path::PathBuf;

use irrigation_traits::{HistorySource, IrrigationRecord};

use crate::error::RemoteError;

/// History read from a `date,actual_water,predicted_water` CSV on every call.
///
/// Rows may appear in any order; `list` returns them newest first.
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    path: PathBuf,
}

impl CsvHistorySource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HistorySource for CsvHistorySource {
    fn list(&self) -> Result<Vec<IrrigationRecord>, Box<dyn std::error::Error + Send + Sync>> {
        let mut records = irrigation_config::load_history_csv(&self.path)
            .map_err(|e| RemoteError::History(format!("{e}")))?;
        // stable: same-day rows keep file order
        records.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(records)
    }
}
