//! Calculation history persisted under a single storage key.
//!
//! The whole history is one JSON array. Appends rewrite the array, reads
//! never fail (missing or corrupt data reads as an empty history, a bad
//! row is skipped), and viewers collapse duplicate timestamps before
//! showing newest first.

use crate::storage::{FileStore, KeyValueStore};
use crate::{BmiResult, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;

/// Storage key holding the serialized history
pub const HISTORY_KEY: &str = "bmi_calculation_history";

/// Append-only history of calculations
pub struct HistoryStore<S> {
    store: S,
    key: String,
}

impl HistoryStore<FileStore> {
    /// Open the file-backed history kept in `data_dir`
    pub fn open(data_dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self::with_key(FileStore::new(data_dir), key)
    }
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, HISTORY_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Add a result as the newest entry
    ///
    /// On error nothing was written. Stored rows are carried over as-is,
    /// including ones this build can't decode. A payload that isn't a JSON
    /// array at all is replaced by a history holding only `result`.
    pub fn append(&self, result: &BmiResult) -> Result<()> {
        let entry = serde_json::to_value(result)?;
        self.store.update(&self.key, |current| {
            let mut rows = current.as_deref().map(decode_rows).unwrap_or_default();
            rows.push(entry);
            Ok(serde_json::to_string(&rows)?)
        })?;

        tracing::debug!(
            "Appended calculation {} to history '{}'",
            result.timestamp(),
            self.key
        );
        Ok(())
    }

    /// All stored results in insertion order
    pub fn read_all(&self) -> Vec<BmiResult> {
        match self.store.get(&self.key) {
            Ok(Some(text)) => decode_history(&text),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!("Unable to read history '{}': {}. Treating as empty.", self.key, e);
                Vec::new()
            }
        }
    }

    /// Erase the whole history
    pub fn clear(&self) -> Result<()> {
        self.store.remove(&self.key)?;
        tracing::info!("Cleared history '{}'", self.key);
        Ok(())
    }

    /// De-duplicated history, newest first
    pub fn recent(&self) -> Vec<BmiResult> {
        newest_first(self.read_all())
    }

    /// Look up a result by its timestamp key
    pub fn find(&self, timestamp: &str) -> Option<BmiResult> {
        dedup_by_timestamp(self.read_all())
            .into_iter()
            .find(|r| r.timestamp() == timestamp)
    }
}

/// Split the stored array into raw rows; anything else reads as empty
fn decode_rows(text: &str) -> Vec<Value> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    match serde_json::from_str::<Vec<Value>>(text) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("Failed to parse stored history: {}. Treating as empty.", e);
            Vec::new()
        }
    }
}

fn decode_history(text: &str) -> Vec<BmiResult> {
    let mut history = Vec::new();

    for (index, row) in decode_rows(text).into_iter().enumerate() {
        match serde_json::from_value::<BmiResult>(row) {
            Ok(result) => history.push(result),
            Err(e) => {
                tracing::warn!("Failed to parse history entry {}: {}", index, e);
                // Continue reading, don't fail completely
            }
        }
    }

    tracing::debug!("Decoded {} history entries", history.len());
    history
}

/// Collapse entries sharing a timestamp
///
/// Each key keeps the slot of its first occurrence but the value of its
/// last, so a re-written record replaces the earlier one in place.
pub fn dedup_by_timestamp(records: Vec<BmiResult>) -> Vec<BmiResult> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<BmiResult> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(record.timestamp()) {
            Some(&slot) => unique[slot] = record,
            None => {
                index.insert(record.timestamp().to_string(), unique.len());
                unique.push(record);
            }
        }
    }

    unique
}

/// Presentation order: de-duplicated, most recent first
pub fn newest_first(records: Vec<BmiResult>) -> Vec<BmiResult> {
    let mut unique = dedup_by_timestamp(records);
    unique.reverse();
    unique
}
