//! In-process attribute store.

use std::collections::BTreeMap;

use super::record::{AttributeStore, Record};
use super::{Result, StoreError};

pub(crate) type Windows = BTreeMap<String, BTreeMap<String, Record>>;

/// Attribute store kept entirely in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    windows: Windows,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_windows(windows: Windows) -> Self {
        Self { windows }
    }

    pub(crate) fn as_windows(&self) -> &Windows {
        &self.windows
    }

    /// Drop `window` if it holds no records.
    pub(crate) fn prune_window(&mut self, window: &str) {
        if self.windows.get(window).is_some_and(BTreeMap::is_empty) {
            self.windows.remove(window);
        }
    }
}

impl AttributeStore for MemoryStore {
    fn write_record(&mut self, window: &str, key: &str, record: &Record) -> Result<()> {
        self.windows
            .entry(window.to_string())
            .or_default()
            .insert(key.to_string(), record.clone());
        Ok(())
    }

    fn read_records(&self, window: &str) -> Result<Vec<(String, Record)>> {
        let records = self
            .windows
            .get(window)
            .ok_or_else(|| StoreError::MissingWindow(window.to_string()))?;
        Ok(records
            .iter()
            .map(|(k, r)| (k.clone(), r.clone()))
            .collect())
    }

    fn remove_record(&mut self, window: &str, key: &str) -> Result<bool> {
        Ok(self
            .windows
            .get_mut(window)
            .is_some_and(|records| records.remove(key).is_some()))
    }

    fn record_keys(&self, window: &str) -> Result<Vec<String>> {
        Ok(self
            .windows
            .get(window)
            .map(|records| records.keys().cloned().collect())
            .unwrap_or_default())
    }

    fn windows(&self) -> Result<Vec<String>> {
        Ok(self.windows.keys().cloned().collect())
    }
}
