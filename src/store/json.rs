//! JSON document attribute store.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::memory::{MemoryStore, Windows};
use super::record::{AttributeStore, Record};
use super::{Result, StoreError};

const FORMAT_VERSION: &str = "1";

#[derive(Debug, Deserialize)]
struct Document {
    #[serde(default)]
    format_version: String,
    #[serde(default)]
    windows: Windows,
}

/// Attribute store backed by a single JSON file.
///
/// Every mutation rewrites the document to a sibling temporary file and renames
/// it over the original, so a failed write leaves the previous document intact.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Open `path`, or start an empty store there if it does not exist yet.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = match fs::read_to_string(&path) {
            Ok(text) => {
                let doc: Document = serde_json::from_str(&text)?;
                if doc.format_version != FORMAT_VERSION {
                    log::warn!(
                        "{} has format version {:?}, expected {FORMAT_VERSION}",
                        path.display(),
                        doc.format_version
                    );
                }
                MemoryStore::from_windows(doc.windows)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MemoryStore::new(),
            Err(e) => return Err(StoreError::from_io(&path, e)),
        };
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn commit(&self) -> Result<()> {
        let doc = DocumentRef {
            format_version: FORMAT_VERSION,
            windows: self.inner.as_windows(),
        };
        let bytes = serde_json::to_vec_pretty(&doc)?;

        let mut tmp_name = self.path.file_name().unwrap_or_default().to_os_string();
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        fs::write(&tmp_path, bytes).map_err(|e| StoreError::from_io(&tmp_path, e))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            StoreError::from_io(&self.path, e)
        })
    }
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    format_version: &'a str,
    windows: &'a Windows,
}

impl AttributeStore for JsonFileStore {
    fn write_record(&mut self, window: &str, key: &str, record: &Record) -> Result<()> {
        let previous = self.inner.as_windows().get(window).and_then(|w| w.get(key)).cloned();
        self.inner.write_record(window, key, record)?;
        if let Err(e) = self.commit() {
            // Keep memory in step with disk.
            match previous {
                Some(old) => self.inner.write_record(window, key, &old)?,
                None => {
                    self.inner.remove_record(window, key)?;
                    self.inner.prune_window(window);
                }
            }
            return Err(e);
        }
        Ok(())
    }

    fn read_records(&self, window: &str) -> Result<Vec<(String, Record)>> {
        self.inner.read_records(window)
    }

    fn remove_record(&mut self, window: &str, key: &str) -> Result<bool> {
        let previous = self.inner.as_windows().get(window).and_then(|w| w.get(key)).cloned();
        let Some(old) = previous else {
            return Ok(false);
        };
        self.inner.remove_record(window, key)?;
        if let Err(e) = self.commit() {
            self.inner.write_record(window, key, &old)?;
            return Err(e);
        }
        Ok(true)
    }

    fn record_keys(&self, window: &str) -> Result<Vec<String>> {
        self.inner.record_keys(window)
    }

    fn windows(&self) -> Result<Vec<String>> {
        self.inner.windows()
    }
}
