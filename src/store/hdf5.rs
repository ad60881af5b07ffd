//! HDF5 attribute store: one group per window, one sub-group per event record.

use std::path::{Path, PathBuf};

use hdf5::{File, Group};

use super::record::{AttrValue, AttributeStore, Record};
use super::{Result, StoreError};

/// Attribute store backed by an HDF5 file.
pub struct Hdf5Store {
    path: PathBuf,
    file: File,
}

impl Hdf5Store {
    /// Open `path` for reading and writing, creating it if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = if path.exists() {
            File::open_rw(&path)?
        } else {
            File::create(&path)?
        };
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn window_group(&self, window: &str) -> Option<Group> {
        if self.file.link_exists(window) {
            self.file.group(window).ok()
        } else {
            None
        }
    }
}

impl AttributeStore for Hdf5Store {
    fn write_record(&mut self, window: &str, key: &str, record: &Record) -> Result<()> {
        let (group, created) = match self.window_group(window) {
            Some(group) => (group, false),
            None => (self.file.create_group(window)?, true),
        };

        // Build the record under a hidden name; it replaces `key` only once complete.
        let staging = staging_name(key);
        if group.link_exists(&staging) {
            group.unlink(&staging)?;
        }
        let staged = group.create_group(&staging)?;
        let written = record
            .iter()
            .try_for_each(|(name, value)| write_attr(&staged, name, value));
        if let Err(e) = written {
            let _ = group.unlink(&staging);
            if created {
                let _ = self.file.unlink(window);
            }
            return Err(e);
        }

        if group.link_exists(key) {
            group.unlink(key)?;
        }
        group.relink(&staging, key)?;
        self.file.flush()?;
        Ok(())
    }

    fn read_records(&self, window: &str) -> Result<Vec<(String, Record)>> {
        let group = self
            .window_group(window)
            .ok_or_else(|| StoreError::MissingWindow(window.to_string()))?;
        let mut records = Vec::new();
        for key in record_names(&group)? {
            let member = group.group(&key)?;
            let mut record = Record::new();
            for name in member.attr_names()? {
                record.insert(name.clone(), read_attr(&member, &name)?);
            }
            records.push((key, record));
        }
        Ok(records)
    }

    fn remove_record(&mut self, window: &str, key: &str) -> Result<bool> {
        let Some(group) = self.window_group(window) else {
            return Ok(false);
        };
        if !group.link_exists(key) {
            return Ok(false);
        }
        group.unlink(key)?;
        self.file.flush()?;
        Ok(true)
    }

    fn record_keys(&self, window: &str) -> Result<Vec<String>> {
        match self.window_group(window) {
            Some(group) => record_names(&group),
            None => Ok(Vec::new()),
        }
    }

    fn windows(&self) -> Result<Vec<String>> {
        Ok(self.file.member_names()?)
    }
}

fn staging_name(key: &str) -> String {
    format!(".{key}.tmp")
}

/// Committed record names; staging groups left by an interrupted write are skipped.
fn record_names(group: &Group) -> Result<Vec<String>> {
    Ok(group
        .member_names()?
        .into_iter()
        .filter(|name| !name.starts_with('.'))
        .collect())
}

fn write_attr(group: &Group, name: &str, value: &AttrValue) -> Result<()> {
    match value {
        AttrValue::Scalar(v) => {
            group.new_attr::<f64>().create(name)?.write_scalar(v)?;
        }
        AttrValue::Array(values) => {
            group
                .new_attr::<f64>()
                .shape((values.len(),))
                .create(name)?
                .write_raw(values.as_slice())?;
        }
        AttrValue::Pairs(pairs) => {
            let flat: Vec<f64> = pairs.iter().flatten().copied().collect();
            group
                .new_attr::<f64>()
                .shape((pairs.len(), 2))
                .create(name)?
                .write_raw(flat.as_slice())?;
        }
    }
    Ok(())
}

fn read_attr(group: &Group, name: &str) -> Result<AttrValue> {
    let attr = group.attr(name)?;
    let shape = attr.shape();
    match shape.len() {
        0 => Ok(AttrValue::Scalar(attr.read_scalar::<f64>()?)),
        1 => Ok(AttrValue::Array(attr.read_raw::<f64>()?)),
        2 if shape[1] == 2 => {
            let flat = attr.read_raw::<f64>()?;
            Ok(AttrValue::Pairs(
                flat.chunks_exact(2).map(|c| [c[0], c[1]]).collect(),
            ))
        }
        _ => Err(StoreError::InvalidField {
            record: group.name(),
            field: "attribute",
            reason: format!("`{name}` has unsupported shape {shape:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hdf5_record_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.h5");

        let mut record = Record::new();
        record.insert("length".to_string(), AttrValue::Scalar(0.25));
        record.insert("timestamps".to_string(), AttrValue::Array(vec![0.0, 0.1]));
        record.insert(
            "points".to_string(),
            AttrValue::Pairs(vec![[1.0, 2.0], [3.0, 4.0]]),
        );

        {
            let mut store = Hdf5Store::open(&path).unwrap();
            store.write_record("1.00_2.00", "discharge_0", &record).unwrap();
            store.write_record("1.00_2.00", "discharge_0", &record).unwrap();
        }

        let store = Hdf5Store::open(&path).unwrap();
        assert_eq!(store.windows().unwrap(), vec!["1.00_2.00".to_string()]);
        let records = store.read_records("1.00_2.00").unwrap();
        assert_eq!(records, vec![("discharge_0".to_string(), record)]);
    }

    #[test]
    fn test_failed_write_keeps_previous_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = Hdf5Store::open(dir.path().join("events.h5")).unwrap();

        let mut record = Record::new();
        record.insert("length".to_string(), AttrValue::Scalar(0.25));
        store.write_record("1.00_2.00", "discharge_0", &record).unwrap();

        // HDF5 refuses empty attribute names, so this write fails partway.
        let mut broken = Record::new();
        broken.insert("avg_speed".to_string(), AttrValue::Scalar(1.0));
        broken.insert(String::new(), AttrValue::Scalar(2.0));
        broken.insert("length".to_string(), AttrValue::Scalar(9.0));
        assert!(store.write_record("1.00_2.00", "discharge_0", &broken).is_err());

        assert_eq!(
            store.record_keys("1.00_2.00").unwrap(),
            vec!["discharge_0".to_string()]
        );
        let records = store.read_records("1.00_2.00").unwrap();
        assert_eq!(records, vec![("discharge_0".to_string(), record)]);

        assert!(store.write_record("3.00_4.00", "discharge_0", &broken).is_err());
        assert_eq!(store.windows().unwrap(), vec!["1.00_2.00".to_string()]);
    }
}
