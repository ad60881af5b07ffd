//! Event store error types.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for event store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Event store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The destination refused access, usually because another program holds it open.
    #[error("cannot access {}: the file may be open in another program", path.display())]
    Locked {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The store document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No group exists for the requested window key.
    #[error("no events stored for window `{0}`")]
    MissingWindow(String),

    /// A record lacks an attribute every schema version carries.
    #[error("record `{record}` is missing `{field}`")]
    MissingField { record: String, field: &'static str },

    /// A record attribute has the wrong shape.
    #[error("record `{record}` has an invalid `{field}`: {reason}")]
    InvalidField {
        record: String,
        field: &'static str,
        reason: String,
    },

    /// HDF5 library error.
    #[cfg(feature = "hdf5")]
    #[error("HDF5 error: {0}")]
    Hdf5(#[from] hdf5::Error),
}

impl StoreError {
    /// Classify an I/O error raised while touching `path`.
    pub(crate) fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::PermissionDenied | std::io::ErrorKind::WouldBlock => {
                Self::Locked {
                    path: path.into(),
                    source,
                }
            }
            _ => Self::Io(source),
        }
    }
}
