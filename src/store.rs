//! Persistence of finalized discharge events.
//!
//! Events are grouped under a window key (`"<start>_<stop>"`) and stored as flat
//! attribute records (`discharge_<index>`) through an [`AttributeStore`] backend.

mod error;
mod event_store;
#[cfg(feature = "hdf5")]
mod hdf5;
mod json;
mod memory;
mod record;

pub use error::{Result, StoreError};
pub use event_store::{EventStore, record_key, window_key};
#[cfg(feature = "hdf5")]
pub use hdf5::Hdf5Store;
pub use json::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{AttrValue, AttributeStore, Record};
