//! Tracker configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tracker::discharge::CELL_SIZE_UM;
use crate::tracker::history::MIN_CHECKPOINTS;

/// Error type for loading or validating a [`TrackerConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Configuration for the [`ClusterTracker`](crate::tracker::ClusterTracker).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Maximum distance, in grid cells, between a track head and a centroid it claims
    pub max_association_distance: f64,
    /// Samples a track needs before a silent frame retires it
    pub min_consistent_frames: usize,
    /// Minimum path length, in millimeters, for a retired track to become an event
    pub min_event_length_mm: f64,
    /// Electrode pitch in micrometers
    pub cell_size_um: f64,
    /// Recording sampling rate in Hz; informational only
    pub sampling_rate: Option<f64>,
    /// Upper bound on retained rewind checkpoints, `None` for unbounded.
    /// At least [`MIN_CHECKPOINTS`]; [`validate`](Self::validate) rejects smaller caps
    /// and an unvalidated smaller cap behaves as [`MIN_CHECKPOINTS`].
    pub max_checkpoints: Option<usize>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_association_distance: 3.0,
            min_consistent_frames: 3,
            min_event_length_mm: 0.3,
            cell_size_um: CELL_SIZE_UM,
            sampling_rate: None,
            max_checkpoints: None,
        }
    }
}

impl TrackerConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
            ConfigError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !self.max_association_distance.is_finite() || self.max_association_distance < 0.0 {
            return Err(invalid(
                "max_association_distance",
                format!(
                    "expected a finite non-negative distance, got {}",
                    self.max_association_distance
                ),
            ));
        }
        if self.min_consistent_frames == 0 {
            return Err(invalid("min_consistent_frames", "must be at least 1"));
        }
        if !self.min_event_length_mm.is_finite() || self.min_event_length_mm < 0.0 {
            return Err(invalid(
                "min_event_length_mm",
                format!(
                    "expected a finite non-negative length, got {}",
                    self.min_event_length_mm
                ),
            ));
        }
        if !self.cell_size_um.is_finite() || self.cell_size_um <= 0.0 {
            return Err(invalid(
                "cell_size_um",
                format!("expected a positive size, got {}", self.cell_size_um),
            ));
        }
        if let Some(rate) = self.sampling_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(invalid(
                    "sampling_rate",
                    format!("expected a positive rate, got {rate}"),
                ));
            }
        }
        if let Some(cap) = self.max_checkpoints {
            if cap < MIN_CHECKPOINTS {
                return Err(invalid(
                    "max_checkpoints",
                    format!("expected at least {MIN_CHECKPOINTS} checkpoints, got {cap}"),
                ));
            }
        }
        Ok(())
    }
}
