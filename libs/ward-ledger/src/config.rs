//! Ward settings.

use crate::codec::{LoadMode, StoreFormat};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CAPACITY: usize = 50;
pub const DEFAULT_DATA_FILE: &str = "hospital_data.txt";

/// What happens when writing the store fails after a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersistencePolicy {
    /// Log the failure and keep the in-memory change.
    #[default]
    BestEffort,
    /// Undo the in-memory change and return the error.
    Strict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WardConfig {
    pub capacity: usize,
    pub data_file: PathBuf,
    /// Encoding used when writing; reads detect the encoding.
    pub format: StoreFormat,
    pub load_mode: LoadMode,
    pub persistence: PersistencePolicy,
}

impl Default for WardConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            data_file: PathBuf::from(DEFAULT_DATA_FILE),
            format: StoreFormat::default(),
            load_mode: LoadMode::default(),
            persistence: PersistencePolicy::default(),
        }
    }
}

impl WardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "ward capacity must be at least 1 bed".into(),
            ));
        }
        if u32::try_from(self.capacity).is_err() {
            return Err(Error::InvalidConfig(format!(
                "ward capacity {} exceeds the bed numbering range",
                self.capacity
            )));
        }
        if self.data_file.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("data file path is empty".into()));
        }
        Ok(())
    }
}
