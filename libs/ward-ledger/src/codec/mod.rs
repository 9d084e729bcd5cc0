//! Persisted ward state and its encodings.
//!
//! Two encodings are supported:
//! - `legacy`: the pipe-delimited line format kept for compatibility with
//!   existing `hospital_data.txt` files
//! - `json`: a versioned, self-describing document with no delimiter limits
//!
//! Bed occupancy is never stored; it is re-derived from the admission flags.

pub mod json;
pub mod legacy;

use crate::error::Result;
use crate::patient::Patient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The persisted part of the ward: ID counter and every record ever admitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub next_patient_id: u32,
    pub patients: Vec<Patient>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self {
            next_patient_id: 1,
            patients: Vec::new(),
        }
    }
}

impl Ledger {
    /// Decode a store, detecting the encoding from its content.
    pub fn decode(text: &str, mode: LoadMode) -> Result<Self> {
        let ledger = match StoreFormat::detect(text) {
            StoreFormat::Legacy => legacy::decode(text, mode)?,
            StoreFormat::Json => json::decode(text)?,
        };
        Ok(ledger.normalized())
    }

    pub fn encode(&self, format: StoreFormat) -> Result<String> {
        match format {
            StoreFormat::Legacy => legacy::encode(self),
            StoreFormat::Json => json::encode(self),
        }
    }

    /// Raise the ID counter past every stored ID so IDs are never handed out twice.
    pub fn normalized(mut self) -> Self {
        let floor = self
            .patients
            .iter()
            .map(|p| p.id.saturating_add(1))
            .max()
            .unwrap_or(1)
            .max(1);
        if self.next_patient_id < floor {
            tracing::warn!(
                stored = self.next_patient_id,
                corrected = floor,
                "Stored patient ID counter is behind existing records, raising it"
            );
            self.next_patient_id = floor;
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Legacy,
    Json,
}

impl StoreFormat {
    /// JSON documents start with `{`; everything else is read as legacy lines.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('{') {
            StoreFormat::Json
        } else {
            StoreFormat::Legacy
        }
    }
}

impl FromStr for StoreFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "legacy" | "text" => Ok(StoreFormat::Legacy),
            "json" => Ok(StoreFormat::Json),
            other => Err(format!(
                "unknown store format '{other}' (expected 'legacy' or 'json')"
            )),
        }
    }
}

impl fmt::Display for StoreFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreFormat::Legacy => f.write_str("legacy"),
            StoreFormat::Json => f.write_str("json"),
        }
    }
}

/// How malformed legacy input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Unparseable numbers read as 0, missing fields as empty.
    #[default]
    Lenient,
    /// Any malformed line fails the load.
    Strict,
}
