//! Versioned JSON document format.

use super::Ledger;
use crate::error::{Error, Result};
use crate::patient::Patient;
use serde::{Deserialize, Serialize};

pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreDocument {
    version: u32,
    next_patient_id: u32,
    #[serde(default)]
    patients: Vec<Patient>,
}

pub fn encode(ledger: &Ledger) -> Result<String> {
    let document = StoreDocument {
        version: FORMAT_VERSION,
        next_patient_id: ledger.next_patient_id,
        patients: ledger.patients.clone(),
    };
    let mut text = serde_json::to_string_pretty(&document)?;
    text.push('\n');
    Ok(text)
}

pub fn decode(text: &str) -> Result<Ledger> {
    let document: StoreDocument = serde_json::from_str(text)?;
    if document.version != FORMAT_VERSION {
        return Err(Error::CorruptStore {
            line: 1,
            message: format!(
                "unsupported store version {} (expected {FORMAT_VERSION})",
                document.version
            ),
        });
    }
    Ok(Ledger {
        next_patient_id: document.next_patient_id,
        patients: document.patients,
    })
}
