//! Ward Ledger
//!
//! Patient admission ledger for a single fixed-capacity ward:
//! - Bed allocation (lowest free bed first)
//! - Per-patient billing at a fixed daily rate plus additional charges
//! - Admission / payment / discharge lifecycle
//! - Write-through persistence to a flat record store
//!
//! ```rust,no_run
//! use ward_ledger::{Ward, WardConfig};
//!
//! # fn example() -> ward_ledger::Result<()> {
//! let mut ward = Ward::open(&WardConfig::default())?;
//! let patient = ward.admit("Asha", 30, "555", "flu")?;
//! ward.increment_stay(patient.id)?;
//! let receipt = ward.pay_bill(patient.id, 6000.0)?;
//! assert_eq!(receipt.change, 0.0);
//! ward.discharge(patient.id)?;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod beds;
pub mod codec;
pub mod config;
pub mod error;
pub mod patient;
pub mod store;
pub mod ward;

pub use beds::BedTable;
pub use codec::{Ledger, LoadMode, StoreFormat};
pub use config::{PersistencePolicy, WardConfig};
pub use error::{Error, Result};
pub use patient::{Patient, DAILY_RATE};
pub use store::{FileStore, MemoryStore, RecordStore};
pub use ward::{DischargeSummary, PaymentReceipt, Ward};
