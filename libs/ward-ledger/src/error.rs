//! Error types for the ward ledger

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid age: {0} (must be between 1 and 120)")]
    InvalidAge(i32),

    #[error("No beds available (all {capacity} beds occupied)")]
    BedUnavailable { capacity: usize },

    #[error("Patient not found: {0}")]
    NotFound(u32),

    #[error("Invalid amount: {0}")]
    InvalidAmount(f64),

    #[error("Bill already cleared for patient {0}")]
    AlreadyPaid(u32),

    #[error("Partial payment not allowed: need Rs.{required:.2}, got Rs.{tendered:.2}")]
    InsufficientPayment { required: f64, tendered: f64 },

    #[error("Cannot discharge patient {id}: Rs.{outstanding:.2} outstanding")]
    BillNotCleared { id: u32, outstanding: f64 },

    #[error("Field '{field}' must not contain '|' or line breaks")]
    UnencodableText { field: &'static str },

    #[error("Corrupt store at line {line}: {message}")]
    CorruptStore { line: usize, message: String },

    #[error("Corrupt record for patient {id}: {message}")]
    CorruptRecord { id: u32, message: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error comes from an operator-level rule rather than the store.
    pub fn is_domain(&self) -> bool {
        !matches!(
            self,
            Error::CorruptStore { .. }
                | Error::CorruptRecord { .. }
                | Error::InvalidConfig(_)
                | Error::Io(_)
                | Error::Json(_)
        )
    }
}
