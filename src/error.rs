//! Error taxonomy for the analytics core
//!
//! Only contract violations are errors. Degenerate-but-valid states (zero
//! member months, zero target, empty peer set) come back as normal results
//! carrying an `error`/`warning` field instead.

use thiserror::Error;

/// Hard failures from the calculation engine (InvalidInput)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalcError {
    /// Claims below zero indicate an upstream data-integrity problem
    #[error("Total claims cannot be negative")]
    NegativeClaims(f64),

    /// NaN or infinite value in a numeric input
    #[error("{field} must be a finite number")]
    NonFinite { field: &'static str },
}

/// Failures while assembling grid rows from period records
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("duplicate row id: {0}")]
    DuplicateId(String),

    /// Parent id not present, or the parent chain never reaches a root
    #[error("row {id} references unknown or cyclic parent {parent_id}")]
    UnknownParent { id: String, parent_id: String },

    #[error("row {id}: {source}")]
    Calculation {
        id: String,
        #[source]
        source: CalcError,
    },
}

/// Ingestion and configuration failures
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown organization id: {0}")]
    UnknownOrganization(String),

    /// A parsed record that breaks an ingestion guarantee (1-based data row)
    #[error("record {row}: {message}")]
    InvalidRecord { row: usize, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
