//! Error types for simdash
//!
//! This module defines the error types used throughout the simdash crates.
//! All errors are derived from `thiserror` for convenient error handling
//! and automatic `From` implementations.
//!
//! # Example
//!
//! ```
//! use simdash_core::error::{SimdashError, Result};
//!
//! fn parse_catalog(raw: &str) -> Result<serde_json::Value> {
//!     // serde_json::Error converts into SimdashError::Json
//!     Ok(serde_json::from_str(raw)?)
//! }
//!
//! assert!(matches!(parse_catalog("{"), Err(SimdashError::Json(_))));
//! ```

use thiserror::Error;

use crate::types::ProviderId;

/// Main error type for simdash operations
///
/// Covers transport failures against the simulation backend, malformed
/// payloads, pricing resolution failures, and configuration problems.
#[derive(Error, Debug)]
pub enum SimdashError {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("HTTP error from {endpoint}: status {status}")]
    HttpStatus {
        /// Endpoint that was called
        endpoint: String,
        /// Returned status code
        status: u16,
    },

    /// Backend accepted the request but refused to start the run
    #[error("Simulation run was rejected by the backend")]
    RunRejected,

    /// No dynamic or default rate exists for the provider
    #[error("No pricing available for provider: {0}")]
    UnknownProvider(ProviderId),

    /// Summary payload is missing required fields
    #[error("Summary data is incomplete: missing {0}")]
    IncompleteSummary(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in simdash
pub type Result<T> = std::result::Result<T, SimdashError>;
