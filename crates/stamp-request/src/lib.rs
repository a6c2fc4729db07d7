//! Stamp Request - wire schema and submission of stamping requests
//!
//! This crate provides:
//! - Request and response types exchanged with the stamping backend
//! - Response parsing for the backend's JSON envelope
//! - Grouping of placements into one request per stamp
//! - Sequential submission through a [`StampingBackend`]
//!
//! # Example
//!
//! ```ignore
//! use stamp_request::{group_placements, submit_all, Operator, StampMode};
//!
//! let requests = group_placements(store.all(), &layout, StampMode::Seal, &operator);
//! let outcome = submit_all(&backend, contract_id, &requests).await;
//! ```

#[cfg(feature = "http")]
mod http;
pub mod parser;
mod schema;
mod submission;

#[cfg(feature = "http")]
pub use http::HttpBackend;
pub use parser::{parse_response, parse_stamp_items};
pub use schema::*;
pub use submission::{group_placements, submit_all, StampingBackend, SubmissionOutcome};

use thiserror::Error;

/// Errors that can occur while building or sending stamping requests
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("{message}")]
    Backend { code: i32, message: String },

    #[error("No placements to submit")]
    NoPlacements,

    #[error("Unknown seal type: {0}")]
    InvalidSealType(u8),

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type for request operations
pub type Result<T> = std::result::Result<T, RequestError>;
