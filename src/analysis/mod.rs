//! Symptom analysis engine.
//!
//! prompt → remote generation → JSON span | text mining → result, with the
//! local table-driven analyzer as the terminal fallback for every failure.

pub mod client;
pub mod engine;
pub mod fallback;
pub mod parser;
pub mod prompt;

pub use client::*;
pub use engine::*;
pub use fallback::*;
pub use parser::*;
pub use prompt::*;

use thiserror::Error;

/// Internal failures of the remote path. None of these reach the caller of
/// [`SymptomAnalyzer::analyze`]; each one routes to the local fallback.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Generation endpoint unreachable at {0}")]
    Connection(String),

    /// The response body may echo the request, so only its length is kept.
    #[error("Generation endpoint returned error (status {status}, {body_len} byte body)")]
    EndpointStatus { status: u16, body_len: usize },

    #[error("Generation request timed out after {0}ms")]
    Timeout(u64),

    #[error("Generation request cancelled")]
    Cancelled,

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Unexpected response envelope: {0}")]
    UnexpectedEnvelope(String),

    #[error("JSON parsing error: {0}")]
    JsonParsing(String),

    #[error("Response does not match the analysis shape: {0}")]
    InvalidShape(String),
}

impl AnalysisError {
    /// Short stable label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection(_) => "connection",
            Self::EndpointStatus { .. } => "status",
            Self::Timeout(_) => "timeout",
            Self::Cancelled => "cancelled",
            Self::HttpClient(_) => "http",
            Self::UnexpectedEnvelope(_) => "envelope",
            Self::JsonParsing(_) => "json",
            Self::InvalidShape(_) => "shape",
        }
    }
}
