//! Error types for the report library
//!
//! Library code returns [`ReportError`]; the CLI wraps it in `anyhow` at the
//! process boundary. None of these errors are retried: any failure aborts the
//! run.

use thiserror::Error;

/// Main error type for report collection and building
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("HTTP request to {service} failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("Failed to decode {service} response: {source}")]
    Decode {
        service: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),

    #[error("Metric query for instance '{instance}' returned no metric streams")]
    EmptyMetricResponse { instance: String },

    #[error("Metric stream for instance '{instance}' has no aggregated datapoints")]
    NoDatapoints { instance: String },

    #[error("No metric samples recorded for '{key}'")]
    NoSamples { key: String },
}

pub type Result<T> = std::result::Result<T, ReportError>;
