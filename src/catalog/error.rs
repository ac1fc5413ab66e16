//! Error types shared by the creature catalog clients.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`CatalogError`] failures.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Failures that can occur while reading a single creature record.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build catalog client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// Identifier lies outside `[1, size]`.
    #[error("creature id {id} is outside the catalog range 1..={size}")]
    InvalidId { id: u32, size: u32 },
    /// The request could not be sent or timed out.
    #[error("failed to send catalog request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The catalog answered with a non-success status code.
    #[error("unexpected catalog response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// Response payload could not be parsed into the expected shape.
    #[error("failed to decode catalog response for `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// A field required to display the creature is absent.
    #[error("creature {id} is missing required field `{field}`")]
    MissingField { id: u32, field: &'static str },
}
