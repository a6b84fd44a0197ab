//! Error types for the sync layer
//!
//! Backend clients never swallow errors; everything they can fail with
//! is one of the variants here, and the coordinator turns whichever one
//! it catches into a single user-visible message.

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by the backend clients and the sync coordinator
#[derive(Error, Debug)]
pub enum SyncError {
    /// Operation attempted against an unconfigured backend
    #[error("{0}")]
    Config(String),

    /// Transport failure, non-success HTTP status, or backend-reported
    /// failure
    #[error("{0}")]
    Remote(String),

    /// The response body was markup, not data: wrong endpoint, or a
    /// proxy answering with an error page
    #[error(
        "received HTML instead of JSON; check that the endpoint URL is correct, or try disabling the proxy"
    )]
    HtmlResponse,

    /// The response body was text that does not parse as JSON
    #[error("could not parse response: {preview}...")]
    UnparseableResponse { preview: String },

    /// Writing the local mirror failed
    #[error(transparent)]
    Storage(#[from] StorageError),
}
