//! DriveMirror Drive - Google Drive v3 remote store adapter
//!
//! Provides:
//! - An authenticated HTTP client over `reqwest`
//! - Drive search query construction
//! - [`provider::DriveRemoteStore`], the `IRemoteStore` implementation
//! - Access token sources (static, environment, system keyring)
//!
//! ## Modules
//!
//! - [`client`] - Drive HTTP client and status mapping
//! - [`credentials`] - `ICredentials` implementations
//! - [`provider`] - Listing, folder creation, multipart upload, deletion
//! - [`query`] - Search query and field mask building

pub mod client;
pub mod credentials;
pub mod provider;
pub mod query;

use std::time::Duration;
use thiserror::Error;

pub use client::DriveClient;
pub use credentials::{EnvCredentials, KeyringCredentials, StaticCredentials};
pub use provider::DriveRemoteStore;

/// Errors that can occur when communicating with the Google Drive API
#[derive(Debug, Error)]
pub enum DriveError {
    /// Authentication credentials are invalid or expired
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Insufficient permissions for the requested operation
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded; retry after the specified duration
    #[error("Too many requests, retry after {retry_after:?}")]
    TooManyRequests {
        /// Duration to wait before retrying
        retry_after: Duration,
    },

    /// A server-side error occurred (5xx)
    #[error("Server error: {0}")]
    ServerError(String),

    /// A network-level error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API response could not be parsed or was malformed
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No usable access token
    #[error("Credentials unavailable: {0}")]
    Credentials(String),
}
