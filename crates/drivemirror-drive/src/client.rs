//! Google Drive API client
//!
//! Provides an authenticated HTTP client for the Drive v3 REST API. A bearer
//! token is fetched from the injected [`ICredentials`] for every request, and
//! non-success responses are mapped onto [`DriveError`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use drivemirror_drive::{DriveClient, StaticCredentials};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = DriveClient::new(Arc::new(StaticCredentials::new("token")))?;
//! let request = client.get(&client.api_url("/files")).await?;
//! let _response = client.send(request).await?;
//! # Ok(())
//! # }
//! ```

use std::{sync::Arc, time::Duration};

use drivemirror_core::config::DriveConfig;
use drivemirror_core::ports::ICredentials;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use tracing::{debug, warn};

use crate::DriveError;

/// Base URL for Drive v3 metadata requests
pub const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// Base URL for Drive v3 content uploads
pub const DRIVE_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";

/// Retry-after reported when a 429 carries no usable header
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(30);

/// Default per-request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// DriveClient
// ============================================================================

/// HTTP client for Google Drive API calls
///
/// Wraps `reqwest::Client` with per-request bearer authentication and base
/// URL construction for the metadata and upload endpoints.
#[derive(Clone)]
pub struct DriveClient {
    /// The underlying HTTP client
    client: Client,
    /// Base URL for metadata requests
    api_base_url: String,
    /// Base URL for upload requests
    upload_base_url: String,
    /// Token source consulted for every request
    credentials: Arc<dyn ICredentials>,
}

impl DriveClient {
    /// Creates a client against the public Drive endpoints
    pub fn new(credentials: Arc<dyn ICredentials>) -> Result<Self, DriveError> {
        Self::with_base_urls(credentials, DRIVE_API_BASE_URL, DRIVE_UPLOAD_BASE_URL)
    }

    /// Creates a client with custom base URLs (useful for testing)
    ///
    /// # Arguments
    /// * `credentials` - Token source
    /// * `api_base_url` - Base URL for metadata requests
    /// * `upload_base_url` - Base URL for upload requests
    pub fn with_base_urls(
        credentials: Arc<dyn ICredentials>,
        api_base_url: impl Into<String>,
        upload_base_url: impl Into<String>,
    ) -> Result<Self, DriveError> {
        Self::build(
            credentials,
            api_base_url.into(),
            upload_base_url.into(),
            DEFAULT_TIMEOUT,
        )
    }

    /// Creates a client from the `drive` configuration section
    pub fn from_config(
        config: &DriveConfig,
        credentials: Arc<dyn ICredentials>,
    ) -> Result<Self, DriveError> {
        Self::build(
            credentials,
            config.api_base_url.clone(),
            config.upload_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    fn build(
        credentials: Arc<dyn ICredentials>,
        api_base_url: String,
        upload_base_url: String,
        timeout: Duration,
    ) -> Result<Self, DriveError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// Returns the base URL for metadata requests
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Returns the base URL for upload requests
    pub fn upload_base_url(&self) -> &str {
        &self.upload_base_url
    }

    /// Metadata endpoint URL for `path` (e.g. `"/files"`)
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base_url, path)
    }

    /// Upload endpoint URL for `path`
    pub fn upload_url(&self, path: &str) -> String {
        format!("{}{}", self.upload_base_url, path)
    }

    /// Creates an authenticated request builder for an absolute URL
    ///
    /// # Errors
    /// Returns [`DriveError::Credentials`] if no access token is available
    pub async fn request(&self, method: Method, url: &str) -> Result<RequestBuilder, DriveError> {
        let token = self
            .credentials
            .access_token()
            .await
            .map_err(|e| DriveError::Credentials(format!("{e:#}")))?;
        Ok(self.client.request(method, url).bearer_auth(token))
    }

    pub async fn get(&self, url: &str) -> Result<RequestBuilder, DriveError> {
        self.request(Method::GET, url).await
    }

    pub async fn post(&self, url: &str) -> Result<RequestBuilder, DriveError> {
        self.request(Method::POST, url).await
    }

    pub async fn delete(&self, url: &str) -> Result<RequestBuilder, DriveError> {
        self.request(Method::DELETE, url).await
    }

    /// Sends a request and maps any non-success status onto [`DriveError`]
    pub async fn send(&self, request: RequestBuilder) -> Result<Response, DriveError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(status = status.as_u16(), url = %response.url(), "Drive response");

        if status.is_success() {
            Ok(response)
        } else {
            Err(error_for_response(response).await)
        }
    }
}

// ============================================================================
// Status mapping
// ============================================================================

/// Converts a non-success response into a [`DriveError`]
pub async fn error_for_response(response: Response) -> DriveError {
    let status = response.status();
    let retry_after = response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .map(|v| parse_retry_after(v, DEFAULT_RETRY_AFTER))
        .unwrap_or(DEFAULT_RETRY_AFTER);
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read error body".to_string());

    map_status(status, body, retry_after)
}

fn map_status(status: StatusCode, body: String, retry_after: Duration) -> DriveError {
    match status {
        StatusCode::UNAUTHORIZED => DriveError::Unauthorized(body),
        StatusCode::FORBIDDEN => DriveError::Forbidden(body),
        StatusCode::NOT_FOUND => DriveError::NotFound(body),
        StatusCode::TOO_MANY_REQUESTS => DriveError::TooManyRequests { retry_after },
        s if s.is_server_error() => DriveError::ServerError(format!("{s}: {body}")),
        s => DriveError::InvalidResponse(format!("unexpected status {s}: {body}")),
    }
}

/// Parses a Retry-After header value into a Duration.
///
/// The header can be either:
/// - An integer number of seconds (e.g., "30")
/// - An HTTP-date (e.g., "Fri, 31 Dec 2025 23:59:59 GMT") - parsed as seconds from now
///
/// Falls back to the default duration if parsing fails.
pub fn parse_retry_after(value: &str, default: Duration) -> Duration {
    if let Ok(seconds) = value.trim().parse::<u64>() {
        return Duration::from_secs(seconds);
    }

    if let Ok(date) = chrono::DateTime::parse_from_rfc2822(value.trim()) {
        let diff = date.with_timezone(&chrono::Utc) - chrono::Utc::now();
        if let Ok(secs) = u64::try_from(diff.num_seconds()) {
            return Duration::from_secs(secs);
        }
        return Duration::ZERO;
    }

    warn!(value, "Could not parse Retry-After header, using default");
    default
}
