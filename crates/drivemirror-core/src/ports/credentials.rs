//! Credentials port
//!
//! Token acquisition and refresh happen outside DriveMirror. Adapters receive
//! an `ICredentials` at construction and ask it for a bearer token per request.

/// Source of access tokens for a remote store adapter
#[async_trait::async_trait]
pub trait ICredentials: Send + Sync {
    /// Returns a currently valid access token
    async fn access_token(&self) -> anyhow::Result<String>;
}
