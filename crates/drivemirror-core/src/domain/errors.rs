//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! including path validation failures and invalid sync action construction.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid local relative path
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Invalid remote path format
    #[error("Invalid remote path: {0}")]
    InvalidRemotePath(String),

    /// Invalid remote ID format
    #[error("Invalid remote ID: {0}")]
    InvalidRemoteId(String),

    /// A sync action was built with a status/field combination that
    /// cannot be executed
    #[error("Invalid {status} action: {reason}")]
    InvalidAction {
        /// The status the action was built with
        status: String,
        /// Which required field was missing
        reason: String,
    },

    /// Unrecognised size unit label
    #[error("Invalid size unit: {0}")]
    InvalidSizeUnit(String),
}
