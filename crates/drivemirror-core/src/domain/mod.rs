//! Domain entities and business logic
//!
//! This module contains the core domain types for DriveMirror:
//! - Newtypes for validated local and remote paths and remote identifiers
//! - Sync status and its bottom-up folding rules
//! - Sync actions produced by planning and consumed by execution
//! - Size units for progress reporting
//! - Domain-specific error types

pub mod action;
pub mod errors;
pub mod newtypes;
pub mod size_unit;
pub mod status;

// Re-export commonly used types
pub use action::SyncAction;
pub use errors::DomainError;
pub use newtypes::*;
pub use size_unit::SizeUnit;
pub use status::{fold_statuses, SyncStatus};
