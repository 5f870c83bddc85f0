//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the sync engine
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IRemoteStore`] - Primitive operations on the remote file store
//! - [`ICredentials`] - Source of access tokens for the remote store adapter

pub mod credentials;
pub mod remote_store;

pub use credentials::ICredentials;
pub use remote_store::{
    DeleteOutcome, EntryField, EntryQuery, FieldSet, IRemoteStore, ParentFilter, RemoteEntry,
};
