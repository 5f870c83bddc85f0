//! DriveMirror Core - Domain logic and business rules
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `SyncStatus`, `SyncAction`, `RelativePath`, `RemotePath`, `RemoteId`, `SizeUnit`
//! - **Port definitions** - Traits for adapters: `IRemoteStore`, `ICredentials`
//! - **Configuration** - YAML-backed settings shared by the engine and the CLI
//!
//! # Architecture
//!
//! The domain module contains pure logic with no I/O.
//! Ports define trait interfaces that adapter crates implement; the sync
//! engine depends only on those traits, never on a concrete remote store.

pub mod config;
pub mod domain;
pub mod ports;
