//! Integration tests for drivemirror-sync
//!
//! Builds local trees in temporary directories and runs the engine against
//! the in-memory remote store: planning, status aggregation and full
//! synchronization runs.

mod common;

mod test_plan;
mod test_status;
mod test_synchronize;
