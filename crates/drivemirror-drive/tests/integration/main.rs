//! Integration tests for drivemirror-drive
//!
//! Uses wiremock to simulate the Google Drive v3 API and verifies the
//! `IRemoteStore` adapter end to end: listing with pagination, folder
//! creation, multipart uploads, deletions and error mapping.

mod common;

mod test_listing;
mod test_mutations;
