//! Donation tracker: polls a fundraising page and keeps overlay text
//! files up to date with the total, the latest donor and the top donor.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry point.

pub mod config;
pub mod types;
pub mod source;
pub mod engine;
pub mod storage;
