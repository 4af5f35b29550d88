//! Error handling
//!
//! Defines error types and classification for the storage service.

pub mod types;

pub use types::*;
