//! Loopcast API Library
//!
//! This crate provides the HTTP API handlers and application setup.

// Module declarations
mod api_doc;
mod handlers;
pub mod setup;

// Public modules
pub mod error;
pub mod state;

// Re-exports
pub use error::ErrorResponse;
