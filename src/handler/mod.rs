//! Request handler module
//!
//! Routing, body parameter extraction, and the script-backed endpoints.

pub mod endpoint;
pub mod params;
pub mod router;
pub mod usage;

// Re-export main entry point
pub use router::handle_request;
