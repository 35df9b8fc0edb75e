//! Request handler module
//!
//! Responsible for request routing dispatch and the service endpoints:
//! slide generation, file download, service description and health probes.

mod download;
mod generate;
pub mod router;
mod status;

// Re-export main entry point
pub use router::handle_request;
