//! HTTP protocol layer module
//!
//! Response builders, MIME detection and cache validation, decoupled from
//! the slide generation logic.

pub mod cache;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use response::{
    apply_common_headers, build_304_response, build_404_response, build_405_response,
    build_attachment_response, build_error_response, build_health_response,
    build_options_response, json_response,
};
