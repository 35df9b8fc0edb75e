//! Slide deck generation service.
//!
//! Accepts slide titles and body text as JSON over HTTP, builds a `.pptx`
//! presentation (optionally from a template) and serves the result for
//! download.

pub mod config;
pub mod deck;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod pptx;
pub mod server;
