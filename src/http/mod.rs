//! HTTP access to the remote mercado API
//!
//! One request per call, bounded by the configured timeout, never retried.

pub mod client;

pub use client::{ApiClient, ApiResponse, Method};
