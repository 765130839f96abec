//! Data models for the UV advisory application
//!
//! - Coordinates: Geographic position as reported by the device
//! - Uv: Wire types exchanged between the proxy and its clients

pub mod location;
pub mod uv;

// Re-export all public types for convenient access
pub use location::Coordinates;
pub use uv::{ErrorResponse, UvIndexResponse};
