//! UV advisory - current UV index lookup with sun protection advice
//!
//! This library provides the proxy endpoint that fetches the UV index from
//! OpenWeatherMap without exposing the API key, and the client controller
//! that turns readings into a color-coded advisory screen.

pub mod advisory;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use advisory::{AdvisoryBand, SUN_SAFETY_TIPS, UvLevel, band_for};
pub use api::AppState;
pub use client::{ClientState, Controller, ProxyClient, View};
pub use config::UvAdvisoryConfig;
pub use error::UvAdvisoryError;
pub use models::{Coordinates, ErrorResponse, UvIndexResponse};
pub use weather::{OpenWeatherMapClient, UvIndexSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, UvAdvisoryError>;
