//! Advisory client
//!
//! A platform-agnostic controller that asks for location permission, polls
//! the proxy for the UV index and keeps an explicit [`View`] of the advisory
//! screen up to date. The platform capabilities it needs (permission query,
//! position fix, proxy call) are traits so any front end can plug in; the
//! terminal front end lives in [`terminal`].

use std::time::Duration;

use thiserror::Error;

use crate::config::ClientConfig;
use crate::models::Coordinates;

pub mod controller;
pub mod proxy;
pub mod terminal;
pub mod view;

pub use controller::{ClientState, Command, Controller, ControllerSettings, Platform};
pub use proxy::ProxyClient;
pub use view::{Renderer, View};

/// Answer of the platform's permission query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    /// Not decided yet; asking for a position will prompt the user
    Prompt,
    Denied,
}

/// Hints passed to the position provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    /// Oldest cached fix the provider may hand back
    pub maximum_age: Duration,
    /// Give up when no fix arrived within this time
    pub timeout: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            high_accuracy: false,
            maximum_age: Duration::from_secs(60),
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ClientConfig> for PositionOptions {
    fn from(config: &ClientConfig) -> Self {
        Self {
            high_accuracy: config.high_accuracy,
            maximum_age: config.location_max_age(),
            timeout: config.location_timeout(),
        }
    }
}

/// Position provider errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Proxy call errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// What the advisory screen shows when a cycle does not produce a reading.
/// `Display` is the user-visible text.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ClientError {
    #[error("Location permission denied.")]
    PermissionDenied,
    #[error("UV index not available.")]
    Unavailable,
    #[error("Request timed out.")]
    TimedOut,
    #[error("Failed to load uv index.")]
    FetchFailed,
}

pub trait PermissionProvider {
    /// Current geolocation permission. An error is treated as a denial.
    async fn query(&self) -> anyhow::Result<PermissionState>;
}

pub trait LocationProvider {
    async fn current_position(&self, options: &PositionOptions) -> Result<Coordinates, LocationError>;
}

pub trait UvFetcher {
    /// Ask the proxy for the UV index, `None` when the proxy has no figure
    async fn fetch_uv(&self, coordinates: &Coordinates) -> Result<Option<f64>, FetchError>;
}
