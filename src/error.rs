//! Error types and handling for the UV advisory application

use thiserror::Error;

/// Main error type for the UV advisory application
#[derive(Error, Debug)]
pub enum UvAdvisoryError {
    /// Unusable settings
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Upstream weather provider errors
    #[error("Upstream error: {message}")]
    Upstream { message: String },

    /// Rejected caller input such as out-of-range coordinates
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Anything else, e.g. process setup
    #[error("{message}")]
    General { message: String },
}

impl UvAdvisoryError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn upstream<S: Into<String>>(message: S) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Text for a person at the terminal, without internal detail
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            UvAdvisoryError::Config { .. } => {
                "Invalid configuration. Check the config file and the WEATHER_KEY variable.".to_string()
            }
            UvAdvisoryError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            UvAdvisoryError::Upstream { .. } | UvAdvisoryError::General { .. } => self.to_string(),
        }
    }
}
