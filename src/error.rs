//! Error types and handling for `WeatherBar`

use thiserror::Error;

/// Main error type for the `WeatherBar` library
#[derive(Error, Debug)]
pub enum WeatherBarError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Weather API rejected the request
    #[error("API error: {message}")]
    Api { message: String },

    /// Transport-level failures (connect, timeout, TLS)
    #[error("Network error: {source}")]
    Network {
        #[from]
        source: reqwest::Error,
    },

    /// Upstream answered with something we could not understand
    #[error("Invalid response: {message}")]
    InvalidResponse { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },
}

impl WeatherBarError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new invalid response error
    pub fn invalid_response<S: Into<String>>(message: S) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = WeatherBarError::config("hours out of range");
        assert!(matches!(config_err, WeatherBarError::Config { .. }));

        let api_err = WeatherBarError::api("Latitude must be in range of -90 to 90°");
        assert!(matches!(api_err, WeatherBarError::Api { .. }));

        let validation_err = WeatherBarError::validation("invalid coordinates");
        assert!(matches!(validation_err, WeatherBarError::Validation { .. }));
    }

    #[test]
    fn test_display_carries_category_and_message() {
        let err = WeatherBarError::invalid_response("missing hourly block");
        assert_eq!(err.to_string(), "Invalid response: missing hourly block");

        let err = WeatherBarError::api("Parameter 'hourly' is invalid");
        assert_eq!(err.to_string(), "API error: Parameter 'hourly' is invalid");
    }
}
