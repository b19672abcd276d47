use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Environment error: {0}")]
    #[diagnostic(code(outfitly::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(outfitly::config))]
    Config(String),

    #[error("Calendar API error: {0}")]
    #[diagnostic(code(outfitly::calendar))]
    Calendar(String),

    #[error("Weather API error: {0}")]
    #[diagnostic(code(outfitly::weather))]
    Weather(String),

    #[error("AI service error: {0}")]
    #[diagnostic(code(outfitly::ai_service))]
    AiService(String),

    #[error("Database error: {0}")]
    #[diagnostic(code(outfitly::database))]
    Database(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(outfitly::auth))]
    Auth(String),

    #[error(transparent)]
    #[diagnostic(code(outfitly::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(outfitly::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(outfitly::other))]
    Other(String),
}

// Implement From for TOML serialization errors
impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(var: &str) -> Error {
    Error::Environment(format!("Missing environment variable: {}", var))
}

/// Helper to create configuration errors
#[allow(dead_code)]
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create calendar errors
pub fn calendar_error(message: &str) -> Error {
    Error::Calendar(message.to_string())
}

/// Helper to create weather errors
pub fn weather_error(message: &str) -> Error {
    Error::Weather(message.to_string())
}

/// Helper to create AI service errors
pub fn ai_error(message: &str) -> Error {
    Error::AiService(message.to_string())
}

/// Helper to create database errors
pub fn db_error(message: &str) -> Error {
    Error::Database(message.to_string())
}

/// Helper to create other errors
#[allow(dead_code)]
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
