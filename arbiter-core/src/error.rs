//! Error types shared across the workspace

use thiserror::Error;

/// Workspace-wide error type
#[derive(Error, Debug)]
pub enum ArbiterError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArbiterError {
    pub fn api(msg: impl Into<String>) -> Self {
        ArbiterError::Api(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        ArbiterError::Network(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        ArbiterError::Auth(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        ArbiterError::Parse(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ArbiterError::NotFound(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        ArbiterError::Config(msg.into())
    }
}

/// Result type alias for arbiter operations
pub type ArbiterResult<T> = Result<T, ArbiterError>;
