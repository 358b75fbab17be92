//! Error types for the PokeAPI client

use std::fmt;

/// Errors that can occur when interacting with the PokeAPI
#[derive(Debug)]
pub enum PokeApiError {
    /// HTTP transport failure (connection, timeout, TLS)
    Http(reqwest::Error),
    /// The API answered outside the 2xx range
    Status(reqwest::StatusCode),
    /// Failed to parse a JSON response body
    Json(serde_json::Error),
    /// An alias chain exceeded the resolution depth ceiling
    AliasDepth(String),
}

impl fmt::Display for PokeApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "PokeAPI HTTP error: {}", e),
            Self::Status(code) => write!(f, "PokeAPI returned status {}", code),
            Self::Json(e) => write!(f, "PokeAPI JSON parse error: {}", e),
            Self::AliasDepth(name) => {
                write!(f, "alias chain for '{}' exceeded maximum depth", name)
            }
        }
    }
}

impl std::error::Error for PokeApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for PokeApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for PokeApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for PokeAPI operations
pub type Result<T> = std::result::Result<T, PokeApiError>;
