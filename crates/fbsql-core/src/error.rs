//! Error types for FBSQL

use thiserror::Error;

/// Core error type for FBSQL configuration and setup
#[derive(Error, Debug)]
pub enum FbSqlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Result type alias for FBSQL core operations
pub type Result<T> = std::result::Result<T, FbSqlError>;
