//! Error types for grid mutation, planning setup and configuration

use thiserror::Error;

/// Errors reported synchronously by grid and agent calls
#[derive(Error, Debug)]
pub enum GridError {
    #[error("({row}, {col}) is outside the {size}x{size} grid")]
    OutOfBounds { row: i32, col: i32, size: i32 },

    #[error("Invalid cell state: {0}")]
    InvalidCellState(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(String),
}

impl From<toml::de::Error> for GridError {
    fn from(e: toml::de::Error) -> Self {
        GridError::Config(e.to_string())
    }
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Json(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GridError>;
