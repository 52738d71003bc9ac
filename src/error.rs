//! Error types for the vector generator

use std::path::PathBuf;
use thiserror::Error;

/// Result type for generation operations
pub type GenResult<T> = Result<T, GenError>;

/// Generation errors
#[derive(Debug, Error)]
pub enum GenError {
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid flow '{value}': expected one of os, ws, both")]
    InvalidFlow { value: String },

    #[error("Shape mismatch: expected {expected}, got {got}")]
    ShapeMismatch { expected: String, got: String },

    #[error("Packed word needs {needed} hex digits but the line is {width} digits wide")]
    HexOverflow { needed: usize, width: usize },

    #[error("Invalid hex line '{line}'")]
    HexParse { line: String },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenError {
    pub fn config(msg: impl Into<String>) -> Self {
        GenError::InvalidConfig { message: msg.into() }
    }

    pub fn flow(value: impl Into<String>) -> Self {
        GenError::InvalidFlow { value: value.into() }
    }

    pub fn shape(expected: impl Into<String>, got: impl Into<String>) -> Self {
        GenError::ShapeMismatch {
            expected: expected.into(),
            got: got.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GenError::Io {
            path: path.into(),
            source,
        }
    }
}
