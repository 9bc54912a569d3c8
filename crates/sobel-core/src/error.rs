// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for stream, reconstruction and metric operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Sobel validation operations
pub type Result<T> = std::result::Result<T, SobelError>;

/// Errors that can occur while encoding, reconstructing or scoring frames
#[derive(Debug, Error)]
pub enum SobelError {
    /// Artifact missing, unreadable or unwritable
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Image could not be decoded or encoded
    #[error("Image error on {}: {reason}", path.display())]
    Image {
        /// Image file
        path: PathBuf,
        /// Reason for failure
        reason: String,
    },

    /// A stream token is not a valid 8-bit hex value
    #[error("Invalid token {token:?} at line {line}: {reason}")]
    Parse {
        /// 1-based line number in the stream
        line: usize,
        /// Offending token (trimmed)
        token: String,
        /// Reason for failure
        reason: String,
    },

    /// Sample count or grid dimensions disagree
    #[error("Shape mismatch in {context}: expected {expected}, got {actual}")]
    Shape {
        /// What was being checked
        context: String,
        /// Expected size
        expected: String,
        /// Actual size
        actual: String,
    },

    /// Frame or pipeline configuration is inconsistent
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for failure
        reason: String,
    },
}

impl SobelError {
    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an image error
    pub fn image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Image {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error
    pub fn parse(line: usize, token: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            line,
            token: token.into(),
            reason: reason.into(),
        }
    }

    /// Create a shape error
    pub fn shape(
        context: impl Into<String>,
        expected: impl std::fmt::Display,
        actual: impl std::fmt::Display,
    ) -> Self {
        Self::Shape {
            context: context.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
