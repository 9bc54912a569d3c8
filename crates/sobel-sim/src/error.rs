// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for simulation and validation runs

use sobel_core::SobelError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for simulation operations
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors that can occur while driving the simulator or a validation run
#[derive(Debug, Error)]
pub enum SimError {
    /// Simulator executable not found
    #[error("Simulator tool not found: {tool} ({hint})")]
    ToolNotFound {
        /// Tool name or path that was looked up
        tool: String,
        /// How to fix it
        hint: String,
    },

    /// A design source listed for compilation is missing
    #[error("Design source missing: {}", path.display())]
    DesignSourceMissing {
        /// Expected source file
        path: PathBuf,
    },

    /// Build or run step exited non-zero
    #[error("{step} failed ({status}): `{command}`; see {}\n{tail}", log.display())]
    ProcessFailed {
        /// Step name (`build` or `run`)
        step: String,
        /// Rendered command line
        command: String,
        /// Exit status description
        status: String,
        /// Log file holding the full stdout/stderr
        log: PathBuf,
        /// Last lines of the log
        tail: String,
    },

    /// Build or run step exceeded its time limit and was killed
    #[error("{step} timed out after {duration_ms}ms: `{command}`")]
    Timeout {
        /// Step name (`build` or `run`)
        step: String,
        /// Rendered command line
        command: String,
        /// Time limit in milliseconds
        duration_ms: u64,
    },

    /// The simulator exited cleanly without writing its output stream
    #[error("Simulation produced no output stream at {}", path.display())]
    MissingOutput {
        /// Expected output file
        path: PathBuf,
    },

    /// File system error outside the stream codec
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Encoding, reconstruction or scoring failed
    #[error(transparent)]
    Core(#[from] SobelError),

    /// Run configuration is inconsistent
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for failure
        reason: String,
    },
}

impl SimError {
    /// Create a tool-not-found error
    pub fn tool_not_found(tool: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::ToolNotFound {
            tool: tool.into(),
            hint: hint.into(),
        }
    }

    /// Create an I/O error bound to a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// True for failures of the external simulator itself
    pub const fn is_external_process(&self) -> bool {
        matches!(
            self,
            Self::ToolNotFound { .. }
                | Self::ProcessFailed { .. }
                | Self::Timeout { .. }
                | Self::MissingOutput { .. }
        )
    }
}
