//! File formats at the edges of the evaluator.
//!
//! - [`ply`]: ASCII PLY / XYZ point clouds in, ASCII PLY clouds out
//! - [`map_format`]: reconstructed maps as JSON documents
//! - [`report`]: CSV result rows, one per evaluated map

pub mod map_format;
pub mod ply;
pub mod report;

use thiserror::Error;

/// Error reading or writing an evaluator file.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Underlying I/O failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed text content
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What is wrong
        message: String,
    },

    /// Malformed or unwritable JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structurally invalid content
    #[error("invalid content: {0}")]
    Invalid(String),
}

impl FormatError {
    fn parse(line: usize, message: impl Into<String>) -> Self {
        FormatError::Parse {
            line,
            message: message.into(),
        }
    }
}
