//! Structured error taxonomy surfaced to the host (CLI, embedders).
//!
//! Mirrors the kinds a renderer needs to distinguish, not Rust type names:
//! a missing input file is a different failure mode than a malformed one,
//! and both are different from a scene that parses fine but references
//! geometry that doesn't exist.

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("malformed input{}: {message}", location.as_ref().map(|l| format!(" at {l}")).unwrap_or_default())]
    InputMalformed {
        message: String,
        location: Option<String>,
    },

    #[error("scene inconsistent: {message}")]
    SceneInconsistent { message: String },

    #[error("allocation failure while building scene: {message}")]
    AllocationFailure { message: String },

    #[error("render aborted after {completed_passes} completed pass(es)")]
    RenderAborted { completed_passes: u32 },

    #[error("could not write output: {path}: {source}")]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RenderError {
    pub fn malformed(message: impl Into<String>) -> Self {
        RenderError::InputMalformed {
            message: message.into(),
            location: None,
        }
    }

    pub fn malformed_at(message: impl Into<String>, location: impl Into<String>) -> Self {
        RenderError::InputMalformed {
            message: message.into(),
            location: Some(location.into()),
        }
    }

    pub fn inconsistent(message: impl Into<String>) -> Self {
        RenderError::SceneInconsistent {
            message: message.into(),
        }
    }

    /// Maps to the host's exit code contract: 0 on success, negative on
    /// parse/IO failure (spec §6). `RenderAborted` is not a fatal failure —
    /// the partial image is still valid — so the host may choose to exit 0.
    pub fn exit_code(&self) -> i32 {
        match self {
            RenderError::InputNotFound { .. } => -1,
            RenderError::InputMalformed { .. } => -2,
            RenderError::SceneInconsistent { .. } => -3,
            RenderError::AllocationFailure { .. } => -4,
            RenderError::RenderAborted { .. } => -5,
            RenderError::WriteFailure { .. } => -6,
        }
    }
}
