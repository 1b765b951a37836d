//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from scenario loading, the battle session, and command
//! providers so clients can bubble them up with consistent context.
use std::path::PathBuf;

use battle_core::{ConfigError, SessionError, SnapshotError};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}")]
    Ron {
        what: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("failed to encode battle report")]
    Report(#[source] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("runtime requires a scenario before building")]
    MissingScenario,

    #[error("command provider failed: {0}")]
    Provider(String),

    #[error("battle did not finish within {limit} ticks")]
    TickLimit { limit: u64 },
}

impl RuntimeError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn ron(what: impl Into<String>, source: ron::error::SpannedError) -> Self {
        Self::Ron {
            what: what.into(),
            source,
        }
    }
}
