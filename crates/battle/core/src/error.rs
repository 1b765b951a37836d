//! Common error infrastructure for battle-core.
//!
//! Domain-specific errors (`ConfigError`, `SessionError`) are defined next to
//! the code that raises them. This module holds the classification shared by
//! all of them.
//!
//! Only programming errors are reported through `Result`: a failed escape or a
//! subject dying before it acts are ordinary battle outcomes and surface as
//! [`crate::BattleEvent`]s instead.

use crate::state::CombatantId;

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Validation**: a request that was rejected; the session is untouched
/// - **Fatal**: the phase machine was driven out of order and the battle is aborted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Invalid input, should not retry without changes.
    ///
    /// Examples: submitting a command while no one is inputting, choosing
    /// escape in a battle that cannot be escaped
    Validation,

    /// Session state is inconsistent with the request; the battle cannot continue.
    ///
    /// Examples: entering the turn phase without a subject
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the session aborts the battle when this error is raised.
    pub const fn aborts_battle(&self) -> bool {
        matches!(self, Self::Fatal)
    }
}

/// Contextual information attached to errors for debugging and diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    /// Subject holding the turn when the error was raised (if any).
    pub subject: Option<CombatantId>,

    /// Session nonce at the time of error.
    ///
    /// The nonce counts ticks, so it pinpoints the frame in a replay.
    pub nonce: u64,

    /// Optional static message providing additional context.
    pub message: Option<&'static str>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(nonce: u64) -> Self {
        Self {
            subject: None,
            nonce,
            message: None,
        }
    }

    #[must_use]
    pub const fn with_subject(mut self, subject: CombatantId) -> Self {
        self.subject = Some(subject);
        self
    }

    #[must_use]
    pub const fn with_message(mut self, message: &'static str) -> Self {
        self.message = Some(message);
        self
    }
}

/// Common trait for all battle-core errors.
pub trait BattleError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> Option<&ErrorContext> {
        None
    }

    /// Returns a static string identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

impl BattleError for crate::config::ConfigError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        "CONFIG_INVALID"
    }
}
