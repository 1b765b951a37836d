//! Error types for the battle session.

use crate::config::ConfigError;
use crate::error::{BattleError, ErrorContext, ErrorSeverity};
use crate::event::Subject;
use crate::state::CombatantId;

use super::BattlePhase;

/// Errors surfaced while building or driving a [`super::BattleSession`].
#[derive(Clone, Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session configuration rejected: {0}")]
    Config(#[from] ConfigError),

    #[error("{0} collaborator not provided")]
    MissingCollaborator(&'static str),

    #[error("no subject holds the turn in phase {phase}")]
    NoSubject {
        phase: BattlePhase,
        context: ErrorContext,
    },

    #[error("not awaiting command input (phase {phase})")]
    NotAwaitingInput {
        phase: BattlePhase,
        context: ErrorContext,
    },

    #[error("combatant {subject} asked for manual input but is not a party member able to input")]
    InputNotAllowed {
        subject: CombatantId,
        context: ErrorContext,
    },

    #[error("escape is not available in this battle")]
    EscapeUnavailable { context: ErrorContext },

    #[error("escape reached resolution without an escape ratio")]
    EscapeWithoutRatio { context: ErrorContext },

    #[error("{subject} cannot attempt a party escape")]
    IllegalEscape {
        subject: Subject,
        context: ErrorContext,
    },

    #[error("unknown combatant {id}")]
    UnknownCombatant {
        id: CombatantId,
        context: ErrorContext,
    },

    #[error("battle has not started yet")]
    NotStarted { context: ErrorContext },

    #[error("battle already ended")]
    BattleOver { context: ErrorContext },
}

impl SessionError {
    pub(crate) fn no_subject(phase: BattlePhase, nonce: u64) -> Self {
        Self::NoSubject {
            phase,
            context: ErrorContext::new(nonce),
        }
    }

    pub(crate) fn not_awaiting_input(phase: BattlePhase, nonce: u64) -> Self {
        Self::NotAwaitingInput {
            phase,
            context: ErrorContext::new(nonce),
        }
    }

    pub(crate) fn input_not_allowed(subject: CombatantId, nonce: u64) -> Self {
        Self::InputNotAllowed {
            subject,
            context: ErrorContext::new(nonce).with_subject(subject),
        }
    }

    pub(crate) fn escape_unavailable(nonce: u64) -> Self {
        Self::EscapeUnavailable {
            context: ErrorContext::new(nonce),
        }
    }

    pub(crate) fn escape_without_ratio(subject: CombatantId, nonce: u64) -> Self {
        Self::EscapeWithoutRatio {
            context: ErrorContext::new(nonce)
                .with_subject(subject)
                .with_message("escape was queued after availability changed"),
        }
    }

    pub(crate) fn illegal_escape(subject: Subject, nonce: u64) -> Self {
        let mut context = ErrorContext::new(nonce);
        if let Some(id) = subject.combatant() {
            context = context.with_subject(id);
        }
        Self::IllegalEscape { subject, context }
    }

    pub(crate) fn unknown_combatant(id: CombatantId, nonce: u64) -> Self {
        Self::UnknownCombatant {
            id,
            context: ErrorContext::new(nonce),
        }
    }

    pub(crate) fn not_started(nonce: u64) -> Self {
        Self::NotStarted {
            context: ErrorContext::new(nonce),
        }
    }

    pub(crate) fn battle_over(nonce: u64) -> Self {
        Self::BattleOver {
            context: ErrorContext::new(nonce),
        }
    }
}

impl BattleError for SessionError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Config(_)
            | Self::MissingCollaborator(_)
            | Self::NotAwaitingInput { .. }
            | Self::EscapeUnavailable { .. }
            | Self::UnknownCombatant { .. }
            | Self::NotStarted { .. }
            | Self::BattleOver { .. } => ErrorSeverity::Validation,
            Self::NoSubject { .. }
            | Self::InputNotAllowed { .. }
            | Self::EscapeWithoutRatio { .. }
            | Self::IllegalEscape { .. } => ErrorSeverity::Fatal,
        }
    }

    fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Config(_) | Self::MissingCollaborator(_) => None,
            Self::NoSubject { context, .. }
            | Self::NotAwaitingInput { context, .. }
            | Self::InputNotAllowed { context, .. }
            | Self::EscapeUnavailable { context }
            | Self::EscapeWithoutRatio { context }
            | Self::IllegalEscape { context, .. }
            | Self::UnknownCombatant { context, .. }
            | Self::NotStarted { context }
            | Self::BattleOver { context } => Some(context),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "SESSION_CONFIG",
            Self::MissingCollaborator(_) => "SESSION_MISSING_COLLABORATOR",
            Self::NoSubject { .. } => "SESSION_NO_SUBJECT",
            Self::NotAwaitingInput { .. } => "SESSION_NOT_AWAITING_INPUT",
            Self::InputNotAllowed { .. } => "SESSION_INPUT_NOT_ALLOWED",
            Self::EscapeUnavailable { .. } => "SESSION_ESCAPE_UNAVAILABLE",
            Self::EscapeWithoutRatio { .. } => "SESSION_ESCAPE_WITHOUT_RATIO",
            Self::IllegalEscape { .. } => "SESSION_ILLEGAL_ESCAPE",
            Self::UnknownCombatant { .. } => "SESSION_UNKNOWN_COMBATANT",
            Self::NotStarted { .. } => "SESSION_NOT_STARTED",
            Self::BattleOver { .. } => "SESSION_BATTLE_OVER",
        }
    }
}
