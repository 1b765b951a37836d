//! Public runtime API surface.
//!
//! Types exposed to consumers of the runtime crate: errors, the command
//! provider abstraction, and the end-of-battle report.

pub mod errors;
pub mod providers;
pub mod report;

pub use errors::{Result, RuntimeError};
pub use providers::{
    AutoCommandProvider, CommandProvider, CommandRequest, ScriptedCommandProvider,
};
pub use report::{BattleReport, TurnEntry};
