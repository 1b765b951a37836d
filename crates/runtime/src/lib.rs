//! Async battle runtime on top of the `battle-core` scheduler.
//!
//! This crate supplies what the scheduler leaves to its host: a roster of
//! battlers loaded from RON scenarios, action decision and resolution, command
//! providers for manual input, and a topic-based event bus. Consumers build a
//! [`BattleRuntime`] and either step it themselves or [`run`](BattleRuntime::run)
//! it to completion.
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the driver and builder
//! - [`api`] exposes errors, command providers and the battle report
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`scenario`] and [`sheet`] describe and hold the battlers
pub mod api;
pub mod config;
pub mod events;
pub mod runtime;
pub mod scenario;
pub mod sheet;

pub use api::{
    AutoCommandProvider, BattleReport, CommandProvider, CommandRequest, Result, RuntimeError,
    ScriptedCommandProvider, TurnEntry,
};
pub use config::RuntimeConfig;
pub use events::{BattleJournal, BusPresenter, Event, EventBus, Topic};
pub use runtime::{BattleRuntime, BattleRuntimeBuilder};
pub use scenario::{
    ActionPattern, CombatantSheet, PatternClock, Scenario, SkillScope, SkillSheet,
};
pub use sheet::{Battler, SheetDecider, SheetResolver, SheetRoster};
