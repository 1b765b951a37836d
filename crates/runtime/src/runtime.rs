//! High-level battle driver.
//!
//! [`BattleRuntime`] owns one [`BattleSession`] over a [`SheetRoster`] and
//! ticks it until the battle ends, answering input requests through a
//! [`CommandProvider`] and publishing every event on the [`EventBus`].

use std::path::Path;
use std::time::Duration;

use battle_core::{
    Action, BattleError, BattlePhase, BattleSession, ErrorSeverity, Interrupt, LedgerSnapshot,
};
use tokio::sync::broadcast;

use crate::api::{
    AutoCommandProvider, BattleReport, CommandProvider, CommandRequest, Result, RuntimeError,
};
use crate::config::RuntimeConfig;
use crate::events::{BattleJournal, BusPresenter, Event, EventBus, Topic};
use crate::scenario::Scenario;
use crate::sheet::{SheetDecider, SheetResolver, SheetRoster};

/// Drives one battle from start to result.
pub struct BattleRuntime {
    config: RuntimeConfig,
    scenario: String,
    session: BattleSession<SheetRoster>,
    provider: Box<dyn CommandProvider>,
    bus: EventBus,
    journal: BattleJournal,
    ticks: u64,
}

impl BattleRuntime {
    /// Create a new runtime builder
    pub fn builder() -> BattleRuntimeBuilder {
        BattleRuntimeBuilder::new()
    }

    /// Answers pending input, then advances the session by one tick.
    pub async fn step(&mut self) -> Result<BattlePhase> {
        if self.session.phase() == BattlePhase::Input {
            self.collect_commands().await?;
        }
        let phase = self.session.tick()?;
        self.ticks += 1;
        Ok(phase)
    }

    async fn collect_commands(&mut self) -> Result<()> {
        while let Some(subject) = self.session.input_subject() {
            let Some((slot, slots)) = self.session.input_progress() else {
                break;
            };
            let request = CommandRequest {
                subject,
                slot,
                slots,
                can_escape: self.session.can_escape(),
                roster: self.session.roster(),
            };
            let action = self.provider.provide_command(&request).await?;

            match self.session.submit_command(action) {
                Ok(()) => {}
                Err(err) if err.severity() == ErrorSeverity::Validation => {
                    tracing::warn!("Command for {subject} rejected ({err}), guarding instead");
                    self.session.submit_command(Action::guard())?;
                }
                Err(err) => return Err(err.into()),
            }
        }
        Ok(())
    }

    /// Runs the battle to completion and returns the report.
    ///
    /// Ticks are paced by `frame_rate` when it is non-zero. Exceeding
    /// `max_ticks` aborts the battle.
    pub async fn run(&mut self) -> Result<BattleReport> {
        let mut interval = (self.config.frame_rate > 0).then(|| {
            tokio::time::interval(Duration::from_secs_f64(
                1.0 / f64::from(self.config.frame_rate),
            ))
        });
        tracing::info!(
            "Running '{}' (seed {}, {} fps)",
            self.scenario,
            self.session.seed(),
            self.config.frame_rate
        );

        while !self.session.is_over() {
            if self.ticks >= self.config.max_ticks {
                self.session.abort();
                tracing::warn!("'{}' hit the tick limit, battle aborted", self.scenario);
                return Err(RuntimeError::TickLimit {
                    limit: self.config.max_ticks,
                });
            }
            if let Some(interval) = interval.as_mut() {
                interval.tick().await;
            }
            self.step().await?;
        }
        Ok(self.report())
    }

    pub fn report(&self) -> BattleReport {
        BattleReport::from_journal(
            &self.scenario,
            self.session.seed(),
            self.ticks,
            self.session.rounds(),
            self.session.result(),
            &self.journal.events(),
            self.session.roster(),
        )
    }

    /// Subscribe to one topic of battle events
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn journal(&self) -> &BattleJournal {
        &self.journal
    }

    pub fn push_interrupt(&mut self, interrupt: Interrupt) -> Result<()> {
        Ok(self.session.push_interrupt(interrupt)?)
    }

    pub fn session(&self) -> &BattleSession<SheetRoster> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut BattleSession<SheetRoster> {
        &mut self.session
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Writes the current ledger state to `path`.
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.session.ledger_snapshot().to_bytes()?;
        std::fs::write(path, bytes).map_err(|e| RuntimeError::io(path, e))?;
        tracing::debug!("Saved ledger snapshot to {}", path.display());
        Ok(())
    }

    /// Replaces the ledger state with one saved by [`Self::save_snapshot`].
    pub fn restore_snapshot(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| RuntimeError::io(path, e))?;
        let snapshot = LedgerSnapshot::from_bytes(&bytes)?;
        self.session.restore_ledger(&snapshot)?;
        tracing::debug!("Restored ledger snapshot from {}", path.display());
        Ok(())
    }
}

/// Builder for [`BattleRuntime`].
pub struct BattleRuntimeBuilder {
    config: RuntimeConfig,
    scenario: Option<Scenario>,
    provider: Option<Box<dyn CommandProvider>>,
    seed: Option<u64>,
}

impl BattleRuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            scenario: None,
            provider: None,
            seed: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn scenario(mut self, scenario: Scenario) -> Self {
        self.scenario = Some(scenario);
        self
    }

    /// Set the command provider for manually controlled battlers.
    ///
    /// Defaults to [`AutoCommandProvider`].
    pub fn provider(mut self, provider: impl CommandProvider + 'static) -> Self {
        self.provider = Some(Box::new(provider));
        self
    }

    /// Seed taking precedence over both the scenario and the config.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<BattleRuntime> {
        let scenario = self.scenario.ok_or(RuntimeError::MissingScenario)?;
        let battle_config = scenario.battle_config(&self.config.battle);
        battle_config.validate()?;
        scenario.validate(&battle_config)?;

        let mut roster = scenario.build_roster();
        if battle_config.auto_life_skill.is_none() {
            for battler in roster.battlers_mut().iter_mut().filter(|b| b.auto_life) {
                tracing::warn!("No auto-life skill configured, {} will stay down", battler.name);
                battler.auto_life = false;
            }
        }

        let seed = self
            .seed
            .or(scenario.seed)
            .or(self.config.seed)
            .unwrap_or_else(rand::random);
        let bus = EventBus::with_capacity(self.config.event_buffer_size);
        let journal = BattleJournal::default();

        let session = BattleSession::builder(roster)
            .config(battle_config)
            .decider(SheetDecider::new(seed).with_clock(scenario.pattern_clock))
            .resolver(SheetResolver)
            .presenter(BusPresenter::new(bus.clone(), journal.clone()))
            .seed(seed)
            .initiative(scenario.initiative)
            .build()?;

        tracing::debug!(
            "Built runtime for '{}' with {} combatants",
            scenario.name,
            session.combatants().len()
        );

        Ok(BattleRuntime {
            config: self.config,
            scenario: scenario.name,
            session,
            provider: self
                .provider
                .unwrap_or_else(|| Box::new(AutoCommandProvider::default())),
            bus,
            journal,
            ticks: 0,
        })
    }
}
