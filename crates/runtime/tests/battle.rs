mod common;

use battle_core::{
    Action, ActionKind, AdvanceMode, BattleEvent, BattlePhase, BattleResult, Interrupt,
};
use battle_runtime::{
    AutoCommandProvider, Event, RuntimeConfig, RuntimeError, ScriptedCommandProvider, Topic,
};

use common::{AMBUSH, SKIRMISH, runtime, runtime_with};

#[tokio::test]
async fn automatic_party_wins_the_skirmish() {
    let mut runtime = runtime(SKIRMISH, 11);

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Victory));
    assert_eq!(report.survivors, vec!["Hero".to_string()]);
    assert!(report.turns.iter().any(|turn| turn.subject == "Hero"));
    assert!(report.ticks > 0);
    assert_eq!(report.escape_attempts, 0);
}

#[tokio::test]
async fn same_seed_replays_the_same_battle() {
    let first = runtime(SKIRMISH, 99).run().await.unwrap();
    let second = runtime(SKIRMISH, 99).run().await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn preemptive_escape_succeeds_on_the_opening_turn() {
    let mut runtime = runtime_with(
        AMBUSH,
        3,
        RuntimeConfig::default(),
        ScriptedCommandProvider::new([Action::escape()]),
    );

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Escaped));
    assert_eq!(report.escape_attempts, 1);
    assert_eq!(report.turns[0].subject, "Hero");
    assert_eq!(report.survivors, vec!["Hero".to_string(), "Dire Wolf".to_string()]);
}

#[tokio::test]
async fn fleeing_auto_provider_leaves_the_battle() {
    let mut runtime = runtime_with(
        AMBUSH,
        5,
        RuntimeConfig::default(),
        AutoCommandProvider::fleeing(),
    );

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Escaped));
}

#[tokio::test]
async fn rejected_escape_falls_back_to_guarding() {
    let boss = AMBUSH.replace("initiative: Preemptive,", "can_escape: Some(false),");
    let mut runtime = runtime_with(
        &boss,
        8,
        RuntimeConfig::default(),
        ScriptedCommandProvider::new([Action::escape()]),
    );

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Defeat));
    assert_eq!(report.escape_attempts, 0);
    assert!(!runtime.session().can_escape());
}

#[tokio::test]
async fn outcome_topic_brackets_the_battle() {
    let mut runtime = runtime(SKIRMISH, 21);
    let mut outcome = runtime.subscribe(Topic::Outcome);
    let mut turns = runtime.subscribe(Topic::Turn);

    runtime.run().await.unwrap();

    let mut events = Vec::new();
    while let Ok(event) = outcome.try_recv() {
        events.push(event);
    }
    assert!(matches!(
        events.first(),
        Some(Event::Battle(BattleEvent::BattleStarted { .. }))
    ));
    assert_eq!(
        events.last(),
        Some(&Event::Battle(BattleEvent::BattleEnded {
            result: BattleResult::Victory
        }))
    );
    assert!(matches!(turns.try_recv(), Ok(Event::Battle(_))));
}

#[tokio::test]
async fn journal_records_every_turn() {
    let mut runtime = runtime(SKIRMISH, 4);
    let report = runtime.run().await.unwrap();

    let ended = runtime
        .journal()
        .events()
        .iter()
        .filter(|event| matches!(event, BattleEvent::TurnEnded { .. }))
        .count();
    assert_eq!(ended, report.turns.len());
}

#[tokio::test]
async fn tick_limit_aborts_the_battle() {
    let config = RuntimeConfig {
        max_ticks: 3,
        ..RuntimeConfig::default()
    };
    let mut runtime = runtime_with(SKIRMISH, 1, config, AutoCommandProvider::default());

    let err = runtime.run().await.unwrap_err();

    assert!(matches!(err, RuntimeError::TickLimit { limit: 3 }));
    assert_eq!(runtime.session().result(), Some(BattleResult::Aborted));
}

#[tokio::test]
async fn paced_run_until_ready_finishes() {
    let mut config = RuntimeConfig {
        frame_rate: 2_000,
        ..RuntimeConfig::default()
    };
    config.battle.advance_mode = AdvanceMode::UntilReady;
    let mut runtime = runtime_with(SKIRMISH, 2, config, AutoCommandProvider::default());

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Victory));
}

#[tokio::test]
async fn interrupt_lets_a_combatant_act_out_of_turn() {
    let mut runtime = runtime(SKIRMISH, 6);
    let hero = runtime.session().roster().battlers()[0].id;

    runtime.step().await.unwrap();
    assert_eq!(runtime.session().phase(), BattlePhase::Waiting);
    runtime.push_interrupt(Interrupt::Combatant(hero)).unwrap();

    while runtime.session().subject().is_none() {
        runtime.step().await.unwrap();
    }
    let turns = runtime.report().turns;
    let first = &turns[0];
    assert_eq!(first.subject, "Hero");
    assert!(first.interrupt);
}

#[tokio::test]
async fn missing_scenario_is_reported() {
    let err = battle_runtime::BattleRuntime::builder()
        .build()
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::MissingScenario));
}

#[tokio::test]
async fn auto_life_revives_the_fallen_before_defeat() {
    let scenario = r#"(
        name: "last stand",
        auto_life_skill: Some(9),
        party: [(name: "Cleric", hp: 1, attack: 1, speed: 5.0, auto_life: true)],
        troop: [(name: "Ogre", hp: 500, attack: 50, speed: 20.0)],
        skills: [(id: 9, name: "Reraise", scope: Ally, power: 5, revive: true)],
    )"#;
    let mut runtime = runtime(scenario, 12);

    let report = runtime.run().await.unwrap();

    assert_eq!(report.result, Some(BattleResult::Defeat));
    let revivals = report
        .turns
        .iter()
        .filter(|turn| turn.subject == "<auto_life>" && turn.interrupt)
        .count();
    assert_eq!(revivals, 1);
}

/// A golem that only casts Quake during round 2.
const QUAKE: &str = r#"(
    name: "quake",
    party: [(name: "Hero", hp: 500, attack: 1, speed: 10.0)],
    troop: [(
        name: "Golem",
        hp: 5000,
        attack: 1,
        speed: 30.0,
        patterns: [(skill: Some(3), condition: Some((start: 2, every: 0)))],
    )],
    skills: [(id: 3, name: "Quake", scope: AllEnemies, power: 2)],
)"#;

#[tokio::test]
async fn enemy_patterns_fire_on_round_rollover() {
    let mut runtime = runtime(QUAKE, 8);
    for _ in 0..20_000 {
        if runtime.session().rounds() >= 3 || runtime.session().is_over() {
            break;
        }
        runtime.step().await.unwrap();
    }
    assert!(runtime.session().rounds() >= 3);
    let golem = runtime.session().roster().battlers()[1].id;

    let mut round = 0;
    let mut quakes = Vec::new();
    let mut golem_turns_in_round_one = 0;
    for event in runtime.journal().events() {
        match event {
            BattleEvent::RoundElapsed { round: elapsed } => round = elapsed,
            BattleEvent::ActionStarted { action, .. } if action.kind == ActionKind::Skill(3) => {
                quakes.push(round);
            }
            BattleEvent::ActionStarted { subject, action }
                if subject.combatant() == Some(golem) && round == 1 =>
            {
                assert_eq!(action.kind, ActionKind::Attack);
                golem_turns_in_round_one += 1;
            }
            _ => {}
        }
    }
    assert!(!quakes.is_empty());
    assert!(quakes.iter().all(|&round| round == 2));
    // Several golem turns in round 1 would have reached turn 2 on a per-turn clock.
    assert!(golem_turns_in_round_one >= 2);
}
