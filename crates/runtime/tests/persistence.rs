mod common;

use std::io::Write;

use battle_core::{AdvanceMode, BattlePhase};
use battle_runtime::{BattleRuntime, RuntimeConfig, RuntimeError, Scenario};
use tempfile::{NamedTempFile, TempDir};

use common::{SKIRMISH, runtime};

#[test]
fn scenario_loads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SKIRMISH.as_bytes()).unwrap();

    let scenario = Scenario::load(file.path()).unwrap();

    assert_eq!(scenario.name, "skirmish");
    assert_eq!(scenario.troop.len(), 2);
}

#[test]
fn missing_scenario_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Scenario::load(dir.path().join("nope.ron")).unwrap_err();
    assert!(matches!(err, RuntimeError::Io { .. }));
}

#[test]
fn runtime_config_loads_partial_ron() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"(frame_rate: 30, seed: Some(5), battle: (advance_mode: UntilReady))")
        .unwrap();

    let config = RuntimeConfig::load(file.path()).unwrap();

    assert_eq!(config.frame_rate, 30);
    assert_eq!(config.seed, Some(5));
    assert_eq!(config.battle.advance_mode, AdvanceMode::UntilReady);
    assert_eq!(config.event_buffer_size, RuntimeConfig::default().event_buffer_size);
}

#[test]
fn invalid_battle_config_is_rejected_on_load() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(b"(battle: (threshold: 0))").unwrap();

    let err = RuntimeConfig::load(file.path()).unwrap_err();

    assert!(matches!(err, RuntimeError::Config(_)));
}

#[test]
fn scenario_seed_is_used_when_the_builder_has_none() {
    let seeded = SKIRMISH.replace("name: \"skirmish\",", "name: \"skirmish\", seed: Some(1234),");
    let runtime = BattleRuntime::builder()
        .scenario(Scenario::from_ron_str(&seeded).unwrap())
        .build()
        .unwrap();
    assert_eq!(runtime.session().seed(), 1234);
}

#[tokio::test]
async fn ledger_snapshot_round_trips_through_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.bin");
    let mut runtime = runtime(SKIRMISH, 17);
    for _ in 0..20 {
        runtime.step().await.unwrap();
    }
    assert_ne!(runtime.session().phase(), BattlePhase::BattleEnd);
    let saved = runtime.session().ledger_snapshot();
    runtime.save_snapshot(&path).unwrap();

    while !runtime.session().is_over() && runtime.session().ledger_snapshot() == saved {
        runtime.step().await.unwrap();
    }
    if runtime.session().is_over() {
        return;
    }
    runtime.restore_snapshot(&path).unwrap();

    assert_eq!(runtime.session().ledger_snapshot(), saved);
}

#[test]
fn corrupt_snapshot_file_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("ledger.bin");
    std::fs::write(&path, [0xff, 0x01]).unwrap();
    let mut runtime = runtime(SKIRMISH, 17);

    let err = runtime.restore_snapshot(&path).unwrap_err();

    assert!(matches!(err, RuntimeError::Snapshot(_)));
}
