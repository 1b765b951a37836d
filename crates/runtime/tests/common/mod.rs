#![allow(dead_code)]

use battle_runtime::{BattleRuntime, CommandProvider, RuntimeConfig, Scenario};

/// One strong automatic hero against two slimes.
pub const SKIRMISH: &str = r#"(
    name: "skirmish",
    party: [(name: "Hero", hp: 60, attack: 14, defense: 2, speed: 12.0)],
    troop: [
        (name: "Slime", hp: 12, attack: 4, speed: 8.0),
        (name: "Slime B", hp: 12, attack: 4, speed: 9.0),
    ],
)"#;

/// A manual hero facing a wolf that outclasses it.
pub const AMBUSH: &str = r#"(
    name: "ambush",
    initiative: Preemptive,
    party: [(name: "Hero", hp: 20, attack: 3, speed: 10.0, manual: true)],
    troop: [(name: "Dire Wolf", hp: 200, attack: 9, defense: 5, speed: 11.0)],
)"#;

pub fn scenario(text: &str) -> Scenario {
    Scenario::from_ron_str(text).expect("fixture scenario parses")
}

pub fn runtime(text: &str, seed: u64) -> BattleRuntime {
    BattleRuntime::builder()
        .scenario(scenario(text))
        .seed(seed)
        .build()
        .expect("fixture runtime builds")
}

pub fn runtime_with(
    text: &str,
    seed: u64,
    config: RuntimeConfig,
    provider: impl CommandProvider + 'static,
) -> BattleRuntime {
    BattleRuntime::builder()
        .config(config)
        .scenario(scenario(text))
        .provider(provider)
        .seed(seed)
        .build()
        .expect("fixture runtime builds")
}
