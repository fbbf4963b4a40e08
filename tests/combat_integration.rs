//! Integration tests for fights started by `trigger_fight` room scripts.

mod common;

use std::sync::Arc;

use common::{fixture_root, memory_backend, open_adventure, play};
use darkadv::adventure::{Adventure, DispatchState, KeyValueStore};

const TO_THE_CELLAR: &[&str] = &[
    "nimm draht",
    "nimm lampe",
    "kombiniere draht mit taschenlampe",
    "o",
    "kombiniere dietrich mit kellertuer",
];

fn adventure_in_front_of_cellar(backend: Arc<dyn KeyValueStore>) -> Adventure {
    let mut adventure = open_adventure(&fixture_root(), backend, None);
    adventure.start().unwrap();
    play(&mut adventure, TO_THE_CELLAR);
    adventure
}

#[test]
fn test_entering_cellar_starts_fight() {
    let mut adventure = adventure_in_front_of_cellar(memory_backend());
    let out = play(&mut adventure, &["s"]);
    assert_eq!(
        out,
        vec![
            "Keller",
            "Es riecht nach Öl.",
            "Ausgänge: nord",
            "(\\_/)",
            "Ein Ratte erscheint!",
            "Beschreibung: Fett und schlecht gelaunt.",
            "HP: 3",
        ]
    );
    let state = adventure.state();
    assert!(state.in_combat);
    assert_eq!(DispatchState::of(state), DispatchState::InCombat);
    assert_eq!(state.enemy.as_ref().map(|e| e.stats.hp), Some(3));
}

#[test]
fn test_only_attacks_are_accepted_during_fight() {
    let mut adventure = adventure_in_front_of_cellar(memory_backend());
    play(&mut adventure, &["s"]);
    let before = adventure.state().clone();

    for input in ["n", "nimm draht", "inventar"] {
        let out = play(&mut adventure, &[input]);
        assert_eq!(
            out,
            vec!["Du bist im Kampf! Nutze \"attack\" oder passende Befehle."]
        );
    }
    assert_eq!(adventure.state(), &before);
}

#[test]
fn test_fight_to_victory() {
    let mut adventure = adventure_in_front_of_cellar(memory_backend());
    play(&mut adventure, &["s"]);

    let out = play(&mut adventure, &["angriff"]);
    assert_eq!(
        out,
        vec![
            "Du triffst Ratte für 2 Schaden. (1 HP übrig)",
            "Ratte greift an und verursacht 1 Schaden. (11 HP übrig)",
        ]
    );

    let out = play(&mut adventure, &["attack"]);
    assert_eq!(
        out,
        vec![
            "Du triffst Ratte für 2 Schaden. (0 HP übrig)",
            "Ratte wurde besiegt!",
            "Du erhältst schluesselkarte.",
        ]
    );
    let state = adventure.state();
    assert!(!state.in_combat);
    assert!(state.enemy.is_none());
    assert_eq!(state.stats.hp, 11);
    assert!(state.has_item("schluesselkarte"));

    play(&mut adventure, &["n"]);
    assert_eq!(adventure.state().location, "bar");
}

#[test]
fn test_fight_survives_continue() {
    let backend = memory_backend();
    {
        let mut adventure = adventure_in_front_of_cellar(backend.clone());
        play(&mut adventure, &["s", "angriff"]);
    }

    let mut adventure = open_adventure(&fixture_root(), backend, None);
    let out = adventure.continue_game().unwrap();
    assert_eq!(out[0], "Lade letzten Spielstand...");
    assert!(!out.iter().any(|line| line.starts_with("Ein Ratte")));

    let state = adventure.state();
    assert!(state.in_combat);
    assert_eq!(state.enemy.as_ref().map(|e| e.stats.hp), Some(1));
    assert_eq!(state.stats.hp, 11);

    let out = play(&mut adventure, &["angriff"]);
    assert_eq!(out[1], "Ratte wurde besiegt!");
}
