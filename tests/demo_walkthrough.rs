//! Plays the bundled demo adventure from start to finish.

mod common;

use std::path::Path;

use common::memory_backend;
use darkadv::adventure::content::AdventureManifest;
use darkadv::adventure::lock_compiler::{compile_exit_locks, ContentBundle};
use darkadv::adventure::types::Stats;
use darkadv::adventure::Adventure;

fn demo_root() -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("adventures")
}

fn say(adventure: &mut Adventure, input: &str) -> Vec<String> {
    adventure
        .handle_input(input)
        .unwrap_or_else(|e| panic!("input '{}' failed: {}", input, e))
}

#[test]
fn test_demo_manifest() {
    let manifest = AdventureManifest::load(&demo_root(), "adventure").unwrap();
    assert_eq!(manifest.title, "NRW Noir Adventure");
    assert_eq!(manifest.world_file, "world.json");
    assert!(manifest.data_path.ends_with("data"));
}

#[test]
fn test_demo_is_already_compiled() {
    let manifest = AdventureManifest::load(&demo_root(), "adventure").unwrap();
    let authored = ContentBundle::load_dir(&manifest.data_path).unwrap();
    let mut compiled = authored.clone();
    assert!(compile_exit_locks(&mut compiled).is_empty());
    assert_eq!(compiled, authored);
}

#[test]
fn test_demo_walkthrough() {
    let manifest = AdventureManifest::load(&demo_root(), "adventure").unwrap();
    let mut adventure = Adventure::from_manifest(
        &manifest,
        memory_backend(),
        "demo_",
        Some("Kommissarin"),
        Stats::default(),
    );
    let out = adventure.start().unwrap();
    assert!(out.contains(&"Duisburg Hbf, Gleis 13".to_string()));

    assert_eq!(say(&mut adventure, "n"), vec!["Der Weg ist versperrt."]);
    say(&mut adventure, "nimm muenze");
    say(&mut adventure, "kombiniere muenze mit fahrkartenautomat");
    assert!(adventure.state().has_item("ticket"));
    assert_eq!(
        say(&mut adventure, "benutze sperre"),
        vec![
            "Du hältst deine Fahrkarte an das Lesegerät.",
            "Rotes Licht. Kein gültiges Ticket.",
        ]
    );
    say(&mut adventure, "benutze ticket");
    let out = say(&mut adventure, "benutze sperre");
    assert_eq!(out.last().map(String::as_str), Some("Ausgang nord ist nun offen."));

    let out = say(&mut adventure, "o");
    assert!(out.contains(&"Ein Schläger erscheint!".to_string()));
    let mut rounds = 0;
    while adventure.state().in_combat {
        say(&mut adventure, "angriff");
        rounds += 1;
        assert!(rounds < 10, "fight does not end");
    }
    assert_eq!(rounds, 3);
    assert_eq!(adventure.state().stats.hp, 8);
    assert!(adventure.state().has_item("schluessel"));

    say(&mut adventure, "w");
    say(&mut adventure, "kombiniere schluessel mit schliessfach");
    assert!(adventure.state().has_item("akte"));

    say(&mut adventure, "n");
    assert_eq!(adventure.state().location, "vorplatz");
    let out = say(&mut adventure, "benutze taxi");
    assert_eq!(
        out.last().map(String::as_str),
        Some("  * * *  FALL ABGESCHLOSSEN  * * *")
    );
}
