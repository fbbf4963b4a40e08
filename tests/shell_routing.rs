//! Integration tests for shell command routing.

mod common;

use common::{
    fixture_root, fixture_shell, memory_backend, shell_settings, writable_fixture, FIXTURE_ID,
};
use darkadv::config::Config;
use darkadv::shell::Shell;

#[test]
fn test_inactive_shell_rejects_gameplay() {
    let mut shell = fixture_shell();
    assert!(!shell.is_playing());

    let reply = shell.handle_line("nimm lampe");
    assert_eq!(
        reply.lines,
        vec!["Unbekannter Befehl. Tippe \"help\" für eine Übersicht."]
    );
    assert!(!reply.quit);

    let reply = shell.handle_line("help");
    assert_eq!(reply.lines[0], "Befehle:");
    assert!(!reply.lines.iter().any(|l| l == "Adventure-Befehle:"));
}

#[test]
fn test_gameplay_is_forwarded_while_active() {
    let mut shell = fixture_shell();
    let reply = shell.handle_line("start");
    assert_eq!(reply.lines[0], "Starte Adventure...");
    assert!(shell.is_playing());
    assert_eq!(shell.adventure().map(|a| a.id()), Some("noir"));

    let reply = shell.handle_line("nimm lampe");
    assert_eq!(reply.lines, vec!["Du nimmst Taschenlampe."]);

    let reply = shell.handle_line("help");
    assert_eq!(reply.lines[0], "Befehle:");
    assert!(reply.lines.iter().any(|l| l == "Adventure-Befehle:"));

    assert!(shell.handle_line("   ").lines.is_empty());
}

#[test]
fn test_exit_leaves_adventure_then_quits() {
    let mut shell = fixture_shell();
    shell.handle_line("adv start");

    let reply = shell.handle_line("exit");
    assert_eq!(
        reply.lines,
        vec![
            "Du verlässt das Adventure und kehrst ins Darknetz-Terminal zurück.",
            "",
        ]
    );
    assert!(!reply.quit);
    assert!(!shell.is_playing());

    let reply = shell.handle_line("nimm lampe");
    assert!(reply.lines[0].starts_with("Unbekannter Befehl."));

    let reply = shell.handle_line("QUIT");
    assert!(reply.quit);
}

#[test]
fn test_continue_after_exit_keeps_progress() {
    let mut shell = fixture_shell();
    shell.handle_line("start noir");
    shell.handle_line("o");
    shell.handle_line("exit");

    let reply = shell.handle_line("adv continue");
    assert_eq!(reply.lines[0], "Lade letzten Spielstand...");
    assert_eq!(reply.lines[1], "Bar Zur Laterne");
    assert_eq!(shell.adventure().map(|a| a.state().location.as_str()), Some("bar"));
}

#[test]
fn test_reset_starts_over() {
    let mut shell = fixture_shell();
    shell.handle_line("start");
    shell.handle_line("o");
    let reply = shell.handle_line("reset");
    assert_eq!(reply.lines[0], "Starte Adventure...");
    assert_eq!(shell.adventure().map(|a| a.state().location.as_str()), Some("gasse"));
}

#[test]
fn test_missing_adventure_reports_error() {
    let mut shell = fixture_shell();
    let reply = shell.handle_line("start gibtsnicht");
    assert_eq!(reply.lines.len(), 1);
    assert!(reply.lines[0].starts_with("Fehler: "));
    assert!(reply.lines[0].contains("game.json"));
    assert!(!shell.is_playing());
}

#[test]
fn test_shell_from_config_uses_settings() {
    let mut config = Config::default();
    config.adventure.root = fixture_root().display().to_string();
    config.adventure.default_id = "noir".to_string();
    config.player.name = Some("Tester".to_string());

    let shell = Shell::from_config(&config, true).unwrap();
    let mut expected = shell_settings(&fixture_root());
    expected.save_prefix = "darkadv_".to_string();
    assert_eq!(shell.settings(), &expected);
}

#[test]
fn test_shell_shares_one_backend_between_sessions() {
    let backend = memory_backend();
    {
        let mut shell = Shell::new(shell_settings(&fixture_root()), backend.clone());
        shell.handle_line("start");
        shell.handle_line("o");
    }
    let mut shell = Shell::new(shell_settings(&fixture_root()), backend);
    let reply = shell.handle_line("continue");
    assert_eq!(reply.lines[1], "Bar Zur Laterne");
}

#[test]
fn test_session_is_reused_when_manifest_id_differs_from_folder() {
    let tmp = writable_fixture();
    std::fs::write(
        tmp.path().join(FIXTURE_ID).join("game.json"),
        r#"{"id": "noir-case", "title": "Testfall Noir", "dataPath": "./data"}"#,
    )
    .unwrap();
    let mut shell = Shell::new(shell_settings(tmp.path()), memory_backend());

    shell.handle_line("start");
    let first = shell.adventure().map(|a| a.session_id());
    assert_eq!(shell.adventure().map(|a| a.id()), Some("noir-case"));

    shell.handle_line("exit");
    let reply = shell.handle_line("continue noir");
    assert_eq!(reply.lines[0], "Lade letzten Spielstand...");
    assert_eq!(shell.adventure().map(|a| a.session_id()), first);
}
