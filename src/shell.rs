//! Line-oriented command surface in front of the adventure engine.
//!
//! Shell commands (optionally prefixed with `adv`):
//! - `start [id]` - new run of an adventure
//! - `continue [id]` - resume the saved run
//! - `reset [id]` - delete the save and start over
//! - `exit` / `quit` - leave the adventure, or end the program when none is active
//! - `help` - command summary
//!
//! While an adventure is active every other line is gameplay input.

use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info};

use crate::adventure::content::AdventureManifest;
use crate::adventure::engine::Adventure;
use crate::adventure::errors::AdventureError;
use crate::adventure::storage::{KeyValueStore, SaveBackend};
use crate::adventure::types::Stats;
use crate::config::Config;
use crate::logutil::{escape_log, summarize_lines};

const SHELL_HELP: &[&str] = &[
    "Befehle:",
    "start [id]     - Neues Abenteuer starten",
    "continue [id]  - Letzten Spielstand laden",
    "reset [id]     - Spielstand zurücksetzen",
    "exit | quit    - Adventure verlassen bzw. Terminal beenden",
    "help           - Diese Hilfe",
    "Während des Adventures werden Eingaben direkt interpretiert.",
];

/// Everything the shell needs to open adventure sessions.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellSettings {
    pub adventure_root: PathBuf,
    pub default_id: String,
    pub save_prefix: String,
    pub identity: Option<String>,
    pub stats: Stats,
}

impl ShellSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            adventure_root: PathBuf::from(&config.adventure.root),
            default_id: config.adventure.default_id.clone(),
            save_prefix: config.storage.save_prefix.clone(),
            identity: config.player.name.clone(),
            stats: config.player.stats,
        }
    }
}

/// Output of one shell line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellReply {
    pub lines: Vec<String>,
    /// The user asked to end the program.
    pub quit: bool,
}

impl ShellReply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SessionCommand {
    Start,
    Continue,
    Reset,
}

enum ShellCommand<'a> {
    Session(SessionCommand, Option<&'a str>),
    Exit,
    Help,
    Gameplay,
}

fn classify(line: &str) -> ShellCommand<'_> {
    let mut tokens = line.split_whitespace().peekable();
    if tokens
        .peek()
        .is_some_and(|first| first.eq_ignore_ascii_case("adv"))
    {
        tokens.next();
    }
    let Some(command) = tokens.next() else {
        return ShellCommand::Gameplay;
    };
    let argument = tokens.next();
    match command.to_lowercase().as_str() {
        "start" => ShellCommand::Session(SessionCommand::Start, argument),
        "continue" => ShellCommand::Session(SessionCommand::Continue, argument),
        "reset" => ShellCommand::Session(SessionCommand::Reset, argument),
        "exit" | "quit" => ShellCommand::Exit,
        "help" => ShellCommand::Help,
        _ => ShellCommand::Gameplay,
    }
}

pub struct Shell {
    settings: ShellSettings,
    backend: Arc<dyn KeyValueStore>,
    adventure: Option<Adventure>,
    /// Folder id the current adventure was opened from.
    opened_id: Option<String>,
}

impl Shell {
    pub fn new(settings: ShellSettings, backend: Arc<dyn KeyValueStore>) -> Self {
        Self {
            settings,
            backend,
            adventure: None,
            opened_id: None,
        }
    }

    /// Build a shell from configuration. `ephemeral` keeps saves in memory.
    pub fn from_config(config: &Config, ephemeral: bool) -> Result<Self, AdventureError> {
        let backend = if ephemeral {
            SaveBackend::Memory
        } else {
            SaveBackend::Sled(PathBuf::from(&config.storage.save_path))
        };
        Ok(Self::new(ShellSettings::from_config(config), backend.open()?))
    }

    pub fn settings(&self) -> &ShellSettings {
        &self.settings
    }

    /// The most recently opened adventure, active or not.
    pub fn adventure(&self) -> Option<&Adventure> {
        self.adventure.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.adventure.as_ref().is_some_and(Adventure::is_active)
    }

    pub fn banner(&self) -> Vec<String> {
        vec![
            "Darknetz-Terminal bereit.".to_string(),
            "Tippe \"help\" für eine Übersicht.".to_string(),
        ]
    }

    /// Handle one raw input line.
    pub fn handle_line(&mut self, line: &str) -> ShellReply {
        let line = line.trim();
        let reply = match classify(line) {
            ShellCommand::Session(command, id) => ShellReply::lines(self.run_session(command, id)),
            ShellCommand::Exit => match self.adventure.as_mut().filter(|adv| adv.is_active()) {
                Some(adventure) => ShellReply::lines(adventure.exit()),
                None => ShellReply {
                    lines: vec!["Verbindung getrennt.".to_string()],
                    quit: true,
                },
            },
            ShellCommand::Help => {
                let mut lines: Vec<String> = SHELL_HELP.iter().map(|l| l.to_string()).collect();
                if self.is_playing() {
                    lines.extend(Adventure::help());
                }
                ShellReply::lines(lines)
            }
            ShellCommand::Gameplay if line.is_empty() => ShellReply::default(),
            ShellCommand::Gameplay => ShellReply::lines(self.forward(line)),
        };
        debug!(
            "shell '{}' -> {}",
            escape_log(line),
            summarize_lines(&reply.lines)
        );
        reply
    }

    fn forward(&mut self, line: &str) -> Vec<String> {
        match self.adventure.as_mut().filter(|adv| adv.is_active()) {
            Some(adventure) => adventure
                .handle_input(line)
                .unwrap_or_else(|e| failure_lines(&e)),
            None => vec!["Unbekannter Befehl. Tippe \"help\" für eine Übersicht.".to_string()],
        }
    }

    fn run_session(&mut self, command: SessionCommand, id: Option<&str>) -> Vec<String> {
        let id = id.unwrap_or(self.settings.default_id.as_str()).to_string();
        let result = self.open(&id).and_then(|adventure| match command {
            SessionCommand::Start => adventure.start(),
            SessionCommand::Continue => adventure.continue_game(),
            SessionCommand::Reset => adventure.reset(),
        });
        result.unwrap_or_else(|e| failure_lines(&e))
    }

    /// The session for `id`, reusing the open one when it matches.
    fn open(&mut self, id: &str) -> Result<&mut Adventure, AdventureError> {
        let reuse = self.adventure.is_some() && self.opened_id.as_deref() == Some(id);
        if !reuse {
            let manifest = AdventureManifest::load(&self.settings.adventure_root, id)?;
            info!(
                "Opening adventure '{}' ({}) from {}",
                manifest.id,
                manifest.title,
                manifest.base_path.display()
            );
            self.adventure = Some(Adventure::from_manifest(
                &manifest,
                self.backend.clone(),
                &self.settings.save_prefix,
                self.settings.identity.as_deref(),
                self.settings.stats,
            ));
            self.opened_id = Some(id.to_string());
        }
        self.adventure.as_mut().ok_or(AdventureError::NoSession)
    }
}

fn failure_lines(err: &AdventureError) -> Vec<String> {
    error!("Adventure error: {}", err);
    vec![format!("Fehler: {}", err)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adv_prefix_is_optional() {
        assert!(matches!(
            classify("adv start noir"),
            ShellCommand::Session(SessionCommand::Start, Some("noir"))
        ));
        assert!(matches!(
            classify("CONTINUE"),
            ShellCommand::Session(SessionCommand::Continue, None)
        ));
        assert!(matches!(classify("quit"), ShellCommand::Exit));
        assert!(matches!(classify("adv help"), ShellCommand::Help));
        assert!(matches!(classify("nimm lampe"), ShellCommand::Gameplay));
        assert!(matches!(classify("adv"), ShellCommand::Gameplay));
    }
}
