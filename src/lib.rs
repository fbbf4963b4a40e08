//! # Darkadv - German text-adventure engine
//!
//! Darkadv runs data-driven text adventures: a world is a folder of JSON
//! documents (rooms, items, fixtures, enemies) plus ASCII art, and the player
//! types free-text German commands ("nimm lampe", "geh nord", "kombiniere
//! schluessel mit tor").
//!
//! ## Features
//!
//! - **Free-text parser**: German verbs with English fallbacks and single-letter directions.
//! - **Effect scripts**: Rooms, items and fixtures carry ordered JSON effect lists (messages, flags, item transfer, exit locks, transitions, fights).
//! - **Combat**: Turn-based exchanges against a single enemy with loot drops.
//! - **Persistence**: Player progress is saved per adventure and identity in a sled store.
//! - **Exit-lock compiler**: Authoring-time pass that turns exit metadata into effect scripts.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use darkadv::config::Config;
//! use darkadv::shell::Shell;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let mut shell = Shell::from_config(&config, false)?;
//!     for line in shell.handle_line("start").lines {
//!         println!("{}", line);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`adventure`] - Parser, content cache, effect interpreter, combat and persistence
//! - [`shell`] - Line-oriented command surface (`start`, `continue`, `reset`, `exit`, `help`)
//! - [`config`] - Configuration management and validation
//! - [`logutil`] - Helpers for keeping player text readable in logs

pub mod adventure;
pub mod config;
pub mod logutil;
pub mod shell;
