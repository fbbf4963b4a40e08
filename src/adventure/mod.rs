//! Text-adventure engine.
//!
//! Content (world, rooms, items, objects, enemies, ASCII art) is read through an
//! [`AssetSource`] and cached per session. Player input is parsed into an
//! [`ActionDescriptor`], routed by the dispatcher, and answered with narration
//! lines. Player progress is written to a [`KeyValueStore`] after every change.

pub mod combat;
pub mod content;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod events;
pub mod lock_compiler;
pub mod parser;
pub mod resolver;
pub mod storage;
pub mod types;

pub use combat::{enemy_damage, player_damage, CombatOutcome};
pub use content::{
    AdventureManifest, AssetSource, ContentRepository, FsAssetSource, MemoryAssetSource,
};
pub use dispatcher::{DispatchState, HELP_LINES};
pub use engine::Adventure;
pub use errors::AdventureError;
pub use events::{EventContext, MAX_NESTED_DEPTH};
pub use lock_compiler::{compile_exit_locks, default_gate_flag, ContentBundle, LockWarning};
pub use parser::{parse, ActionDescriptor, Direction, Verb};
pub use resolver::{normalize_phrase, resolve};
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, PlayerStateStore, SaveBackend, SledKeyValueStore,
    DEFAULT_SAVE_PREFIX, GUEST_IDENTITY,
};
pub use types::*;
