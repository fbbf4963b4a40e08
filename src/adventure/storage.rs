use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::adventure::errors::AdventureError;
use crate::adventure::types::{Enemy, FlagValue, PlayerState, Stats};

const TREE_SAVES: &str = "darkadv_saves";

/// Identity used when no player name is known.
pub const GUEST_IDENTITY: &str = "guest";

/// Default prefix of save keys.
pub const DEFAULT_SAVE_PREFIX: &str = "darkadv_";

/// Minimal persistent key/value contract used for save games.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdventureError>;
    fn put(&self, key: &str, value: &[u8]) -> Result<(), AdventureError>;
    fn remove(&self, key: &str) -> Result<(), AdventureError>;
}

/// Sled-backed key/value store.
pub struct SledKeyValueStore {
    _db: sled::Db,
    saves: sled::Tree,
}

impl SledKeyValueStore {
    /// Open (or create) the store rooted at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, AdventureError> {
        let path_ref = path.as_ref();
        std::fs::create_dir_all(path_ref)?;
        let db = sled::open(path_ref)?;
        let saves = db.open_tree(TREE_SAVES)?;
        Ok(Self { _db: db, saves })
    }
}

impl KeyValueStore for SledKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdventureError> {
        Ok(self.saves.get(key.as_bytes())?.map(|bytes| bytes.to_vec()))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), AdventureError> {
        self.saves.insert(key.as_bytes(), value)?;
        self.saves.flush()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AdventureError> {
        self.saves.remove(key.as_bytes())?;
        self.saves.flush()?;
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: std::sync::Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>> {
        // A poisoned map is still a usable map.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdventureError> {
        Ok(self.entries().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), AdventureError> {
        self.entries().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AdventureError> {
        self.entries().remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Arc<S> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AdventureError> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), AdventureError> {
        (**self).put(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), AdventureError> {
        (**self).remove(key)
    }
}

/// On-disk shape of a save. Every field is optional so that older or partial
/// records merge onto the current state field by field.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerStateRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inventory: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    flags: Option<BTreeMap<String, FlagValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    stats: Option<Stats>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    in_combat: Option<bool>,
    #[serde(default, deserialize_with = "present")]
    enemy: Option<Option<Enemy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    visited: Option<BTreeSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    locked_exits: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    taken_items: Option<BTreeSet<String>>,
}

/// Distinguishes `"enemy": null` (present, no enemy) from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<Enemy>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Enemy>::deserialize(deserializer).map(Some)
}

impl PlayerStateRecord {
    fn capture(state: &PlayerState) -> Self {
        Self {
            location: Some(state.location.clone()),
            inventory: Some(state.inventory.clone()),
            flags: Some(state.flags.clone()),
            stats: Some(state.stats),
            in_combat: Some(state.in_combat),
            enemy: Some(state.enemy.clone()),
            visited: Some(state.visited.clone()),
            locked_exits: Some(state.locked_exits.clone()),
            taken_items: Some(state.taken_items.clone()),
        }
    }

    fn apply_to(self, state: &mut PlayerState) {
        if let Some(location) = self.location {
            state.location = location;
        }
        if let Some(inventory) = self.inventory {
            state.inventory = Vec::new();
            for id in inventory {
                state.add_item(&id);
            }
        }
        if let Some(flags) = self.flags {
            state.flags = flags;
        }
        if let Some(stats) = self.stats {
            state.stats = stats;
        }
        if let Some(in_combat) = self.in_combat {
            state.in_combat = in_combat;
        }
        if let Some(enemy) = self.enemy {
            state.enemy = enemy;
        }
        if let Some(visited) = self.visited {
            state.visited = visited;
        }
        if let Some(locked_exits) = self.locked_exits {
            state.locked_exits = locked_exits;
        }
        if let Some(taken_items) = self.taken_items {
            state.taken_items = taken_items;
        }
        state.normalize_combat();
    }
}

/// Persists the player-state record of one identity in one adventure.
pub struct PlayerStateStore {
    backend: Box<dyn KeyValueStore>,
    key: String,
}

impl PlayerStateStore {
    /// `identity` falls back to [`GUEST_IDENTITY`] when absent or blank.
    pub fn new(
        backend: impl KeyValueStore + 'static,
        prefix: &str,
        adventure_id: &str,
        identity: Option<&str>,
    ) -> Self {
        let identity = identity
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(GUEST_IDENTITY);
        Self {
            backend: Box::new(backend),
            key: format!(
                "{}{}:{}",
                prefix,
                adventure_id,
                identity.to_lowercase()
            ),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, state: &PlayerState) -> Result<(), AdventureError> {
        let bytes = serde_json::to_vec(&PlayerStateRecord::capture(state))?;
        self.backend.put(&self.key, &bytes)?;
        debug!("Saved player state under {}", self.key);
        Ok(())
    }

    /// Merge the saved record onto `state`. Returns false when there is no
    /// save or the save is unreadable; in both cases `state` is untouched.
    pub fn load(&self, state: &mut PlayerState) -> Result<bool, AdventureError> {
        let Some(bytes) = self.backend.get(&self.key)? else {
            return Ok(false);
        };
        match parse_record(&bytes) {
            Ok(record) => {
                record.apply_to(state);
                debug!("Loaded player state from {}", self.key);
                Ok(true)
            }
            Err(e) => {
                let err = AdventureError::SaveCorruption(e);
                warn!("Ignoring save {}: {}", self.key, err);
                Ok(false)
            }
        }
    }

    pub fn clear(&self) -> Result<(), AdventureError> {
        self.backend.remove(&self.key)
    }
}

/// A save must be a JSON object; anything else counts as corrupt.
fn parse_record(bytes: &[u8]) -> Result<PlayerStateRecord, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(<serde_json::Error as serde::de::Error>::custom(
            "save record is not a JSON object",
        ));
    }
    serde_json::from_value(value)
}

/// Where saves go when the session is configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveBackend {
    Sled(PathBuf),
    Memory,
}

impl SaveBackend {
    /// Open the backend once; sessions share the handle.
    pub fn open(&self) -> Result<Arc<dyn KeyValueStore>, AdventureError> {
        Ok(match self {
            SaveBackend::Sled(path) => Arc::new(SledKeyValueStore::open(path)?),
            SaveBackend::Memory => Arc::new(MemoryKeyValueStore::new()),
        })
    }
}
