//! Content repository with load-if-absent caching.
//!
//! Documents are fetched through an [`AssetSource`] by id-derived path and kept
//! as immutable templates for the rest of the session. Callers receive clones;
//! per-player changes (taken items, unlocked exits) live in
//! [`PlayerState`](super::types::PlayerState), never in the cache.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use log::debug;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::adventure::errors::AdventureError;
use crate::adventure::types::{Enemy, GameObject, Item, Room, World};

const DEFAULT_TITLE: &str = "NRW Noir Adventure";
const DEFAULT_DATA_DIR: &str = "data";
const DEFAULT_WORLD_FILE: &str = "world.json";
const MANIFEST_FILE: &str = "game.json";

/// Fetch-by-path contract for adventure assets.
pub trait AssetSource {
    /// Return the text stored at `path`, relative to the adventure data root.
    fn fetch(&self, path: &str) -> Result<String, AdventureError>;
}

/// Reads assets from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetSource for FsAssetSource {
    fn fetch(&self, path: &str) -> Result<String, AdventureError> {
        let full = self.root.join(path);
        std::fs::read_to_string(&full)
            .map_err(|e| AdventureError::load(full.display().to_string(), e))
    }
}

/// In-memory assets keyed by path. Used by tests and embedded demos.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    files: HashMap<String, String>,
}

impl MemoryAssetSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, path: impl Into<String>, body: impl Into<String>) {
        self.files.insert(path.into(), body.into());
    }

    /// Builder-style insert of a JSON document.
    pub fn with_json(mut self, path: &str, value: serde_json::Value) -> Self {
        self.insert(path, value.to_string());
        self
    }

    pub fn with_text(mut self, path: &str, body: &str) -> Self {
        self.insert(path, body);
        self
    }
}

impl AssetSource for MemoryAssetSource {
    fn fetch(&self, path: &str) -> Result<String, AdventureError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| AdventureError::load(path, "not found"))
    }
}

/// Reject ids that would escape the data root once turned into a path.
fn checked_path(kind: &str, id: &str) -> Result<String, AdventureError> {
    let path = format!("{}/{}.json", kind, id);
    let safe = !id.is_empty()
        && Path::new(id)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        && !id.contains('/')
        && !id.contains('\\');
    if safe {
        Ok(path)
    } else {
        Err(AdventureError::load(path, "invalid id"))
    }
}

/// Cache of content documents for one adventure.
pub struct ContentRepository {
    source: Box<dyn AssetSource>,
    world_file: String,
    world: Option<World>,
    rooms: HashMap<String, Room>,
    items: HashMap<String, Item>,
    objects: HashMap<String, GameObject>,
    enemies: HashMap<String, Enemy>,
    art: HashMap<String, String>,
}

impl ContentRepository {
    pub fn new(source: impl AssetSource + 'static) -> Self {
        Self::with_world_file(source, DEFAULT_WORLD_FILE)
    }

    pub fn with_world_file(source: impl AssetSource + 'static, world_file: &str) -> Self {
        Self {
            source: Box::new(source),
            world_file: world_file.to_string(),
            world: None,
            rooms: HashMap::new(),
            items: HashMap::new(),
            objects: HashMap::new(),
            enemies: HashMap::new(),
            art: HashMap::new(),
        }
    }

    fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AdventureError> {
        let body = self.source.fetch(path)?;
        serde_json::from_str(&body).map_err(|source| AdventureError::ContentParse {
            path: path.to_string(),
            source,
        })
    }

    pub fn world(&mut self) -> Result<World, AdventureError> {
        if let Some(world) = &self.world {
            return Ok(world.clone());
        }
        let world: World = self.fetch_json(&self.world_file)?;
        debug!("World loaded: {} (start room {})", world.id, world.start_room);
        self.world = Some(world.clone());
        Ok(world)
    }

    pub fn room(&mut self, id: &str) -> Result<Room, AdventureError> {
        if let Some(room) = self.rooms.get(id) {
            debug!("Room cache hit: {}", id);
            return Ok(room.clone());
        }
        debug!("Room cache miss: {}", id);
        let room: Room = self.fetch_json(&checked_path("rooms", id)?)?;
        self.rooms.insert(id.to_string(), room.clone());
        Ok(room)
    }

    pub fn item(&mut self, id: &str) -> Result<Item, AdventureError> {
        if let Some(item) = self.items.get(id) {
            return Ok(item.clone());
        }
        let item: Item = self.fetch_json(&checked_path("items", id)?)?;
        self.items.insert(id.to_string(), item.clone());
        Ok(item)
    }

    pub fn object(&mut self, id: &str) -> Result<GameObject, AdventureError> {
        if let Some(object) = self.objects.get(id) {
            return Ok(object.clone());
        }
        let object: GameObject = self.fetch_json(&checked_path("objects", id)?)?;
        self.objects.insert(id.to_string(), object.clone());
        Ok(object)
    }

    pub fn enemy(&mut self, id: &str) -> Result<Enemy, AdventureError> {
        if let Some(enemy) = self.enemies.get(id) {
            return Ok(enemy.clone());
        }
        let enemy: Enemy = self.fetch_json(&checked_path("enemies", id)?)?;
        self.enemies.insert(id.to_string(), enemy.clone());
        Ok(enemy)
    }

    /// Plain-text art, cached like documents.
    pub fn art(&mut self, path: &str) -> Result<String, AdventureError> {
        if let Some(text) = self.art.get(path) {
            return Ok(text.clone());
        }
        if path.split(['/', '\\']).any(|part| part == "..") {
            return Err(AdventureError::load(path, "invalid path"));
        }
        let text = self.source.fetch(path)?;
        self.art.insert(path.to_string(), text.clone());
        Ok(text)
    }

    /// Drop every cached document. The next access refetches from the source.
    pub fn clear_cache(&mut self) {
        self.world = None;
        self.rooms.clear();
        self.items.clear();
        self.objects.clear();
        self.enemies.clear();
        self.art.clear();
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestFile {
    id: Option<String>,
    title: Option<String>,
    data_path: Option<String>,
    world_file: Option<String>,
}

/// Resolved `game.json` of one adventure folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdventureManifest {
    pub id: String,
    pub title: String,
    pub base_path: PathBuf,
    pub data_path: PathBuf,
    pub world_file: String,
}

fn resolve_relative(base: &Path, relative: &str) -> PathBuf {
    let trimmed = relative.trim_start_matches("./").trim_end_matches('/');
    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}

impl AdventureManifest {
    /// Load `<root>/<id>/game.json`. Missing keys fall back to defaults; a
    /// missing manifest is a load error.
    pub fn load(root: &Path, adventure_id: &str) -> Result<Self, AdventureError> {
        let base_path = root.join(adventure_id);
        let manifest_path = base_path.join(MANIFEST_FILE);
        let body = std::fs::read_to_string(&manifest_path)
            .map_err(|e| AdventureError::load(manifest_path.display().to_string(), e))?;
        let manifest: ManifestFile =
            serde_json::from_str(&body).map_err(|source| AdventureError::ContentParse {
                path: manifest_path.display().to_string(),
                source,
            })?;

        let data_path = resolve_relative(
            &base_path,
            manifest.data_path.as_deref().unwrap_or(DEFAULT_DATA_DIR),
        );
        Ok(Self {
            id: manifest.id.unwrap_or_else(|| adventure_id.to_string()),
            title: manifest.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            base_path,
            data_path,
            world_file: manifest
                .world_file
                .unwrap_or_else(|| DEFAULT_WORLD_FILE.to_string()),
        })
    }

    /// A repository reading this adventure's data directory.
    pub fn repository(&self) -> ContentRepository {
        ContentRepository::with_world_file(FsAssetSource::new(&self.data_path), &self.world_file)
    }
}
