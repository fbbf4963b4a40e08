use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Scalar stored in a player flag or compared by `flag_if`.
pub type FlagValue = Value;

/// An ordered effect script attached to a room, item or object trigger.
pub type Script = Vec<Step>;

/// One entry of an effect script.
///
/// Authored content may contain effect kinds this engine does not know about.
/// Those records are kept verbatim so they survive a load/save cycle and are
/// reported at run time instead of failing the whole document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Effect(Effect),
    Unrecognized(Value),
}

impl Step {
    /// The `type` tag of an unrecognised record, for diagnostics.
    pub fn unrecognized_kind(&self) -> Option<&str> {
        match self {
            Step::Effect(_) => None,
            Step::Unrecognized(raw) => Some(
                raw.get("type")
                    .and_then(Value::as_str)
                    .unwrap_or("unbenannt"),
            ),
        }
    }
}

impl From<Effect> for Step {
    fn from(effect: Effect) -> Self {
        Step::Effect(effect)
    }
}

/// A typed effect record. Effects are data; `events::EventInterpreter` is the
/// only thing that executes them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    Message {
        text: String,
    },
    #[serde(rename = "ascii")]
    RenderArt {
        file: String,
        #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
        font_size: Option<u32>,
    },
    #[serde(rename = "flag_set")]
    SetFlag {
        key: String,
        #[serde(default)]
        value: FlagValue,
    },
    #[serde(rename = "flag_if")]
    BranchOnFlag {
        key: String,
        #[serde(default)]
        equals: FlagValue,
        #[serde(default)]
        then: Script,
        #[serde(rename = "else", default)]
        otherwise: Script,
    },
    AddItem {
        id: String,
    },
    RemoveItem {
        id: String,
    },
    UnlockExit {
        room: String,
        direction: String,
    },
    LockExit {
        room: String,
        direction: String,
    },
    Transition {
        to: String,
    },
    #[serde(rename = "trigger_fight")]
    StartCombat {
        enemy: String,
    },
}

impl Effect {
    pub fn message(text: impl Into<String>) -> Self {
        Effect::Message { text: text.into() }
    }
}

/// Reference to a plain-text art asset. Authored either as a bare path or as
/// `{ "file": ..., "fontSize": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArtRef {
    Path(String),
    File {
        file: String,
        #[serde(rename = "fontSize", default, skip_serializing_if = "Option::is_none")]
        font_size: Option<u32>,
    },
}

impl ArtRef {
    pub fn file(&self) -> &str {
        match self {
            ArtRef::Path(path) => path,
            ArtRef::File { file, .. } => file,
        }
    }
}

fn default_hp() -> i32 {
    1
}

fn default_attack() -> i32 {
    1
}

/// Combat stat block shared by the player and enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default = "default_hp")]
    pub hp: i32,
    #[serde(default = "default_attack")]
    pub attack: i32,
    #[serde(default)]
    pub defense: i32,
}

impl Stats {
    pub const fn new(hp: i32, attack: i32, defense: i32) -> Self {
        Self {
            hp,
            attack,
            defense,
        }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new(12, 2, 1)
    }
}

/// Generic narration lines, overridable per world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Messages {
    pub cannot_go: String,
    pub cannot_take: String,
    pub unknown_command: String,
    pub path_blocked: String,
    pub not_pickable: String,
    pub nothing_special: String,
    pub missing_item: String,
    pub cannot_combine: String,
    pub inventory_empty: String,
    pub combat_in_progress: String,
    #[serde(alias = "noEnemy")]
    pub combat_refusal: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            cannot_go: "Da geht es nicht weiter.".to_string(),
            cannot_take: "Das kannst du nicht nehmen.".to_string(),
            unknown_command: "Unbekannter Befehl.".to_string(),
            path_blocked: "Der Weg ist versperrt.".to_string(),
            not_pickable: "Das lässt sich nicht mitnehmen.".to_string(),
            nothing_special: "Nichts Besonderes.".to_string(),
            missing_item: "Dir fehlt ein benötigtes Item.".to_string(),
            cannot_combine: "Das lässt sich nicht kombinieren.".to_string(),
            inventory_empty: "Dein Inventar ist leer.".to_string(),
            combat_in_progress: "Du bist im Kampf! Nutze \"attack\" oder passende Befehle."
                .to_string(),
            combat_refusal: "Hier gibt es nichts zu bekämpfen.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct World {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub start_room: String,
    #[serde(default)]
    pub global_flags: BTreeMap<String, FlagValue>,
    #[serde(default)]
    pub messages: Messages,
}

/// Authoring-time lock metadata for one exit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitMeta {
    #[serde(default)]
    pub locked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascii: Option<ArtRef>,
    #[serde(default)]
    pub items: Vec<String>,
    #[serde(default)]
    pub objects: Vec<String>,
    #[serde(default)]
    pub exits: BTreeMap<String, String>,
    #[serde(
        default,
        rename = "exitMeta",
        alias = "exit_meta",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub exit_meta: BTreeMap<String, ExitMeta>,
    #[serde(default)]
    pub on_first_enter: Script,
    #[serde(default)]
    pub on_enter: Script,
    /// Authored fields this engine does not interpret, kept for write-back.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Room {
    pub fn new(id: &str, title: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            ascii: None,
            items: Vec::new(),
            objects: Vec::new(),
            exits: BTreeMap::new(),
            exit_meta: BTreeMap::new(),
            on_first_enter: Vec::new(),
            on_enter: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_exit(mut self, direction: &str, destination: &str) -> Self {
        self.exits
            .insert(direction.to_string(), destination.to_string());
        self
    }

    pub fn with_item(mut self, item_id: &str) -> Self {
        self.items.push(item_id.to_string());
        self
    }

    pub fn with_object(mut self, object_id: &str) -> Self {
        self.objects.push(object_id.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pickup: bool,
    #[serde(default)]
    pub combine: BTreeMap<String, Script>,
    #[serde(default)]
    pub on_use: Script,
}

/// An interactable fixture. Fixtures never leave the room that lists them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameObject {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub inspect: Script,
    #[serde(rename = "use", default)]
    pub use_script: Script,
    #[serde(default)]
    pub on_locked_use: Script,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl GameObject {
    pub fn new(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            locked: false,
            inspect: Vec::new(),
            use_script: Vec::new(),
            on_locked_use: Vec::new(),
            extra: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ascii: Option<ArtRef>,
    #[serde(default)]
    pub drops: Vec<String>,
}

/// Mutable per-player progress. Created at adventure start, mutated by the
/// dispatcher, interpreter and combat resolver, persisted by
/// `storage::PlayerStateStore`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub location: String,
    pub inventory: Vec<String>,
    pub flags: BTreeMap<String, FlagValue>,
    pub stats: Stats,
    pub in_combat: bool,
    pub enemy: Option<Enemy>,
    pub visited: BTreeSet<String>,
    pub locked_exits: BTreeMap<String, bool>,
    /// Item ids removed from room templates by `take`.
    #[serde(default)]
    pub taken_items: BTreeSet<String>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new("", BTreeMap::new(), Stats::default())
    }
}

/// Key of a `lockedExits` entry.
pub fn exit_key(room: &str, direction: &str) -> String {
    format!("{}:{}", room, direction)
}

impl PlayerState {
    pub fn new(location: &str, flags: BTreeMap<String, FlagValue>, stats: Stats) -> Self {
        Self {
            location: location.to_string(),
            inventory: Vec::new(),
            flags,
            stats,
            in_combat: false,
            enemy: None,
            visited: BTreeSet::new(),
            locked_exits: BTreeMap::new(),
            taken_items: BTreeSet::new(),
        }
    }

    pub fn has_item(&self, item_id: &str) -> bool {
        self.inventory.iter().any(|id| id == item_id)
    }

    /// Returns false when the item was already carried.
    pub fn add_item(&mut self, item_id: &str) -> bool {
        if self.has_item(item_id) {
            return false;
        }
        self.inventory.push(item_id.to_string());
        true
    }

    /// Returns false when the item was not carried.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let before = self.inventory.len();
        self.inventory.retain(|id| id != item_id);
        before != self.inventory.len()
    }

    pub fn is_exit_locked(&self, room: &str, direction: &str) -> bool {
        self.locked_exits
            .get(&exit_key(room, direction))
            .copied()
            .unwrap_or(false)
    }

    pub fn set_exit_locked(&mut self, room: &str, direction: &str, locked: bool) {
        self.locked_exits.insert(exit_key(room, direction), locked);
    }

    /// Records the first entry into a room. Returns true only the first time.
    pub fn mark_visited(&mut self, room_id: &str) -> bool {
        self.visited.insert(room_id.to_string())
    }

    pub fn has_visited(&self, room_id: &str) -> bool {
        self.visited.contains(room_id)
    }

    pub fn begin_combat(&mut self, enemy: Enemy) {
        self.enemy = Some(enemy);
        self.in_combat = true;
    }

    pub fn end_combat(&mut self) {
        self.enemy = None;
        self.in_combat = false;
    }

    /// Item ids of a room template that are still lying there.
    pub fn visible_items<'a>(&'a self, room: &'a Room) -> impl Iterator<Item = &'a String> + 'a {
        room.items
            .iter()
            .filter(move |id| !self.taken_items.contains(*id) && !self.has_item(id))
    }

    /// Restores the `enemy`/`inCombat` pairing after a merge from a save.
    pub(crate) fn normalize_combat(&mut self) {
        self.in_combat = self.enemy.is_some();
    }
}
