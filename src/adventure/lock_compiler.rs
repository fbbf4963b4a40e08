//! Exit-lock compiler.
//!
//! Lowers authored exit metadata (`exitMeta` on a room) into ordinary effect
//! scripts before content is saved, so the runtime never looks at metadata:
//! - the room's first-enter script gains a `lock_exit` for the direction
//! - the controlling object's `use` script gains a `flag_if` on the gating
//!   flag that unlocks the exit when the flag is `true`
//!
//! Running the compiler again on its own output changes nothing.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::adventure::errors::AdventureError;
use crate::adventure::types::{Effect, ExitMeta, GameObject, Room, Script, Step};

/// Authoring-time view of an adventure: every room and object by id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentBundle {
    pub rooms: BTreeMap<String, Room>,
    pub objects: BTreeMap<String, GameObject>,
}

impl ContentBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.insert(room.id.clone(), room);
        self
    }

    pub fn with_object(mut self, object: GameObject) -> Self {
        self.objects.insert(object.id.clone(), object);
        self
    }

    /// Read `rooms/*.json` and `objects/*.json` below `data_path`.
    pub fn load_dir(data_path: &Path) -> Result<Self, AdventureError> {
        let rooms = read_documents::<Room>(&data_path.join("rooms"))?
            .into_iter()
            .map(|room| (room.id.clone(), room))
            .collect();
        let objects = read_documents::<GameObject>(&data_path.join("objects"))?
            .into_iter()
            .map(|object| (object.id.clone(), object))
            .collect();
        Ok(Self { rooms, objects })
    }

    /// Write every room and object back as pretty JSON, one file per id.
    pub fn write_dir(&self, data_path: &Path) -> Result<(), AdventureError> {
        write_documents(&data_path.join("rooms"), &self.rooms)?;
        write_documents(&data_path.join("objects"), &self.objects)
    }
}

fn read_documents<T: DeserializeOwned>(dir: &Path) -> Result<Vec<T>, AdventureError> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    paths
        .iter()
        .map(|path| {
            let body = std::fs::read_to_string(path)
                .map_err(|e| AdventureError::load(path.display().to_string(), e))?;
            serde_json::from_str(&body).map_err(|source| AdventureError::ContentParse {
                path: path.display().to_string(),
                source,
            })
        })
        .collect()
}

fn write_documents<T: Serialize>(
    dir: &Path,
    documents: &BTreeMap<String, T>,
) -> Result<(), AdventureError> {
    std::fs::create_dir_all(dir)?;
    for (id, document) in documents {
        let mut body = serde_json::to_string_pretty(document)?;
        body.push('\n');
        std::fs::write(dir.join(format!("{}.json", id)), body)?;
    }
    Ok(())
}

/// Developer-facing diagnostic; never shown to players.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockWarning {
    pub room: String,
    pub direction: String,
    pub object_id: String,
}

impl fmt::Display for LockWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "exit {}:{} references missing object '{}'",
            self.room, self.direction, self.object_id
        )
    }
}

/// Flag name used when the metadata does not name one.
pub fn default_gate_flag(room: &str, direction: &str) -> String {
    format!("exit_{}_{}_open", room, direction)
}

fn unlock_step(room: &str, direction: &str) -> Step {
    Step::Effect(Effect::UnlockExit {
        room: room.to_string(),
        direction: direction.to_string(),
    })
}

fn success_step(direction: &str) -> Step {
    Step::Effect(Effect::message(format!(
        "Es klickt. Der Weg nach {} ist frei.",
        direction
    )))
}

fn failure_step() -> Step {
    Step::Effect(Effect::message("Es tut sich nichts."))
}

fn is_message(step: &Step) -> bool {
    matches!(step, Step::Effect(Effect::Message { .. }))
}

/// Make sure `script` starts by locking `room:direction`. Returns true when
/// the script changed.
fn ensure_lock(script: &mut Script, room: &str, direction: &str) -> bool {
    let lock = Step::Effect(Effect::LockExit {
        room: room.to_string(),
        direction: direction.to_string(),
    });
    if script.contains(&lock) {
        return false;
    }
    script.insert(0, lock);
    true
}

/// Make sure `script` has a `flag_if` on `flag` that unlocks the exit.
/// An existing block for the flag is completed in place.
fn ensure_gate(script: &mut Script, flag: &str, room: &str, direction: &str) -> bool {
    let unlock = unlock_step(room, direction);
    let existing = script.iter_mut().find_map(|step| match step {
        Step::Effect(Effect::BranchOnFlag {
            key,
            then,
            otherwise,
            ..
        }) if key == flag => Some((then, otherwise)),
        _ => None,
    });

    match existing {
        Some((then, otherwise)) => {
            let mut changed = false;
            if !then.iter().any(is_message) {
                then.insert(0, success_step(direction));
                changed = true;
            }
            if !then.contains(&unlock) {
                then.push(unlock);
                changed = true;
            }
            if otherwise.is_empty() {
                otherwise.push(failure_step());
                changed = true;
            }
            changed
        }
        None => {
            script.push(Step::Effect(Effect::BranchOnFlag {
                key: flag.to_string(),
                equals: Value::Bool(true),
                then: vec![success_step(direction), unlock],
                otherwise: vec![failure_step()],
            }));
            true
        }
    }
}

/// Lower every gated exit in `bundle` into effect scripts.
pub fn compile_exit_locks(bundle: &mut ContentBundle) -> Vec<LockWarning> {
    let gates: Vec<(String, String, ExitMeta)> = bundle
        .rooms
        .values()
        .flat_map(|room| {
            room.exit_meta
                .iter()
                .filter(|(_, meta)| meta.flag.is_some() || meta.object_id.is_some())
                .map(|(direction, meta)| (room.id.clone(), direction.clone(), meta.clone()))
        })
        .collect();

    let mut warnings = Vec::new();
    for (room_id, direction, meta) in gates {
        if let Some(room) = bundle.rooms.get_mut(&room_id) {
            if ensure_lock(&mut room.on_first_enter, &room_id, &direction) {
                debug!("Added lock_exit {}:{}", room_id, direction);
            }
        }

        let Some(object_id) = meta.object_id else {
            continue;
        };
        let Some(object) = bundle.objects.get_mut(&object_id) else {
            let warning = LockWarning {
                room: room_id,
                direction,
                object_id,
            };
            warn!("Lock compiler: {}", warning);
            warnings.push(warning);
            continue;
        };
        let flag = meta
            .flag
            .unwrap_or_else(|| default_gate_flag(&room_id, &direction));
        if ensure_gate(&mut object.use_script, &flag, &room_id, &direction) {
            debug!(
                "Gate on '{}' for {}:{} written to object {}",
                flag, room_id, direction, object_id
            );
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn gated_bundle() -> ContentBundle {
        let mut keller = Room::new("keller", "Keller", "Feucht.").with_exit("nord", "gang");
        keller.exit_meta.insert(
            "nord".to_string(),
            ExitMeta {
                locked: true,
                object_id: Some("hebel".to_string()),
                flag: None,
            },
        );
        keller.exit_meta.insert(
            "ost".to_string(),
            ExitMeta {
                locked: true,
                object_id: None,
                flag: Some("strom".to_string()),
            },
        );
        keller.exit_meta.insert("west".to_string(), ExitMeta::default());
        ContentBundle::new()
            .with_room(keller)
            .with_object(GameObject::new("hebel", "Hebel", "Rostig."))
    }

    #[test]
    fn locks_and_gates_are_generated() {
        let mut bundle = gated_bundle();
        let warnings = compile_exit_locks(&mut bundle);
        assert!(warnings.is_empty());

        let keller = &bundle.rooms["keller"];
        let locks: Vec<_> = keller
            .on_first_enter
            .iter()
            .filter(|s| matches!(s, Step::Effect(Effect::LockExit { .. })))
            .collect();
        assert_eq!(locks.len(), 2);

        let hebel = &bundle.objects["hebel"];
        match &hebel.use_script[..] {
            [Step::Effect(Effect::BranchOnFlag {
                key,
                equals,
                then,
                otherwise,
            })] => {
                assert_eq!(key, "exit_keller_nord_open");
                assert_eq!(equals, &json!(true));
                assert!(then.contains(&unlock_step("keller", "nord")));
                assert_eq!(otherwise, &vec![failure_step()]);
            }
            other => panic!("unexpected use script {:?}", other),
        }
    }

    #[test]
    fn compiling_twice_is_idempotent() {
        let mut bundle = gated_bundle();
        compile_exit_locks(&mut bundle);
        let once = bundle.clone();
        compile_exit_locks(&mut bundle);
        assert_eq!(bundle, once);
    }

    #[test]
    fn existing_gate_block_is_merged() {
        let mut bundle = gated_bundle();
        if let Some(hebel) = bundle.objects.get_mut("hebel") {
            hebel.use_script = serde_json::from_value(json!([
                {"type": "message", "text": "Du ziehst am Hebel."},
                {"type": "flag_if", "key": "exit_keller_nord_open", "equals": true,
                 "then": [{"type": "message", "text": "Rumms."}]}
            ]))
            .unwrap();
        }
        compile_exit_locks(&mut bundle);

        let script = &bundle.objects["hebel"].use_script;
        assert_eq!(script.len(), 2);
        match &script[1] {
            Step::Effect(Effect::BranchOnFlag {
                then, otherwise, ..
            }) => {
                assert_eq!(
                    then,
                    &vec![Step::Effect(Effect::message("Rumms.")), unlock_step("keller", "nord")]
                );
                assert_eq!(otherwise, &vec![failure_step()]);
            }
            other => panic!("unexpected step {:?}", other),
        }
    }

    #[test]
    fn missing_object_is_a_warning() {
        let mut room = Room::new("dach", "Dach", "");
        room.exit_meta.insert(
            "sued".to_string(),
            ExitMeta {
                locked: true,
                object_id: Some("luke".to_string()),
                flag: None,
            },
        );
        let mut bundle = ContentBundle::new().with_room(room);
        let warnings = compile_exit_locks(&mut bundle);
        assert_eq!(
            warnings,
            vec![LockWarning {
                room: "dach".to_string(),
                direction: "sued".to_string(),
                object_id: "luke".to_string(),
            }]
        );
        assert_eq!(bundle.rooms["dach"].on_first_enter.len(), 1);
    }

    #[test]
    fn bundle_round_trips_through_a_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut bundle = gated_bundle();
        compile_exit_locks(&mut bundle);
        bundle.write_dir(dir.path()).unwrap();

        let reloaded = ContentBundle::load_dir(dir.path()).unwrap();
        assert_eq!(reloaded, bundle);
    }
}
