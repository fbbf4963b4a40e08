//! Test utilities & fixtures.
//! Provides access to the adventure fixture under `tests/test-data-int`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use darkadv::adventure::content::AdventureManifest;
use darkadv::adventure::storage::{KeyValueStore, MemoryKeyValueStore};
use darkadv::adventure::types::Stats;
use darkadv::adventure::Adventure;
use darkadv::shell::{Shell, ShellSettings};

/// Id of the fixture adventure folder.
pub const FIXTURE_ID: &str = "noir";

/// Return the path to the static integration test fixture directory.
/// Tests that write (saves, compiled locks) must use [`writable_fixture`].
pub fn fixture_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("test-data-int")
}

fn copy_tree(src: &Path, dst: &Path) {
    std::fs::create_dir_all(dst).unwrap();
    for entry in std::fs::read_dir(src).unwrap() {
        let entry = entry.unwrap();
        let target = dst.join(entry.file_name());
        if entry.file_type().unwrap().is_dir() {
            copy_tree(&entry.path(), &target);
        } else {
            std::fs::copy(entry.path(), target).unwrap();
        }
    }
}

/// Return a writable copy (temp dir) of the whole fixture tree.
pub fn writable_fixture() -> tempfile::TempDir {
    let tmp = tempfile::tempdir().expect("tempdir");
    copy_tree(&fixture_root(), tmp.path());
    tmp
}

/// Fixture adventure backed by `backend`, played as `identity`.
pub fn open_adventure(
    root: &Path,
    backend: Arc<dyn KeyValueStore>,
    identity: Option<&str>,
) -> Adventure {
    let manifest = AdventureManifest::load(root, FIXTURE_ID).expect("fixture manifest");
    Adventure::from_manifest(&manifest, backend, "test_", identity, Stats::default())
}

/// Fixture adventure with an in-memory save store, already started.
pub fn started_adventure() -> Adventure {
    let mut adventure = open_adventure(&fixture_root(), memory_backend(), None);
    adventure.start().expect("start");
    adventure
}

pub fn memory_backend() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryKeyValueStore::new())
}

pub fn shell_settings(root: &Path) -> ShellSettings {
    ShellSettings {
        adventure_root: root.to_path_buf(),
        default_id: FIXTURE_ID.to_string(),
        save_prefix: "test_".to_string(),
        identity: Some("Tester".to_string()),
        stats: Stats::default(),
    }
}

pub fn fixture_shell() -> Shell {
    Shell::new(shell_settings(&fixture_root()), memory_backend())
}

/// Run several inputs and return the narration of the last one.
pub fn play(adventure: &mut Adventure, inputs: &[&str]) -> Vec<String> {
    let mut last = Vec::new();
    for input in inputs {
        last = adventure
            .handle_input(input)
            .unwrap_or_else(|e| panic!("input '{}' failed: {}", input, e));
    }
    last
}
