//! Project persistence - ordered save and load of every registry
//!
//! A project directory holds one payload file per item plus a per-kind
//! index under `meta/` and a project file carrying the format version and
//! tile pixel size:
//!
//! ```text
//! project.ron
//! meta/texture.ron      [(id: 3, path: "textures/3.png"), ...]
//! textures/3.png
//! tilesets/1.ron
//! maps/1.ron
//! ...
//! ```
//!
//! Kinds are processed in a fixed dependency order (textures, tilesets,
//! sprites, scripts, entities, maps) and one kind finishes completely
//! before the next begins - a later kind's items dereference earlier
//! kinds' handles the moment they are used. A failing item is logged,
//! recorded in the report, and skipped; the batch keeps going. Both
//! directions call a step callback after every item so a synchronous
//! caller can pump a UI frame; there is no concurrency and no
//! cancellation - each call runs to completion.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::content::{pretty_config, AssetKind};
use crate::store::{AssetStore, Handle, Registry};

/// Name of the project file at the directory root
pub const PROJECT_FILE: &str = "project.ron";
/// Subdirectory holding the per-kind index files
pub const META_DIR: &str = "meta";
/// Format version written by this build
pub const FORMAT_VERSION: &str = "1.0";

/// Project-level settings stored next to the content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectFile {
    pub format_version: String,
    /// Edge length of one tile cell, in texture pixels
    pub tile_size: u32,
}

/// One line of a per-kind index: where the item's payload lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    id: u64,
    /// Relative to the project root
    path: String,
}

/// Error type for whole-project failures. Per-item failures never raise
/// this; they land in the report instead.
#[derive(Debug)]
pub enum ProjectError {
    Io(io::Error),
    Parse(ron::error::SpannedError),
    Serialize(ron::Error),
}

impl std::fmt::Display for ProjectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProjectError::Io(e) => write!(f, "IO error: {}", e),
            ProjectError::Parse(e) => write!(f, "parse error: {}", e),
            ProjectError::Serialize(e) => write!(f, "serialize error: {}", e),
        }
    }
}

impl std::error::Error for ProjectError {}

impl From<io::Error> for ProjectError {
    fn from(e: io::Error) -> Self {
        ProjectError::Io(e)
    }
}

impl From<ron::error::SpannedError> for ProjectError {
    fn from(e: ron::error::SpannedError) -> Self {
        ProjectError::Parse(e)
    }
}

impl From<ron::Error> for ProjectError {
    fn from(e: ron::Error) -> Self {
        ProjectError::Serialize(e)
    }
}

/// A single item that failed to save or load, attributable by kind, id,
/// and payload path.
#[derive(Debug)]
pub struct ItemFailure {
    pub kind: &'static str,
    pub id: u64,
    pub path: PathBuf,
    pub error: String,
}

/// Outcome of a whole-project save.
#[derive(Debug, Default)]
pub struct SaveReport {
    /// Items written successfully
    pub saved: usize,
    /// Items skipped; their index entries are omitted too
    pub failures: Vec<ItemFailure>,
}

/// Outcome of a whole-project load.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Items fully populated
    pub loaded: usize,
    /// Items whose payload was missing or malformed; their entries stay
    /// in the registry default-constructed
    pub failures: Vec<ItemFailure>,
    /// Set when the project file was written by a different format
    /// version; carries the version found on disk. The content is still
    /// loaded best-effort - what to do about it is the caller's call.
    pub version_mismatch: Option<String>,
    /// Tile pixel size recorded in the project file
    pub tile_size: u32,
}

/// Passed to the step callback after each item is processed.
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub kind: &'static str,
    /// Index of the item just finished within its kind
    pub index: usize,
    /// Item count for this kind
    pub total: usize,
}

/// Save every registry to `dir`, creating it if needed.
///
/// Writes payloads and index files kind by kind in dependency order, then
/// the project file last so a crash mid-save never leaves a directory
/// that claims to be complete.
pub fn save_project<F: FnMut(Step)>(
    store: &AssetStore,
    dir: &Path,
    tile_size: u32,
    mut on_step: F,
) -> Result<SaveReport, ProjectError> {
    fs::create_dir_all(dir.join(META_DIR))?;
    let mut report = SaveReport::default();

    save_kind(&store.textures, dir, &mut report, &mut on_step)?;
    save_kind(&store.tilesets, dir, &mut report, &mut on_step)?;
    save_kind(&store.sprites, dir, &mut report, &mut on_step)?;
    save_kind(&store.scripts, dir, &mut report, &mut on_step)?;
    save_kind(&store.entities, dir, &mut report, &mut on_step)?;
    save_kind(&store.maps, dir, &mut report, &mut on_step)?;

    let project = ProjectFile {
        format_version: FORMAT_VERSION.to_string(),
        tile_size,
    };
    let text = ron::ser::to_string_pretty(&project, pretty_config())?;
    fs::write(dir.join(PROJECT_FILE), text)?;

    Ok(report)
}

/// Load a whole project directory into a fresh store.
///
/// Items are re-created at their original ids, so every cross-reference
/// recorded in the payloads resolves once its kind's turn has passed.
pub fn load_project<F: FnMut(Step)>(
    dir: &Path,
    mut on_step: F,
) -> Result<(AssetStore, LoadReport), ProjectError> {
    let text = fs::read_to_string(dir.join(PROJECT_FILE))?;
    let project: ProjectFile = ron::from_str(&text)?;

    let mut report = LoadReport {
        tile_size: project.tile_size,
        ..Default::default()
    };
    if project.format_version != FORMAT_VERSION {
        eprintln!(
            "project format version is {} but this build writes {}; loading anyway",
            project.format_version, FORMAT_VERSION
        );
        report.version_mismatch = Some(project.format_version);
    }

    let mut store = AssetStore::new();
    load_kind(&mut store.textures, dir, &mut report, &mut on_step)?;
    load_kind(&mut store.tilesets, dir, &mut report, &mut on_step)?;
    load_kind(&mut store.sprites, dir, &mut report, &mut on_step)?;
    load_kind(&mut store.scripts, dir, &mut report, &mut on_step)?;
    load_kind(&mut store.entities, dir, &mut report, &mut on_step)?;
    load_kind(&mut store.maps, dir, &mut report, &mut on_step)?;

    Ok((store, report))
}

fn meta_path(dir: &Path, kind: &str) -> PathBuf {
    dir.join(META_DIR).join(format!("{}.ron", kind))
}

/// Write one kind's payloads and its index file.
fn save_kind<T: AssetKind, F: FnMut(Step)>(
    registry: &Registry<T>,
    dir: &Path,
    report: &mut SaveReport,
    on_step: &mut F,
) -> Result<(), ProjectError> {
    fs::create_dir_all(dir.join(T::SUBDIR))?;

    let ids = registry.ids();
    let total = ids.len();
    let mut index = Vec::with_capacity(total);

    for (i, id) in ids.into_iter().enumerate() {
        let rel = format!("{}/{}.{}", T::SUBDIR, id, T::EXT);
        let path = dir.join(&rel);
        let item = match registry.get(Handle::new(id)) {
            Some(item) => item,
            None => continue,
        };

        let outcome = item
            .save_data()
            .map_err(|e| e.to_string())
            .and_then(|bytes| fs::write(&path, bytes).map_err(|e| e.to_string()));
        match outcome {
            Ok(()) => {
                index.push(IndexEntry {
                    id,
                    path: rel,
                });
                report.saved += 1;
            }
            Err(error) => {
                eprintln!("failed to save {} {}: {}", T::KIND, id, error);
                report.failures.push(ItemFailure {
                    kind: T::KIND,
                    id,
                    path,
                    error,
                });
            }
        }

        on_step(Step {
            kind: T::KIND,
            index: i,
            total,
        });
    }

    let text = ron::ser::to_string_pretty(&index, pretty_config())?;
    fs::write(meta_path(dir, T::KIND), text)?;
    Ok(())
}

/// Read one kind's index and populate its registry, preserving ids.
fn load_kind<T: AssetKind, F: FnMut(Step)>(
    registry: &mut Registry<T>,
    dir: &Path,
    report: &mut LoadReport,
    on_step: &mut F,
) -> Result<(), ProjectError> {
    let text = match fs::read_to_string(meta_path(dir, T::KIND)) {
        Ok(text) => text,
        // No index file simply means the project has none of this kind.
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    let entries: Vec<IndexEntry> = ron::from_str(&text)?;
    let total = entries.len();

    for (i, entry) in entries.into_iter().enumerate() {
        let path = dir.join(&entry.path);
        let handle = registry.put_at(entry.id, T::default());

        let outcome = fs::read(&path).map_err(|e| e.to_string()).and_then(|bytes| {
            let item = registry
                .get_mut(handle)
                .ok_or_else(|| "entry vanished during load".to_string())?;
            item.raw_load(&bytes).map_err(|e| e.to_string())
        });
        match outcome {
            Ok(()) => report.loaded += 1,
            Err(error) => {
                eprintln!("failed to load {} {}: {}", T::KIND, entry.id, error);
                report.failures.push(ItemFailure {
                    kind: T::KIND,
                    id: entry.id,
                    path,
                    error,
                });
            }
        }

        on_step(Step {
            kind: T::KIND,
            index: i,
            total,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        AutoKind, Comment, Entity, Map, Script, Texture, Tile, Tileset, TriggerKind,
    };

    fn populated_store() -> AssetStore {
        let mut store = AssetStore::new();

        let pixels = vec![128u8; 16 * 16 * 4];
        let tex = store
            .textures
            .put(Texture::from_rgba8(16, 16, pixels).unwrap());
        let ts = store
            .tilesets
            .put(Tileset::new("ground", AutoKind::FloorAuto, Some(tex)));

        let script = store.scripts.put(Script {
            name: "greet".to_string(),
            source: "say(\"hi\")".to_string(),
            trigger: TriggerKind::OnEnter,
        });
        let mut guard = Entity::new("guard", [3.0, 4.0]);
        guard.scripts.push(script);
        let guard = store.entities.put(guard);

        let mut map = Map::new("village", 6, 5);
        map.add_layer("ground", Some(ts));
        map.set_tile(0, 2, 1, Tile { id: 0x0304, height: 2 });
        map.comments.push(Comment {
            text: "well goes here".to_string(),
            pos: (2, 2),
        });
        map.entities.push(guard);
        store.maps.put(map);

        store
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let store = populated_store();

        let save = save_project(&store, tmp.path(), 16, |_| {}).unwrap();
        assert!(save.failures.is_empty());
        assert_eq!(save.saved, store.len());

        let (loaded, report) = load_project(tmp.path(), |_| {}).unwrap();
        assert!(report.failures.is_empty());
        assert!(report.version_mismatch.is_none());
        assert_eq!(report.tile_size, 16);
        assert_eq!(loaded.len(), store.len());

        // Identities and cross-references survive.
        let map_id = store.maps.ids()[0];
        let orig = store.maps.get(Handle::new(map_id)).unwrap();
        let back = loaded.maps.get(Handle::new(map_id)).unwrap();
        assert_eq!(back, orig);

        // The reloaded map's tileset handle resolves, and that tileset's
        // texture handle resolves too - the load order guarantees it.
        let ts = back.layers[0].tileset.unwrap();
        let tileset = loaded.tilesets.get(ts).unwrap();
        assert_eq!(tileset.name, "ground");
        let tex = tileset.texture.unwrap();
        assert_eq!(loaded.textures.get(tex).unwrap().width(), 16);
    }

    #[test]
    fn test_fresh_ids_after_reload_do_not_collide() {
        let tmp = tempfile::tempdir().unwrap();
        let store = populated_store();
        let highest = store.tilesets.ids().last().copied().unwrap();
        save_project(&store, tmp.path(), 16, |_| {}).unwrap();

        let (mut loaded, _) = load_project(tmp.path(), |_| {}).unwrap();
        let fresh = loaded.tilesets.put(Tileset::default());
        assert!(fresh.id() > highest);
    }

    #[test]
    fn test_step_callback_counts_items() {
        let tmp = tempfile::tempdir().unwrap();
        let store = populated_store();

        let mut save_steps = 0;
        save_project(&store, tmp.path(), 16, |_| save_steps += 1).unwrap();
        assert_eq!(save_steps, store.len());

        let mut load_steps = 0;
        let mut kinds = Vec::new();
        load_project(tmp.path(), |step| {
            load_steps += 1;
            kinds.push(step.kind);
        })
        .unwrap();
        assert_eq!(load_steps, store.len());
        // Dependency order: textures strictly before tilesets, tilesets
        // strictly before maps.
        let pos = |k: &str| kinds.iter().position(|&x| x == k).unwrap();
        assert!(pos("texture") < pos("tileset"));
        assert!(pos("tileset") < pos("map"));
    }

    #[test]
    fn test_corrupt_payload_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = populated_store();
        save_project(&store, tmp.path(), 16, |_| {}).unwrap();

        // Clobber one tileset payload; everything else must still load.
        let ts_id = store.tilesets.ids()[0];
        fs::write(
            tmp.path().join(format!("tilesets/{}.ron", ts_id)),
            b"(name: \"broken\"",
        )
        .unwrap();

        let (loaded, report) = load_project(tmp.path(), |_| {}).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, "tileset");
        assert_eq!(report.failures[0].id, ts_id);
        // The broken entry exists default-constructed; the rest made it.
        assert!(loaded.tilesets.get(Handle::new(ts_id)).is_some());
        assert_eq!(loaded.maps.len(), 1);
    }

    #[test]
    fn test_missing_payload_file_is_reported_not_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let store = populated_store();
        save_project(&store, tmp.path(), 16, |_| {}).unwrap();

        let script_id = store.scripts.ids()[0];
        fs::remove_file(tmp.path().join(format!("scripts/{}.ron", script_id))).unwrap();

        let (loaded, report) = load_project(tmp.path(), |_| {}).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, "script");
        assert_eq!(loaded.maps.len(), 1);
    }

    #[test]
    fn test_version_mismatch_is_surfaced() {
        let tmp = tempfile::tempdir().unwrap();
        save_project(&AssetStore::new(), tmp.path(), 16, |_| {}).unwrap();
        fs::write(
            tmp.path().join(PROJECT_FILE),
            "(format_version: \"0.9\", tile_size: 16)",
        )
        .unwrap();

        let (_, report) = load_project(tmp.path(), |_| {}).unwrap();
        assert_eq!(report.version_mismatch.as_deref(), Some("0.9"));
    }

    #[test]
    fn test_missing_project_file_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(load_project(tmp.path(), |_| {}).is_err());
    }

    #[test]
    fn test_unsaveable_item_is_skipped_from_index() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = AssetStore::new();
        // A released texture cannot produce a payload.
        let mut released = Texture::from_rgba8(2, 2, vec![0; 16]).unwrap();
        released.raw_unload();
        store.textures.put(released);
        let good = Texture::from_rgba8(2, 2, vec![7; 16]).unwrap();
        let good_handle = store.textures.put(good.clone());

        let report = save_project(&store, tmp.path(), 16, |_| {}).unwrap();
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.saved, 1);

        let (loaded, load_report) = load_project(tmp.path(), |_| {}).unwrap();
        assert!(load_report.failures.is_empty());
        assert_eq!(loaded.textures.len(), 1);
        assert_eq!(loaded.textures.get(good_handle).unwrap(), &good);
    }
}
