//! tileworks - content pipeline for a 2-D tile-based world editor
//!
//! Typed content items (textures, tilesets, sprites, maps, entities,
//! scripts) live behind stable opaque handles in per-type registries,
//! persist to a project directory as per-kind index files plus one
//! payload file per item, and resolve tile identifiers into renderable
//! sprite geometry through a neighbor-connectivity autotile algorithm.
//!
//! The surrounding application - window, GUI, renderer, script runtime -
//! sits on top of this crate: the renderer consumes composed [`content::Sprite`]
//! geometry, the editor drives [`store::AssetStore`] and the [`project`]
//! save/load entry points, and the scripting layer goes through
//! [`access::ScriptView`].
//!
//! Everything is single-threaded and synchronous; `&mut` discipline is
//! the concurrency model, and long save/load runs report progress through
//! a per-item callback rather than suspending.

pub mod access;
pub mod autotile;
pub mod content;
pub mod project;
pub mod store;

pub use access::{ScriptView, ViewState};
pub use autotile::{resolve_tile, Surroundings};
pub use content::{
    AssetKind, AutoKind, Comment, ContentError, Entity, Layer, Map, Piece, Rect, Script, Sprite,
    Texture, Tile, Tileset, TriggerKind,
};
pub use project::{load_project, save_project, LoadReport, ProjectError, SaveReport, Step};
pub use store::{AssetStore, Handle, Registry};
