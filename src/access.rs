//! Scripting accessor surface
//!
//! The embedded scripting layer gets this narrow facade instead of the
//! registries themselves: entity position and sprite lookups plus a
//! camera-like view state. Keeping the surface small is what keeps the
//! bindings small.

use crate::content::{Entity, Sprite};
use crate::store::{AssetStore, Handle};

/// Camera-like state scripts may read and steer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewState {
    /// World-space point the view is centered on
    pub center: [f32; 2],
    pub zoom: f32,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0],
            zoom: 1.0,
        }
    }
}

/// Borrowed window onto the store and view for script bindings.
pub struct ScriptView<'a> {
    store: &'a mut AssetStore,
    view: &'a mut ViewState,
}

impl<'a> ScriptView<'a> {
    pub fn new(store: &'a mut AssetStore, view: &'a mut ViewState) -> Self {
        Self { store, view }
    }

    /// Entity world position; empty if the handle no longer resolves.
    pub fn entity_position(&self, entity: Handle<Entity>) -> Option<[f32; 2]> {
        self.store.entities.get(entity).map(|e| e.pos)
    }

    /// Move an entity. Returns false if the handle no longer resolves.
    pub fn set_entity_position(&mut self, entity: Handle<Entity>, pos: [f32; 2]) -> bool {
        match self.store.entities.get_mut(entity) {
            Some(e) => {
                e.pos = pos;
                true
            }
            None => false,
        }
    }

    /// The sprite an entity currently draws with, if any.
    pub fn entity_sprite(&self, entity: Handle<Entity>) -> Option<Handle<Sprite>> {
        self.store.entities.get(entity).and_then(|e| e.sprite)
    }

    /// Pivot offset of a sprite, in unit space.
    pub fn sprite_pivot(&self, sprite: Handle<Sprite>) -> Option<[f32; 2]> {
        self.store.sprites.get(sprite).map(|s| s.pivot)
    }

    pub fn view_center(&self) -> [f32; 2] {
        self.view.center
    }

    pub fn set_view_center(&mut self, center: [f32; 2]) {
        self.view.center = center;
    }

    pub fn zoom(&self) -> f32 {
        self.view.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.view.zoom = zoom;
    }
}
