//! Entity content - placed game objects
//!
//! An entity pairs a world position with a sprite to draw and the scripts
//! that drive it. All references are handles; the entity owns none of its
//! targets.

use serde::{Deserialize, Serialize};

use super::{from_payload, to_payload, AssetKind, ContentError, Script, Sprite};
use crate::store::Handle;

/// A placed object: name, position, sprite, and attached scripts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub sprite: Option<Handle<Sprite>>,
    pub pos: [f32; 2],
    #[serde(default)]
    pub scripts: Vec<Handle<Script>>,
}

impl Entity {
    pub fn new(name: impl Into<String>, pos: [f32; 2]) -> Self {
        Self {
            name: name.into(),
            sprite: None,
            pos,
            scripts: Vec::new(),
        }
    }
}

impl AssetKind for Entity {
    const KIND: &'static str = "entity";
    const SUBDIR: &'static str = "entities";
    const EXT: &'static str = "ron";

    fn raw_load(&mut self, bytes: &[u8]) -> Result<(), ContentError> {
        *self = from_payload(bytes)?;
        Ok(())
    }

    fn save_data(&self) -> Result<Vec<u8>, ContentError> {
        to_payload(self)
    }
}
