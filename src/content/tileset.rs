//! Tileset content - atlas reference plus tiling behavior
//!
//! The tile-type tag picks the resolution algorithm: flat indexing, the
//! floor-style autotile layout, or the wall-style layout with computed
//! run connectivity.

use serde::{Deserialize, Serialize};

use super::{from_payload, to_payload, AssetKind, ContentError, Texture};
use crate::store::Handle;

/// Which resolution algorithm applies to a tileset's identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoKind {
    /// Identifier is a flat index into the atlas grid
    Normal,
    /// Floor-style autotiling: 2x3-cell chunks, stored surroundings mask
    FloorAuto,
    /// Wall-style autotiling: alternating ceiling and wall chunk rows,
    /// connectivity computed from column runs
    WallAuto,
}

impl Default for AutoKind {
    fn default() -> Self {
        AutoKind::Normal
    }
}

/// A named tile atlas with its tiling behavior.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    pub auto_kind: AutoKind,
    pub texture: Option<Handle<Texture>>,
}

impl Tileset {
    pub fn new(
        name: impl Into<String>,
        auto_kind: AutoKind,
        texture: Option<Handle<Texture>>,
    ) -> Self {
        Self {
            name: name.into(),
            auto_kind,
            texture,
        }
    }
}

impl AssetKind for Tileset {
    const KIND: &'static str = "tileset";
    const SUBDIR: &'static str = "tilesets";
    const EXT: &'static str = "ron";

    fn raw_load(&mut self, bytes: &[u8]) -> Result<(), ContentError> {
        *self = from_payload(bytes)?;
        Ok(())
    }

    fn save_data(&self) -> Result<Vec<u8>, ContentError> {
        to_payload(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_round_trip() {
        let tileset = Tileset {
            name: "overworld".to_string(),
            auto_kind: AutoKind::FloorAuto,
            texture: None,
        };
        let bytes = tileset.save_data().unwrap();
        let mut back = Tileset::default();
        back.raw_load(&bytes).unwrap();
        assert_eq!(back, tileset);
    }

    #[test]
    fn test_missing_auto_kind_fails() {
        let mut tileset = Tileset::default();
        let err = tileset
            .raw_load(b"(name: \"walls\", texture: None)")
            .unwrap_err();
        assert!(err.to_string().contains("auto_kind"));
    }
}
