//! Sprite content - renderable geometry composed of pieces
//!
//! A sprite maps regions of a texture atlas onto regions of its own unit
//! square. Several pieces let one logical tile be stitched together from
//! disjoint atlas cells, which is how autotile minitiles are composed.

use serde::{Deserialize, Serialize};

use super::{from_payload, to_payload, AssetKind, ContentError, Texture};
use crate::store::Handle;

/// Axis-aligned rectangle in normalized space, corners (x0, y0)-(x1, y1).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl Rect {
    /// The full unit square.
    pub const UNIT: Rect = Rect {
        x0: 0.0,
        y0: 0.0,
        x1: 1.0,
        y1: 1.0,
    };

    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// One source-rectangle to destination-rectangle mapping.
///
/// Source is in texture UV space, destination in the sprite's local unit
/// space; the renderer applies its own camera transform on top.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub source: Rect,
    pub destination: Rect,
}

/// A renderable unit: pivot offset plus an ordered list of pieces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// Atlas the source rectangles index into
    pub texture: Option<Handle<Texture>>,
    /// Draw order is list order
    pub pieces: Vec<Piece>,
    /// Pivot offset in unit space
    #[serde(default)]
    pub pivot: [f32; 2],
}

impl Sprite {
    /// A sprite covering the whole unit square with one atlas region.
    pub fn single(texture: Option<Handle<Texture>>, source: Rect) -> Self {
        Self {
            texture,
            pieces: vec![Piece {
                source,
                destination: Rect::UNIT,
            }],
            pivot: [0.0, 0.0],
        }
    }

    /// Whether the sprite draws nothing.
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }
}

impl AssetKind for Sprite {
    const KIND: &'static str = "sprite";
    const SUBDIR: &'static str = "sprites";
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
        let mut sprite = Sprite::single(None, Rect::new(0.25, 0.0, 0.5, 0.5));
        sprite.pivot = [0.5, 1.0];
        sprite.pieces.push(Piece {
            source: Rect::new(0.0, 0.0, 0.25, 0.25),
            destination: Rect::new(0.5, 0.5, 1.0, 1.0),
        });

        let bytes = sprite.save_data().unwrap();
        let mut back = Sprite::default();
        back.raw_load(&bytes).unwrap();
        assert_eq!(back, sprite);
    }

    #[test]
    fn test_missing_required_key_fails() {
        // `pieces` has no default; a payload without it must not load.
        let mut sprite = Sprite::default();
        let err = sprite.raw_load(b"(texture: None)").unwrap_err();
        assert!(err.to_string().contains("pieces"));
    }

    #[test]
    fn test_unknown_keys_are_skipped() {
        let mut sprite = Sprite::default();
        sprite
            .raw_load(b"(texture: Some(3), pieces: [], glow: 1.5)")
            .unwrap();
        assert_eq!(sprite.texture.map(|h| h.id()), Some(3));
    }
}
