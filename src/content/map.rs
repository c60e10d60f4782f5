//! Map content - layered tile grids with comments and entity placements
//!
//! A map is a fixed-size grid; each layer stores one encoded tile
//! identifier per cell plus a parallel array of signed heights. Layers
//! reference their tileset by handle, maps reference placed entities by
//! handle - handles are the only cross-references between content items.

use serde::{Deserialize, Serialize};

use super::{from_payload, to_payload, AssetKind, ContentError, Entity, Tileset};
use crate::store::Handle;

/// Validation limits to prevent resource exhaustion from malicious files
pub mod limits {
    /// Maximum map dimension (width or height)
    pub const MAX_MAP_SIZE: u32 = 1024;
    /// Maximum number of layers in a map
    pub const MAX_LAYERS: usize = 32;
    /// Maximum number of comments in a map
    pub const MAX_COMMENTS: usize = 1024;
    /// Maximum string length for names and comment text
    pub const MAX_STRING_LEN: usize = 4096;
}

/// One cell of a layer: the encoded identifier plus a signed height.
///
/// For plain tilesets the identifier is a flat atlas index. For autotile
/// tilesets the high 24 bits pick the chunk and the low 8 bits carry the
/// surroundings mask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tile {
    pub id: u32,
    pub height: i32,
}

/// One tile grid within a map, bound to a single tileset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    pub tileset: Option<Handle<Tileset>>,
    /// Encoded tile identifiers, row-major, `width * height` entries
    pub data: Vec<u32>,
    /// Signed per-cell heights; absent in older payloads, rebuilt as zeros
    #[serde(default)]
    pub heights: Vec<i32>,
}

/// A free-floating annotation pinned to a cell position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub text: String,
    pub pos: (i32, i32),
}

/// A layered tile grid plus its annotations and placed entities.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Map {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub entities: Vec<Handle<Entity>>,
}

impl Map {
    /// Create an empty map of the given size with no layers.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            layers: Vec::new(),
            comments: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Append a zero-filled layer bound to `tileset`; returns its index.
    pub fn add_layer(&mut self, name: impl Into<String>, tileset: Option<Handle<Tileset>>) -> usize {
        let cells = (self.width * self.height) as usize;
        self.layers.push(Layer {
            name: name.into(),
            tileset,
            data: vec![0; cells],
            heights: vec![0; cells],
        });
        self.layers.len() - 1
    }

    fn cell_index(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    /// Read one cell. Empty outside the grid or for a bad layer index.
    pub fn tile(&self, layer: usize, x: u32, y: u32) -> Option<Tile> {
        let idx = self.cell_index(x, y)?;
        let layer = self.layers.get(layer)?;
        Some(Tile {
            id: *layer.data.get(idx)?,
            height: layer.heights.get(idx).copied().unwrap_or(0),
        })
    }

    /// Write one cell. Returns false outside the grid or for a bad layer
    /// index.
    pub fn set_tile(&mut self, layer: usize, x: u32, y: u32, tile: Tile) -> bool {
        let idx = match self.cell_index(x, y) {
            Some(i) => i,
            None => return false,
        };
        let layer = match self.layers.get_mut(layer) {
            Some(l) => l,
            None => return false,
        };
        if idx >= layer.data.len() {
            return false;
        }
        layer.data[idx] = tile.id;
        if layer.heights.len() == layer.data.len() {
            layer.heights[idx] = tile.height;
        }
        true
    }
}

/// Validate a parsed map against the limits and internal consistency.
pub fn validate_map(map: &Map) -> Result<(), ContentError> {
    if map.width == 0 || map.height == 0 {
        return Err(ContentError::Validation(format!(
            "map '{}': zero dimension ({}x{})",
            map.name, map.width, map.height
        )));
    }
    if map.width > limits::MAX_MAP_SIZE || map.height > limits::MAX_MAP_SIZE {
        return Err(ContentError::Validation(format!(
            "map '{}': {}x{} exceeds maximum {}",
            map.name,
            map.width,
            map.height,
            limits::MAX_MAP_SIZE
        )));
    }
    if map.name.len() > limits::MAX_STRING_LEN {
        return Err(ContentError::Validation(format!(
            "map name too long ({} > {})",
            map.name.len(),
            limits::MAX_STRING_LEN
        )));
    }
    if map.layers.len() > limits::MAX_LAYERS {
        return Err(ContentError::Validation(format!(
            "map '{}': too many layers ({} > {})",
            map.name,
            map.layers.len(),
            limits::MAX_LAYERS
        )));
    }
    if map.comments.len() > limits::MAX_COMMENTS {
        return Err(ContentError::Validation(format!(
            "map '{}': too many comments ({} > {})",
            map.name,
            map.comments.len(),
            limits::MAX_COMMENTS
        )));
    }

    let cells = (map.width * map.height) as usize;
    for (i, layer) in map.layers.iter().enumerate() {
        if layer.name.len() > limits::MAX_STRING_LEN {
            return Err(ContentError::Validation(format!(
                "map '{}' layer[{}]: name too long",
                map.name, i
            )));
        }
        if layer.data.len() != cells {
            return Err(ContentError::Validation(format!(
                "map '{}' layer[{}]: data length {} != {}x{}",
                map.name,
                i,
                layer.data.len(),
                map.width,
                map.height
            )));
        }
        if !layer.heights.is_empty() && layer.heights.len() != cells {
            return Err(ContentError::Validation(format!(
                "map '{}' layer[{}]: heights length {} != {}x{}",
                map.name,
                i,
                layer.heights.len(),
                map.width,
                map.height
            )));
        }
    }

    for (i, comment) in map.comments.iter().enumerate() {
        if comment.text.len() > limits::MAX_STRING_LEN {
            return Err(ContentError::Validation(format!(
                "map '{}' comment[{}]: text too long",
                map.name, i
            )));
        }
    }

    Ok(())
}

impl AssetKind for Map {
    const KIND: &'static str = "map";
    const SUBDIR: &'static str = "maps";
    const EXT: &'static str = "ron";

    fn raw_load(&mut self, bytes: &[u8]) -> Result<(), ContentError> {
        let mut map: Map = from_payload(bytes)?;
        validate_map(&map)?;

        // Heights are optional on disk; rebuild the zero default here so
        // in-memory layers are always fully populated.
        let cells = (map.width * map.height) as usize;
        for layer in &mut map.layers {
            if layer.heights.is_empty() {
                layer.heights = vec![0; cells];
            }
        }

        *self = map;
        Ok(())
    }

    fn save_data(&self) -> Result<Vec<u8>, ContentError> {
        validate_map(self)?;
        to_payload(self)
    }
}
