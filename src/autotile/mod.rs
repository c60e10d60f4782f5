//! Autotile resolver - tile identifiers to renderable sprite geometry
//!
//! Resolution is a pure read: given a cell of a map layer, the owning
//! tileset, and the atlas dimensions, produce the sprite that renders it.
//! Nothing here mutates stored tile state, and a dangling tileset or
//! texture reference resolves to an empty sprite rather than a fault.
//!
//! Identifier encoding for autotile tilesets: the high 24 bits pick the
//! auto-tile chunk, the low 8 bits are the surroundings mask. Mask
//! convention: a bit is SET where a visible edge exists (the neighbor is
//! not part of the same run) and CLEAR where the tiles blend. All the
//! case tables below are written against that inverted convention.

use crate::content::{AutoKind, Map, Piece, Rect, Sprite, Texture, Tile};
use crate::store::{AssetStore, Handle};

// ─────────────────────────────────────────────────────────────────────────────
// Surroundings mask
// ─────────────────────────────────────────────────────────────────────────────

/// Compass directions around a tile, one mask bit each.
///
/// Declaration order fixes the bit layout: up-left is bit 0 through
/// down-right at bit 7, reading the 3x3 neighborhood row by row with the
/// center skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    UpLeft,
    Up,
    UpRight,
    Left,
    Right,
    DownLeft,
    Down,
    DownRight,
}

impl Direction {
    /// The mask bit for this direction.
    pub fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// 8-bit neighborhood record: bit set = boundary, bit clear = blends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Surroundings(pub u8);

impl Surroundings {
    /// Every neighbor blends.
    pub const ALL_CONNECTED: Surroundings = Surroundings(0x00);
    /// No neighbor blends; a lone tile.
    pub const ISOLATED: Surroundings = Surroundings(0xFF);

    /// Whether the neighbor in `dir` is part of the same run.
    pub fn connects(self, dir: Direction) -> bool {
        self.0 & dir.bit() == 0
    }

    /// Mark `dir` as a boundary.
    pub fn with_boundary(self, dir: Direction) -> Surroundings {
        Surroundings(self.0 | dir.bit())
    }
}

/// Chunk index from an encoded autotile identifier.
pub fn auto_index(id: u32) -> u32 {
    id >> 8
}

/// Surroundings mask from an encoded autotile identifier.
pub fn surroundings(id: u32) -> Surroundings {
    Surroundings((id & 0xFF) as u8)
}

/// Encode a chunk index and mask back into a tile identifier.
pub fn encode_auto(index: u32, mask: Surroundings) -> u32 {
    (index << 8) | mask.0 as u32
}

// ─────────────────────────────────────────────────────────────────────────────
// Minitile layout selection
// ─────────────────────────────────────────────────────────────────────────────

/// One of the four quadrants a tile is decomposed into for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// The vertical neighbor this quadrant cares about.
    fn vertical_dir(self) -> Direction {
        match self {
            Quadrant::TopLeft | Quadrant::TopRight => Direction::Up,
            Quadrant::BottomLeft | Quadrant::BottomRight => Direction::Down,
        }
    }

    /// The horizontal neighbor this quadrant cares about.
    fn horizontal_dir(self) -> Direction {
        match self {
            Quadrant::TopLeft | Quadrant::BottomLeft => Direction::Left,
            Quadrant::TopRight | Quadrant::BottomRight => Direction::Right,
        }
    }

    /// The single diagonal this quadrant cares about.
    fn corner_dir(self) -> Direction {
        match self {
            Quadrant::TopLeft => Direction::UpLeft,
            Quadrant::TopRight => Direction::UpRight,
            Quadrant::BottomLeft => Direction::DownLeft,
            Quadrant::BottomRight => Direction::DownRight,
        }
    }

    /// Destination rectangle: this quadrant of the unit square.
    fn destination(self) -> Rect {
        match self {
            Quadrant::TopLeft => Rect::new(0.0, 0.0, 0.5, 0.5),
            Quadrant::TopRight => Rect::new(0.5, 0.0, 1.0, 0.5),
            Quadrant::BottomLeft => Rect::new(0.0, 0.5, 0.5, 1.0),
            Quadrant::BottomRight => Rect::new(0.5, 0.5, 1.0, 1.0),
        }
    }
}

/// The five minitile layout variants a quadrant can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Both edges and the corner blend
    Full,
    /// Neither edge blends; outer corner piece
    Isolated,
    /// Both edges blend but the corner does not; concave corner piece
    Concave,
    /// Only the vertical edge blends
    VerticalRun,
    /// Only the horizontal edge blends
    HorizontalRun,
}

impl Variant {
    fn table_slot(self) -> usize {
        match self {
            Variant::Full => 0,
            Variant::Isolated => 1,
            Variant::Concave => 2,
            Variant::VerticalRun => 3,
            Variant::HorizontalRun => 4,
        }
    }
}

/// Pick a layout variant from a quadrant's three connectivity flags.
///
/// The full eight-case switch is deliberate: the corner flag is only
/// consulted when both edges blend (a concave and a convex corner look
/// identical otherwise), and that folding is a visual convention, not
/// something to re-derive.
pub fn layout_variant(corner: bool, vertical: bool, horizontal: bool) -> Variant {
    match (corner, vertical, horizontal) {
        (true, true, true) => Variant::Full,
        (false, true, true) => Variant::Concave,
        (true, false, false) => Variant::Isolated,
        (false, false, false) => Variant::Isolated,
        (true, true, false) => Variant::VerticalRun,
        (false, true, false) => Variant::VerticalRun,
        (true, false, true) => Variant::HorizontalRun,
        (false, false, true) => Variant::HorizontalRun,
    }
}

// Source positions inside a chunk, in half-cell units, indexed by
// [quadrant][variant slot]. Variant slot order: Full, Isolated, Concave,
// VerticalRun, HorizontalRun.

/// Floor chunks are 2x3 cells: outer corners at (0,0), concave corners at
/// cell (1,0), and a 2x2 "big tile" below whose border supplies the edge
/// pieces and whose middle supplies the fully-open ones.
const FLOOR_LAYOUT: [[(u8, u8); 5]; 4] = [
    // TopLeft
    [(2, 4), (0, 0), (2, 0), (0, 4), (2, 2)],
    // TopRight
    [(1, 4), (1, 0), (3, 0), (3, 4), (1, 2)],
    // BottomLeft
    [(2, 3), (0, 1), (2, 1), (0, 3), (2, 5)],
    // BottomRight
    [(1, 3), (1, 1), (3, 1), (3, 3), (1, 5)],
];

/// Wall chunks are 2x2 cells with no concave pieces; the concave slot
/// repeats Full and is never selected (corners are forced connected).
const WALL_LAYOUT: [[(u8, u8); 5]; 4] = [
    // TopLeft
    [(2, 2), (0, 0), (2, 2), (0, 2), (2, 0)],
    // TopRight
    [(1, 2), (3, 0), (1, 2), (3, 2), (1, 0)],
    // BottomLeft
    [(2, 1), (0, 3), (2, 1), (0, 1), (2, 3)],
    // BottomRight
    [(1, 1), (3, 3), (1, 1), (3, 1), (1, 3)],
];

/// Cells per floor (or ceiling) chunk: 2 wide, 3 tall.
pub const FLOOR_CHUNK_H: u32 = 3;
/// Cells per wall chunk: 2 wide, 2 tall.
pub const WALL_CHUNK_H: u32 = 2;
/// Every chunk is 2 cells wide.
pub const CHUNK_W: u32 = 2;

// ─────────────────────────────────────────────────────────────────────────────
// Atlas geometry
// ─────────────────────────────────────────────────────────────────────────────

/// Tileset atlas measured in whole tile cells.
#[derive(Debug, Clone, Copy)]
struct AtlasGrid {
    cols: u32,
    rows: u32,
}

impl AtlasGrid {
    /// UV rectangle of one full cell.
    fn cell_uv(&self, x: u32, y: u32) -> Rect {
        let w = 1.0 / self.cols as f32;
        let h = 1.0 / self.rows as f32;
        Rect::new(
            x as f32 * w,
            y as f32 * h,
            (x + 1) as f32 * w,
            (y + 1) as f32 * h,
        )
    }

    /// UV rectangle of one half-cell, addressed in half-cell units from a
    /// cell origin.
    fn half_uv(&self, origin_x: u32, origin_y: u32, hx: u8, hy: u8) -> Rect {
        let w = 1.0 / self.cols as f32;
        let h = 1.0 / self.rows as f32;
        let x0 = origin_x as f32 * w + hx as f32 * 0.5 * w;
        let y0 = origin_y as f32 * h + hy as f32 * 0.5 * h;
        Rect::new(x0, y0, x0 + 0.5 * w, y0 + 0.5 * h)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Resolve one cell of a map layer into its sprite.
///
/// Reads the tile, its tileset, and (for wall tiles) the local column
/// neighborhood, all through the store. Any broken link along the way -
/// missing layer, dangling tileset or texture handle, released pixels,
/// out-of-range atlas index - yields an empty sprite.
pub fn resolve_tile(
    store: &AssetStore,
    map: &Map,
    layer_index: usize,
    x: u32,
    y: u32,
    tile_size: u32,
) -> Sprite {
    let layer = match map.layers.get(layer_index) {
        Some(l) => l,
        None => return Sprite::default(),
    };
    let tile = match map.tile(layer_index, x, y) {
        Some(t) => t,
        None => return Sprite::default(),
    };
    let tileset = match layer.tileset.and_then(|h| store.tilesets.get(h)) {
        Some(t) => t,
        None => return Sprite::default(),
    };
    let texture_handle = tileset.texture;
    let texture = match texture_handle.and_then(|h| store.textures.get(h)) {
        Some(t) => t,
        None => return Sprite::default(),
    };
    if tile_size == 0 {
        return Sprite::default();
    }
    let grid = AtlasGrid {
        cols: texture.width() / tile_size,
        rows: texture.height() / tile_size,
    };
    if grid.cols == 0 || grid.rows == 0 {
        return Sprite::default();
    }

    match tileset.auto_kind {
        AutoKind::Normal => normal_sprite(tile, grid, texture_handle),
        AutoKind::FloorAuto => floor_sprite(tile, grid, texture_handle),
        AutoKind::WallAuto => wall_sprite(map, layer_index, x, y, tile, grid, texture_handle),
    }
}

/// Flat indexing: identifier -> atlas cell, one full-square piece.
fn normal_sprite(tile: Tile, grid: AtlasGrid, texture: Option<Handle<Texture>>) -> Sprite {
    let cx = tile.id % grid.cols;
    let cy = tile.id / grid.cols;
    if cy >= grid.rows {
        return Sprite::default();
    }
    Sprite::single(texture, grid.cell_uv(cx, cy))
}

/// Assemble the four minitiles of one autotiled cell.
///
/// `chunk_origin` is the chunk's top-left cell in the atlas; `flags`
/// gives each quadrant its (corner, vertical, horizontal) connectivity.
fn minitile_pieces(
    grid: AtlasGrid,
    chunk_origin: (u32, u32),
    layout: &[[(u8, u8); 5]; 4],
    flags: impl Fn(Quadrant) -> (bool, bool, bool),
) -> Vec<Piece> {
    Quadrant::ALL
        .iter()
        .enumerate()
        .map(|(qi, &q)| {
            let (corner, vertical, horizontal) = flags(q);
            let variant = layout_variant(corner, vertical, horizontal);
            let (hx, hy) = layout[qi][variant.table_slot()];
            Piece {
                source: grid.half_uv(chunk_origin.0, chunk_origin.1, hx, hy),
                destination: q.destination(),
            }
        })
        .collect()
}

/// Floor-style resolution: stored surroundings mask, 2x3 chunk.
fn floor_sprite(tile: Tile, grid: AtlasGrid, texture: Option<Handle<Texture>>) -> Sprite {
    let chunk_cols = grid.cols / CHUNK_W;
    if chunk_cols == 0 {
        return Sprite::default();
    }
    let index = auto_index(tile.id);
    let chunk_col = index % chunk_cols;
    let chunk_row = index / chunk_cols;
    let origin = (chunk_col * CHUNK_W, chunk_row * FLOOR_CHUNK_H);
    if origin.1 + FLOOR_CHUNK_H > grid.rows {
        return Sprite::default();
    }

    let mask = surroundings(tile.id);
    let pieces = minitile_pieces(grid, origin, &FLOOR_LAYOUT, |q| {
        (
            mask.connects(q.corner_dir()),
            mask.connects(q.vertical_dir()),
            mask.connects(q.horizontal_dir()),
        )
    });
    Sprite {
        texture,
        pieces,
        pivot: [0.0, 0.0],
    }
}

/// Wall-style resolution: chunk rows alternate ceiling (2x3, resolved as
/// floor with corners forced connected) and wall (2x2, connectivity
/// computed from column runs).
fn wall_sprite(
    map: &Map,
    layer_index: usize,
    x: u32,
    y: u32,
    tile: Tile,
    grid: AtlasGrid,
    texture: Option<Handle<Texture>>,
) -> Sprite {
    let chunk_cols = grid.cols / CHUNK_W;
    if chunk_cols == 0 {
        return Sprite::default();
    }
    let index = auto_index(tile.id);
    let chunk_col = index % chunk_cols;
    let chunk_row = index / chunk_cols;
    let is_wall_row = chunk_row % 2 == 1;
    // Ceiling and wall rows interleave: each pair occupies 3 + 2 cells.
    let origin_y = (chunk_row / 2) * (FLOOR_CHUNK_H + WALL_CHUNK_H)
        + if is_wall_row { FLOOR_CHUNK_H } else { 0 };
    let origin = (chunk_col * CHUNK_W, origin_y);
    let chunk_h = if is_wall_row { WALL_CHUNK_H } else { FLOOR_CHUNK_H };
    if origin.1 + chunk_h > grid.rows {
        return Sprite::default();
    }

    let pieces = if is_wall_row {
        let (up, down, left, right) = wall_connectivity(map, layer_index, x, y, index);
        minitile_pieces(grid, origin, &WALL_LAYOUT, |q| {
            let vertical = match q.vertical_dir() {
                Direction::Up => up,
                _ => down,
            };
            let horizontal = match q.horizontal_dir() {
                Direction::Left => left,
                _ => right,
            };
            (true, vertical, horizontal)
        })
    } else {
        // Ceiling: stored mask for the edges, corners forced connected -
        // ceilings never show concave corners.
        let mask = surroundings(tile.id);
        minitile_pieces(grid, origin, &FLOOR_LAYOUT, |q| {
            (
                true,
                mask.connects(q.vertical_dir()),
                mask.connects(q.horizontal_dir()),
            )
        })
    };
    Sprite {
        texture,
        pieces,
        pivot: [0.0, 0.0],
    }
}

/// Run lengths of matching wall tiles straight up and straight down from
/// (x, y), not counting the cell itself. Empty if the cell does not hold
/// a tile of `index`.
fn column_runs(map: &Map, layer_index: usize, x: u32, y: u32, index: u32) -> Option<(u32, u32)> {
    let here = map.tile(layer_index, x, y)?;
    if auto_index(here.id) != index {
        return None;
    }

    let mut up = 0;
    let mut cy = y;
    while cy > 0 {
        cy -= 1;
        match map.tile(layer_index, x, cy) {
            Some(t) if auto_index(t.id) == index => up += 1,
            _ => break,
        }
    }

    let mut down = 0;
    let mut cy = y + 1;
    while let Some(t) = map.tile(layer_index, x, cy) {
        if auto_index(t.id) != index {
            break;
        }
        down += 1;
        cy += 1;
    }

    Some((up, down))
}

/// Wall connectivity for the cell at (x, y).
///
/// Vertical: whether the wall continues directly above / below. A side
/// column connects only when it holds the same wall tile at this row AND
/// its up/down run lengths both equal this column's - otherwise the two
/// columns are different wall faces and keep their edges. Grid edges
/// never connect.
fn wall_connectivity(
    map: &Map,
    layer_index: usize,
    x: u32,
    y: u32,
    index: u32,
) -> (bool, bool, bool, bool) {
    let (up_run, down_run) = match column_runs(map, layer_index, x, y, index) {
        Some(runs) => runs,
        None => return (false, false, false, false),
    };

    let side_connects = |sx: u32| match column_runs(map, layer_index, sx, y, index) {
        Some((su, sd)) => su == up_run && sd == down_run,
        None => false,
    };

    let left = x > 0 && side_connects(x - 1);
    let right = side_connects(x + 1);
    (up_run > 0, down_run > 0, left, right)
}
