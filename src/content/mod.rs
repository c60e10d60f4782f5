//! Content types and their load/save/release contracts
//!
//! Every item the pipeline stores implements [`AssetKind`]: how to populate
//! itself from a payload, how to produce a self-contained payload for
//! saving, and how to release anything it holds outside the registry.
//!
//! Structured payloads are RON, written brotli-compressed and read back
//! with auto-detection (a file starting with `(` or whitespace is plain
//! RON). Texture payloads are encoded image bytes with no wrapper.

mod entity;
mod map;
mod script;
mod sprite;
mod texture;
mod tileset;

pub use entity::Entity;
pub use map::{limits, validate_map, Comment, Layer, Map, Tile};
pub use script::{Script, TriggerKind};
pub use sprite::{Piece, Rect, Sprite};
pub use texture::Texture;
pub use tileset::{AutoKind, Tileset};

use std::io::Cursor;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Error type for content payload operations
#[derive(Debug)]
pub enum ContentError {
    /// Structured payload could not be parsed
    Parse(String),
    /// Image payload could not be decoded
    Decode(String),
    /// Payload could not be produced
    Encode(String),
    /// Payload parsed but failed validation
    Validation(String),
}

impl std::fmt::Display for ContentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContentError::Parse(msg) => write!(f, "parse error: {}", msg),
            ContentError::Decode(msg) => write!(f, "decode error: {}", msg),
            ContentError::Encode(msg) => write!(f, "encode error: {}", msg),
            ContentError::Validation(msg) => write!(f, "validation error: {}", msg),
        }
    }
}

impl std::error::Error for ContentError {}

impl From<ron::error::SpannedError> for ContentError {
    fn from(e: ron::error::SpannedError) -> Self {
        ContentError::Parse(e.to_string())
    }
}

impl From<ron::Error> for ContentError {
    fn from(e: ron::Error) -> Self {
        ContentError::Encode(e.to_string())
    }
}

impl ContentError {
    /// Prefix the message with the owning kind and id, so batch failures
    /// stay attributable after the error leaves the registry.
    pub fn for_item(self, kind: &'static str, id: u64) -> ContentError {
        let tag = |msg: String| format!("{} {}: {}", kind, id, msg);
        match self {
            ContentError::Parse(m) => ContentError::Parse(tag(m)),
            ContentError::Decode(m) => ContentError::Decode(tag(m)),
            ContentError::Encode(m) => ContentError::Encode(tag(m)),
            ContentError::Validation(m) => ContentError::Validation(tag(m)),
        }
    }
}

/// Contract every content type implements.
///
/// The registry and the persistence layer drive items exclusively through
/// this trait; dispatch stays static. File I/O is the caller's job -
/// `raw_load` receives the payload bytes so an unreadable path is reported
/// by whoever holds the path.
pub trait AssetKind: Default {
    /// Type name, used for the per-kind index file and in error messages
    const KIND: &'static str;
    /// Payload subdirectory under the project root
    const SUBDIR: &'static str;
    /// Payload file extension
    const EXT: &'static str;

    /// Populate `self` from a payload. On failure the item may be left
    /// partially initialized; the caller decides whether to keep it.
    fn raw_load(&mut self, bytes: &[u8]) -> Result<(), ContentError>;

    /// Serialize to a self-contained payload. Derived state is excluded
    /// and rebuilt on load.
    fn save_data(&self) -> Result<Vec<u8>, ContentError>;

    /// Release any resource held outside the registry. No-op for
    /// pure-data types.
    fn raw_unload(&mut self) {}
}

/// Shared pretty-printer settings for every RON file the crate writes
pub(crate) fn pretty_config() -> ron::ser::PrettyConfig {
    ron::ser::PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string())
}

/// Serialize a value to a compressed RON payload (quality 6, window 22)
pub(crate) fn to_payload<T: Serialize>(value: &T) -> Result<Vec<u8>, ContentError> {
    let ron_string = ron::ser::to_string_pretty(value, pretty_config())?;

    let mut compressed = Vec::new();
    brotli::BrotliCompress(
        &mut Cursor::new(ron_string.as_bytes()),
        &mut compressed,
        &brotli::enc::BrotliEncoderParams {
            quality: 6,
            lgwin: 22,
            ..Default::default()
        },
    )
    .map_err(|e| ContentError::Encode(format!("compression failed: {}", e)))?;

    Ok(compressed)
}

/// Parse a RON payload, decompressing first unless it is plain text.
/// RON starts with '(' or whitespace; anything else is treated as brotli.
pub(crate) fn from_payload<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ContentError> {
    let is_plain_ron = bytes
        .first()
        .map(|&b| b == b'(' || b == b' ' || b == b'\n' || b == b'\r' || b == b'\t')
        .unwrap_or(false);

    let contents = if is_plain_ron {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ContentError::Parse(format!("invalid UTF-8: {}", e)))?
    } else {
        let mut decompressed = Vec::new();
        brotli::BrotliDecompress(&mut Cursor::new(bytes), &mut decompressed)
            .map_err(|e| ContentError::Parse(format!("brotli decompression failed: {}", e)))?;
        String::from_utf8(decompressed)
            .map_err(|e| ContentError::Parse(format!("invalid UTF-8 after decompression: {}", e)))?
    };

    Ok(ron::from_str(&contents)?)
}
