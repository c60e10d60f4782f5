//! Type-tagged item handles
//!
//! A `Handle<T>` names an item inside the `Registry<T>` of the same type
//! and owns nothing. There is no reserved "null" id: an absent reference
//! is `Option<Handle<T>>`, so a valid-looking id can never be handed to
//! the wrong registry by accident.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque, type-tagged, non-owning reference to a registry item.
///
/// Dereferencing goes through the owning registry and may come back empty
/// if the item was never stored or has been unloaded. Two handles of the
/// same type are equal iff their ids are equal.
pub struct Handle<T> {
    id: u64,
    _kind: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    /// Only registries mint handles; everyone else receives them.
    pub(crate) fn new(id: u64) -> Self {
        Self {
            id,
            _kind: PhantomData,
        }
    }

    /// The raw id, unique within this handle's content type.
    pub fn id(&self) -> u64 {
        self.id
    }
}

// Manual impls: the derives would bound T, and the tag type never needs
// to be cloneable or comparable itself.

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full = std::any::type_name::<T>();
        let short = full.rsplit("::").next().unwrap_or(full);
        write!(f, "Handle<{}>({})", short, self.id)
    }
}

// Handles travel through payloads as the bare integer id.

impl<T> Serialize for Handle<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.id)
    }
}

impl<'de, T> Deserialize<'de> for Handle<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u64::deserialize(deserializer).map(Handle::new)
    }
}
