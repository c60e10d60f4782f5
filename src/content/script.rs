//! Script content - source text plus its trigger condition
//!
//! Scripts are pure data here; compiling and running them belongs to the
//! embedding application's scripting layer.

use serde::{Deserialize, Serialize};

use super::{from_payload, to_payload, AssetKind, ContentError};

/// When the scripting layer should fire a script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerKind {
    /// Runs once when its owner spawns
    Auto,
    /// Fires when something enters the owner's cell
    OnEnter,
    /// Fires when something leaves the owner's cell
    OnExit,
    /// Fires on explicit player interaction
    Interact,
}

impl Default for TriggerKind {
    fn default() -> Self {
        TriggerKind::Auto
    }
}

/// A named script body and the condition that runs it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub name: String,
    pub source: String,
    pub trigger: TriggerKind,
}

impl AssetKind for Script {
    const KIND: &'static str = "script";
    const SUBDIR: &'static str = "scripts";
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
        let script = Script {
            name: "open_gate".to_string(),
            source: "gate:open()\n".to_string(),
            trigger: TriggerKind::Interact,
        };
        let bytes = script.save_data().unwrap();
        let mut back = Script::default();
        back.raw_load(&bytes).unwrap();
        assert_eq!(back, script);
    }

    #[test]
    fn test_missing_source_fails() {
        let mut script = Script::default();
        let err = script
            .raw_load(b"(name: \"broken\", trigger: Auto)")
            .unwrap_err();
        assert!(err.to_string().contains("source"));
    }
}
