//! Identity types for connection slots and host effects

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a connection slot on the host server
///
/// The host recycles slots across disconnect/reconnect cycles, so a slot
/// identifies a connection only for as long as that connection lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotIndex(pub usize);

impl SlotIndex {
    /// Create a new slot index
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// Get the raw index value
    pub fn raw(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot:{}", self.0)
    }
}

impl From<usize> for SlotIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

/// Host-side identifier of a status effect (the host's buff type id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectId(pub u32);

impl EffectId {
    /// Create a new effect ID
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value
    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EffectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effect:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_index() {
        let slot = SlotIndex::new(5);
        assert_eq!(slot.raw(), 5);
        assert_eq!(format!("{}", slot), "slot:5");
        assert_eq!(SlotIndex::from(5), slot);
    }

    #[test]
    fn test_effect_id() {
        let id = EffectId::new(11);
        assert_eq!(id.raw(), 11);
        assert_eq!(format!("{}", id), "effect:11");
    }
}
