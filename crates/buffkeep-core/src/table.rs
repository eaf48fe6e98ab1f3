//! Entity slot table: per-slot, per-kind toggle state
//!
//! Storage is one fixed-size boolean vector per [`EffectKind`], each indexed
//! by [`SlotIndex`]. The vectors never grow; the capacity is the host's
//! maximum connection count and is fixed when the table is built.
//!
//! A slot with no active toggles has every vector false at its index. All
//! mutation goes through this type so that invariant holds in one place.

use crate::{EffectKind, Error, KindSet, Result, SlotIndex};

/// Fixed-capacity toggle store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    toggles: [Vec<bool>; EffectKind::COUNT],
    capacity: usize,
}

impl SlotTable {
    /// Create a table with every slot resting
    pub fn new(capacity: usize) -> Self {
        Self {
            toggles: std::array::from_fn(|_| vec![false; capacity]),
            capacity,
        }
    }

    /// Number of slots
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn check(&self, slot: SlotIndex) -> Result<usize> {
        if slot.raw() < self.capacity {
            Ok(slot.raw())
        } else {
            Err(Error::InvalidSlot {
                slot,
                capacity: self.capacity,
            })
        }
    }

    /// Set one toggle; setting it to its current value is a no-op
    pub fn set_toggle(&mut self, slot: SlotIndex, kind: EffectKind, enabled: bool) -> Result<()> {
        let i = self.check(slot)?;
        self.toggles[kind.index()][i] = enabled;
        Ok(())
    }

    /// Invert one toggle and return its new value
    pub fn flip(&mut self, slot: SlotIndex, kind: EffectKind) -> Result<bool> {
        let i = self.check(slot)?;
        let cell = &mut self.toggles[kind.index()][i];
        *cell = !*cell;
        Ok(*cell)
    }

    /// Check a single toggle
    pub fn is_active(&self, slot: SlotIndex, kind: EffectKind) -> Result<bool> {
        let i = self.check(slot)?;
        Ok(self.toggles[kind.index()][i])
    }

    /// True if any kind is enabled for the slot
    pub fn is_any_active(&self, slot: SlotIndex) -> Result<bool> {
        let i = self.check(slot)?;
        Ok(self.toggles.iter().any(|column| column[i]))
    }

    /// The set of enabled kinds for the slot
    pub fn active_kinds(&self, slot: SlotIndex) -> Result<KindSet> {
        let i = self.check(slot)?;
        Ok(EffectKind::ALL
            .into_iter()
            .filter(|kind| self.toggles[kind.index()][i])
            .collect())
    }

    /// Reset every toggle for the slot; idempotent
    pub fn clear_all(&mut self, slot: SlotIndex) -> Result<()> {
        let i = self.check(slot)?;
        for column in &mut self.toggles {
            column[i] = false;
        }
        Ok(())
    }

    /// Iterate `(slot, kinds)` for every slot that is not resting
    pub fn active_slots(&self) -> impl Iterator<Item = (SlotIndex, KindSet)> + '_ {
        (0..self.capacity).filter_map(move |i| {
            let kinds: KindSet = EffectKind::ALL
                .into_iter()
                .filter(|kind| self.toggles[kind.index()][i])
                .collect();
            (!kinds.is_empty()).then_some((SlotIndex::new(i), kinds))
        })
    }

    /// Number of slots with at least one toggle
    pub fn active_count(&self) -> usize {
        self.active_slots().count()
    }
}
