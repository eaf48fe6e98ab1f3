//! Toggle command results
//!
//! The chat command layer is owned by the host. It calls
//! [`Scheduler::toggle`](crate::Scheduler::toggle) and turns the returned
//! report into a message for the invoking user.

use crate::{EffectKind, KindSet, SlotIndex};
use std::fmt;

/// Aggregate state of the kinds a toggle request touched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Every requested kind is now on
    Enabled,
    /// Every requested kind is now off
    Disabled,
    /// Some requested kinds turned on, others off
    Mixed,
    /// The request named no kinds
    Unchanged,
}

/// What a toggle request did to one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleReport {
    slot: SlotIndex,
    enabled: KindSet,
    disabled: KindSet,
    active: KindSet,
}

impl ToggleReport {
    pub(crate) fn new(slot: SlotIndex) -> Self {
        Self {
            slot,
            enabled: KindSet::EMPTY,
            disabled: KindSet::EMPTY,
            active: KindSet::EMPTY,
        }
    }

    pub(crate) fn record(&mut self, kind: EffectKind, enabled: bool) {
        if enabled {
            self.enabled.insert(kind);
        } else {
            self.disabled.insert(kind);
        }
    }

    pub(crate) fn set_active(&mut self, active: KindSet) {
        self.active = active;
    }

    pub fn slot(&self) -> SlotIndex {
        self.slot
    }

    /// Kinds this request turned on
    pub fn enabled(&self) -> KindSet {
        self.enabled
    }

    /// Kinds this request turned off
    pub fn disabled(&self) -> KindSet {
        self.disabled
    }

    /// Every kind active on the slot after the request
    pub fn active(&self) -> KindSet {
        self.active
    }

    pub fn outcome(&self) -> ToggleOutcome {
        match (self.enabled.is_empty(), self.disabled.is_empty()) {
            (false, true) => ToggleOutcome::Enabled,
            (true, false) => ToggleOutcome::Disabled,
            (false, false) => ToggleOutcome::Mixed,
            (true, true) => ToggleOutcome::Unchanged,
        }
    }
}

impl fmt::Display for ToggleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome() {
            ToggleOutcome::Enabled => write!(f, "enabled: {}", self.enabled),
            ToggleOutcome::Disabled => write!(f, "disabled: {}", self.disabled),
            ToggleOutcome::Mixed => {
                write!(f, "enabled: {}; disabled: {}", self.enabled, self.disabled)
            }
            ToggleOutcome::Unchanged => write!(f, "nothing to toggle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome() {
        let mut report = ToggleReport::new(SlotIndex::new(1));
        assert_eq!(report.outcome(), ToggleOutcome::Unchanged);
        assert_eq!(report.to_string(), "nothing to toggle");

        report.record(EffectKind::Glow, true);
        report.record(EffectKind::WaterWalking, true);
        assert_eq!(report.outcome(), ToggleOutcome::Enabled);
        assert_eq!(report.to_string(), "enabled: glow, water_walking");

        report.record(EffectKind::LavaImmunity, false);
        assert_eq!(report.outcome(), ToggleOutcome::Mixed);
        assert_eq!(
            report.to_string(),
            "enabled: glow, water_walking; disabled: lava_immunity"
        );
    }

    #[test]
    fn test_disabled() {
        let mut report = ToggleReport::new(SlotIndex::new(1));
        report.record(EffectKind::Glow, false);
        report.set_active([EffectKind::WaterWalking].into_iter().collect());

        assert_eq!(report.outcome(), ToggleOutcome::Disabled);
        assert_eq!(report.slot(), SlotIndex::new(1));
        assert!(report.disabled().contains(EffectKind::Glow));
        assert!(report.enabled().is_empty());
        assert!(report.active().contains(EffectKind::WaterWalking));
    }
}
