//! Reapplication pass: refresh every maintained effect once
//!
//! Host effects expire after their catalog duration. Re-issuing each active
//! toggle's effect every interval, with the interval shorter than the
//! shortest duration, keeps the effect on the entity without a visible gap.
//!
//! The pass only reads the slot table. A host rejection for one slot (for
//! example an entity that left between the gate check and the apply) is
//! logged and counted, and the sweep moves on.

use crate::{ApplyError, CatalogEntry, EffectCatalog, EffectId, EffectKind, SlotIndex, SlotTable};
use tracing::{debug, warn};

/// One apply-effect call to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectApplication {
    pub slot: SlotIndex,
    pub kind: EffectKind,
    pub effect_id: EffectId,
    pub duration_ticks: u32,
    /// Host-defined trailing flag on the apply call
    pub force: bool,
}

impl EffectApplication {
    /// Build the application of a catalog entry to a slot
    pub fn new(slot: SlotIndex, kind: EffectKind, entry: &CatalogEntry) -> Self {
        Self {
            slot,
            kind,
            effect_id: entry.effect_id,
            duration_ticks: entry.duration_ticks,
            force: entry.force,
        }
    }
}

/// The host's apply-effect operation
///
/// Implementations must not call back into the scheduler's mutating
/// operations: the pass holds the slot table's read lock while applying.
pub trait EffectSink {
    fn apply_effect(&self, application: &EffectApplication) -> Result<(), ApplyError>;
}

impl<F> EffectSink for F
where
    F: Fn(&EffectApplication) -> Result<(), ApplyError>,
{
    fn apply_effect(&self, application: &EffectApplication) -> Result<(), ApplyError> {
        self(application)
    }
}

/// What a pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Slots with at least one active toggle
    pub active_slots: usize,
    /// Successful apply calls
    pub applied: usize,
    /// Apply calls the host rejected
    pub failed: usize,
    /// Active kinds with no catalog entry
    pub skipped: usize,
}

impl PassReport {
    /// Total apply calls issued
    pub fn attempted(&self) -> usize {
        self.applied + self.failed
    }
}

/// Sweep the table and re-apply every active toggle's effect
pub fn run(table: &SlotTable, catalog: &EffectCatalog, sink: &dyn EffectSink) -> PassReport {
    let mut report = PassReport::default();

    for (slot, kinds) in table.active_slots() {
        report.active_slots += 1;

        for kind in kinds.iter() {
            let Some(entry) = catalog.get(kind) else {
                warn!(%slot, %kind, "active toggle has no catalog entry");
                report.skipped += 1;
                continue;
            };

            let application = EffectApplication::new(slot, kind, entry);
            match sink.apply_effect(&application) {
                Ok(()) => report.applied += 1,
                Err(e) => {
                    debug!(%slot, %kind, error = %e, "reapply failed, continuing");
                    report.failed += 1;
                }
            }
        }
    }

    report
}
