//! The scheduler: slot table, catalog, and tick gate behind one contract
//!
//! A `Scheduler` is built once at plugin startup and shared with the host
//! glue as `Arc<Scheduler>`. Host callbacks may arrive on different threads:
//!
//! - the slot table sits behind a table-wide `RwLock`; a pass holds the read
//!   lock for its whole sweep, toggles and disconnects take the write lock,
//!   so a disconnect is never interleaved with a pass reading that slot
//! - the gate sits behind its own `Mutex`, so only one caller per interval
//!   wins the right to run a pass

use crate::command::ToggleReport;
use crate::config::{validate_interval, ConfigError, SchedulerConfig};
use crate::pass::{self, EffectApplication, EffectSink, PassReport};
use crate::{EffectCatalog, EffectKind, KindSet, Result, SlotIndex, SlotTable, TickGate};
use parking_lot::{Mutex, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Periodic status-effect scheduler
pub struct Scheduler {
    table: RwLock<SlotTable>,
    gate: Mutex<TickGate>,
    catalog: EffectCatalog,
    ticks_per_second: u32,
}

impl Scheduler {
    /// Build a scheduler from a validated config, starting the gate at `start`
    pub fn from_config(
        config: &SchedulerConfig,
        start: Instant,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_parts(
            SlotTable::new(config.max_slots),
            config.catalog(),
            TickGate::starting_at(config.interval(), start),
            config.ticks_per_second,
        ))
    }

    /// Build a scheduler with an explicit catalog and interval
    ///
    /// Fails if the interval would let a maintained effect lapse.
    pub fn new(
        max_slots: usize,
        catalog: EffectCatalog,
        interval: Duration,
        ticks_per_second: u32,
        start: Instant,
    ) -> std::result::Result<Self, ConfigError> {
        validate_interval(&catalog, interval, ticks_per_second)?;
        Ok(Self::with_parts(
            SlotTable::new(max_slots),
            catalog,
            TickGate::starting_at(interval, start),
            ticks_per_second,
        ))
    }

    fn with_parts(
        table: SlotTable,
        catalog: EffectCatalog,
        gate: TickGate,
        ticks_per_second: u32,
    ) -> Self {
        Self {
            table: RwLock::new(table),
            gate: Mutex::new(gate),
            catalog,
            ticks_per_second,
        }
    }

    pub fn capacity(&self) -> usize {
        self.table.read().capacity()
    }

    pub fn catalog(&self) -> &EffectCatalog {
        &self.catalog
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    pub fn interval(&self) -> Duration {
        self.gate.lock().interval()
    }

    /// Timestamp of the last pass
    pub fn last_pass(&self) -> Instant {
        self.gate.lock().last_pass()
    }

    // === Host tick ===

    /// Host tick callback: run a pass if the interval has elapsed
    ///
    /// Returns the pass report when a pass ran.
    pub fn on_tick(&self, now: Instant, sink: &dyn EffectSink) -> Option<PassReport> {
        if !self.gate.lock().on_tick(now) {
            return None;
        }
        Some(self.run_pass(sink))
    }

    /// Run a pass immediately, bypassing the gate
    pub fn run_pass(&self, sink: &dyn EffectSink) -> PassReport {
        let table = self.table.read();
        let report = pass::run(&table, &self.catalog, sink);
        trace!(
            active = report.active_slots,
            applied = report.applied,
            failed = report.failed,
            "reapplication pass"
        );
        report
    }

    // === Lifecycle ===

    /// Host disconnect callback: the slot goes back to resting
    pub fn on_disconnect(&self, slot: SlotIndex) -> Result<()> {
        let mut table = self.table.write();
        let had_toggles = table.is_any_active(slot)?;
        table.clear_all(slot)?;
        if had_toggles {
            debug!(%slot, "cleared toggles on disconnect");
        }
        Ok(())
    }

    // === Toggle state ===

    /// Enable or disable one maintained kind for a slot
    pub fn set_toggle(&self, slot: SlotIndex, kind: EffectKind, enabled: bool) -> Result<()> {
        self.catalog.check_toggleable(kind)?;
        self.table.write().set_toggle(slot, kind, enabled)
    }

    /// Flip each requested kind for a slot and report the result
    ///
    /// All kinds are checked before any is flipped, so a rejected request
    /// leaves the slot unchanged.
    pub fn toggle(&self, slot: SlotIndex, kinds: &[EffectKind]) -> Result<ToggleReport> {
        for kind in kinds {
            self.catalog.check_toggleable(*kind)?;
        }

        let mut table = self.table.write();
        // Validates the slot before any mutation
        table.is_any_active(slot)?;

        let mut report = ToggleReport::new(slot);
        let requested: KindSet = kinds.iter().copied().collect();
        for kind in requested.iter() {
            let enabled = table.flip(slot, kind)?;
            report.record(kind, enabled);
        }
        report.set_active(table.active_kinds(slot)?);

        debug!(%slot, outcome = ?report.outcome(), "toggled");
        Ok(report)
    }

    pub fn is_any_active(&self, slot: SlotIndex) -> Result<bool> {
        self.table.read().is_any_active(slot)
    }

    pub fn active_kinds(&self, slot: SlotIndex) -> Result<KindSet> {
        self.table.read().active_kinds(slot)
    }

    /// Number of slots with at least one toggle
    pub fn active_count(&self) -> usize {
        self.table.read().active_count()
    }

    // === One-shot grants ===

    /// Apply a catalog effect once without toggling it
    pub fn grant(&self, slot: SlotIndex, kind: EffectKind, sink: &dyn EffectSink) -> Result<()> {
        let entry = self.catalog.entry(kind)?;
        let capacity = self.capacity();
        if slot.raw() >= capacity {
            return Err(crate::Error::InvalidSlot { slot, capacity });
        }
        sink.apply_effect(&EffectApplication::new(slot, kind, entry))?;
        debug!(%slot, %kind, "granted");
        Ok(())
    }
}
