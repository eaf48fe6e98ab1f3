//! In-memory host server for demos and tests
//!
//! `SimHost` plays the part of the game server: it owns the host hooks,
//! tracks which slots are connected, counts host ticks, and keeps effects on
//! entities until their duration runs out. Applying an effect to a slot
//! with no connection fails with [`ApplyError::NotConnected`].

use crate::hooks::{HostHooks, LeaveArgs, LoginArgs};
use buffkeep_core::{ApplyError, EffectApplication, EffectId, EffectSink, ManualClock, SlotIndex};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug, Default)]
struct SimState {
    tick: u64,
    connected: Vec<bool>,
    /// Host tick at which each (slot, effect) lapses
    expires: HashMap<(SlotIndex, EffectId), u64>,
    applied: Vec<EffectApplication>,
}

/// Simulated game server
pub struct SimHost {
    hooks: HostHooks,
    clock: ManualClock,
    ticks_per_second: u32,
    state: Mutex<SimState>,
}

impl SimHost {
    /// Create a host with `max_slots` empty slots and a clock frozen at `start`
    pub fn new(max_slots: usize, ticks_per_second: u32, start: Instant) -> Self {
        Self {
            hooks: HostHooks::new(),
            clock: ManualClock::new(start),
            ticks_per_second: ticks_per_second.max(1),
            state: Mutex::new(SimState {
                connected: vec![false; max_slots],
                ..SimState::default()
            }),
        }
    }

    pub fn hooks(&self) -> &HostHooks {
        &self.hooks
    }

    /// The host clock; advances by one tick length per [`SimHost::tick`]
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Wall time of one host tick
    pub fn tick_length(&self) -> Duration {
        Duration::from_micros(1_000_000 / u64::from(self.ticks_per_second))
    }

    pub fn current_tick(&self) -> u64 {
        self.state.lock().tick
    }

    /// Advance one host tick and fire the tick hook
    pub fn tick(&self) {
        {
            let mut state = self.state.lock();
            state.tick += 1;
            let now = state.tick;
            state.expires.retain(|_, until| *until > now);
        }
        self.clock.advance(self.tick_length());
        self.hooks.tick.emit(&());
    }

    /// Run `count` host ticks
    pub fn run_ticks(&self, count: u64) {
        for _ in 0..count {
            self.tick();
        }
    }

    /// Occupy a slot and fire the login hook
    pub fn login(&self, slot: SlotIndex, eligible: bool) {
        {
            let mut state = self.state.lock();
            if let Some(connected) = state.connected.get_mut(slot.raw()) {
                *connected = true;
            }
        }
        self.hooks.login.emit(&LoginArgs { slot, eligible });
    }

    /// Tear a connection down: drop its effects and fire the leave hook
    pub fn leave(&self, slot: SlotIndex) {
        {
            let mut state = self.state.lock();
            if let Some(connected) = state.connected.get_mut(slot.raw()) {
                *connected = false;
            }
            state.expires.retain(|(s, _), _| *s != slot);
        }
        self.hooks.leave.emit(&LeaveArgs { slot });
    }

    pub fn is_connected(&self, slot: SlotIndex) -> bool {
        self.state
            .lock()
            .connected
            .get(slot.raw())
            .copied()
            .unwrap_or(false)
    }

    /// True while the effect is on the entity
    pub fn has_effect(&self, slot: SlotIndex, effect_id: EffectId) -> bool {
        let state = self.state.lock();
        state
            .expires
            .get(&(slot, effect_id))
            .is_some_and(|until| *until > state.tick)
    }

    /// Every accepted application so far
    pub fn applied(&self) -> Vec<EffectApplication> {
        self.state.lock().applied.clone()
    }

    /// Accepted applications for one slot
    pub fn applied_to(&self, slot: SlotIndex) -> usize {
        self.state
            .lock()
            .applied
            .iter()
            .filter(|app| app.slot == slot)
            .count()
    }
}

impl EffectSink for SimHost {
    fn apply_effect(&self, application: &EffectApplication) -> Result<(), ApplyError> {
        let mut state = self.state.lock();
        let connected = state
            .connected
            .get(application.slot.raw())
            .copied()
            .unwrap_or(false);
        if !connected {
            return Err(ApplyError::NotConnected(application.slot));
        }

        let until = state.tick + u64::from(application.duration_ticks);
        let expiry = state
            .expires
            .entry((application.slot, application.effect_id))
            .or_insert(0);
        // Without force the host keeps the longer of the two
        *expiry = if application.force {
            until
        } else {
            (*expiry).max(until)
        };
        state.applied.push(*application);
        Ok(())
    }
}
