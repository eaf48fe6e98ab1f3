//! Buffkeep Core - Periodic status-effect scheduler
//!
//! This crate keeps timed status effects alive on connected entities by
//! re-applying them on a fixed interval:
//! - Slot table of per-entity, per-kind toggles (`SlotTable`)
//! - Effect catalog mapping kinds to host effects and durations (`EffectCatalog`)
//! - Tick gate converting the host tick into a fixed-rate trigger (`TickGate`)
//! - Reapplication pass refreshing every active toggle (`pass::run`)
//! - `Scheduler` tying them together behind a thread-safe contract
//!
//! ## Control flow
//!
//! ```text
//! host tick ──► Scheduler::on_tick ──► TickGate ──(due)──► pass::run ──► EffectSink
//! host disconnect ──► Scheduler::on_disconnect ──► SlotTable::clear_all
//! toggle command ──► Scheduler::toggle ──► SlotTable::flip ──► ToggleReport
//! ```
//!
//! The host side (hook subscriptions, the plugin lifecycle) lives in
//! `buffkeep-host`.

pub mod catalog;
mod command;
pub mod config;
mod effect;
mod error;
pub mod gate;
mod identity;
pub mod pass;
mod scheduler;
mod table;

pub use catalog::{CatalogEntry, EffectCatalog};
pub use command::{ToggleOutcome, ToggleReport};
pub use config::{ConfigError, SchedulerConfig};
pub use effect::{EffectKind, KindSet};
pub use error::{ApplyError, Error, Result};
pub use gate::{ManualClock, MonotonicClock, TickGate, TimeSource};
pub use identity::{EffectId, SlotIndex};
pub use pass::{EffectApplication, EffectSink, PassReport};
pub use scheduler::Scheduler;
pub use table::SlotTable;
