//! The status-effect plugin: wires a `Scheduler` into the host hooks
//!
//! `initialize` subscribes to the tick, login and leave hooks and keeps the
//! returned handles. `dispose` (or dropping the plugin) releases them, so
//! the host never calls into an unloaded plugin.
//!
//! ```text
//! tick hook  ──► Scheduler::on_tick(clock.now(), sink)
//! leave hook ──► Scheduler::on_disconnect(slot)
//! login hook ──► Scheduler::grant(slot, kind, sink)   (eligible entities only)
//! command    ──► StatusPlugin::toggle ──► Scheduler::toggle
//! command    ──► StatusPlugin::grant  ──► Scheduler::grant(slot, kind, sink)
//! ```

use crate::hooks::{HookHandle, HostHooks};
use crate::{Error, Result};
use buffkeep_core::{
    EffectKind, EffectSink, Scheduler, SchedulerConfig, SlotIndex, TimeSource, ToggleReport,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Plugin metadata reported to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    pub description: &'static str,
}

/// Everything the plugin needs from its host
#[derive(Clone)]
pub struct PluginContext {
    pub scheduler: Arc<Scheduler>,
    /// The host's apply-effect operation
    pub sink: Arc<dyn EffectSink + Send + Sync>,
    /// Clock used to timestamp host ticks
    pub clock: Arc<dyn TimeSource>,
    /// Kinds granted once to eligible entities on login
    pub grant_on_login: Vec<EffectKind>,
}

impl PluginContext {
    /// Build a context with a scheduler constructed from `config`
    pub fn from_config(
        config: &SchedulerConfig,
        sink: Arc<dyn EffectSink + Send + Sync>,
        clock: Arc<dyn TimeSource>,
    ) -> Result<Self> {
        let scheduler = Scheduler::from_config(config, clock.now())?;
        Ok(Self {
            scheduler: Arc::new(scheduler),
            sink,
            clock,
            grant_on_login: config.grant_on_login.clone(),
        })
    }
}

/// Loaded plugin instance
pub struct StatusPlugin {
    scheduler: Arc<Scheduler>,
    sink: Arc<dyn EffectSink + Send + Sync>,
    handles: Mutex<Vec<HookHandle>>,
}

impl StatusPlugin {
    pub const INFO: PluginInfo = PluginInfo {
        name: "buffkeep",
        version: env!("CARGO_PKG_VERSION"),
        author: "buffkeep contributors",
        description: "Keeps toggled status effects on players",
    };

    /// Subscribe to the host hooks
    pub fn initialize(hooks: &HostHooks, ctx: PluginContext) -> Self {
        let mut handles = Vec::with_capacity(3);

        {
            let scheduler = Arc::clone(&ctx.scheduler);
            let sink = Arc::clone(&ctx.sink);
            let clock = Arc::clone(&ctx.clock);
            handles.push(hooks.tick.subscribe(move |_| {
                if let Some(report) = scheduler.on_tick(clock.now(), &*sink) {
                    if report.failed > 0 {
                        debug!(failed = report.failed, "some reapplications were rejected");
                    }
                }
            }));
        }

        {
            let scheduler = Arc::clone(&ctx.scheduler);
            handles.push(hooks.leave.subscribe(move |args| {
                if let Err(e) = scheduler.on_disconnect(args.slot) {
                    error!(slot = %args.slot, error = %e, "leave hook for unknown slot");
                    debug_assert!(false, "leave hook for out-of-range slot: {e}");
                }
            }));
        }

        {
            let scheduler = Arc::clone(&ctx.scheduler);
            let sink = Arc::clone(&ctx.sink);
            let grants = ctx.grant_on_login.clone();
            handles.push(hooks.login.subscribe(move |args| {
                if !args.eligible {
                    return;
                }
                for kind in &grants {
                    if let Err(e) = scheduler.grant(args.slot, *kind, &*sink) {
                        warn!(slot = %args.slot, %kind, error = %e, "login grant failed");
                    }
                }
            }));
        }

        info!(
            name = Self::INFO.name,
            version = Self::INFO.version,
            slots = ctx.scheduler.capacity(),
            interval = ?ctx.scheduler.interval(),
            "plugin initialized"
        );

        Self {
            scheduler: ctx.scheduler,
            sink: ctx.sink,
            handles: Mutex::new(handles),
        }
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    pub fn is_loaded(&self) -> bool {
        !self.handles.lock().is_empty()
    }

    /// Toggle command entry point for the host's command layer
    pub fn toggle(&self, slot: SlotIndex, kinds: &[EffectKind]) -> Result<ToggleReport> {
        if !self.is_loaded() {
            return Err(Error::Disposed);
        }
        Ok(self.scheduler.toggle(slot, kinds)?)
    }

    /// One-shot command entry point: apply `kind` once to `slot`
    pub fn grant(&self, slot: SlotIndex, kind: EffectKind) -> Result<()> {
        if !self.is_loaded() {
            return Err(Error::Disposed);
        }
        self.scheduler.grant(slot, kind, &*self.sink)?;
        Ok(())
    }

    /// Release every hook subscription; idempotent
    pub fn dispose(&self) {
        let handles: Vec<HookHandle> = self.handles.lock().drain(..).collect();
        if handles.is_empty() {
            return;
        }
        for handle in handles {
            handle.release();
        }
        info!(name = Self::INFO.name, "plugin disposed");
    }
}

impl Drop for StatusPlugin {
    fn drop(&mut self) {
        self.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SimHost;
    use buffkeep_core::{EffectCatalog, ToggleOutcome};
    use std::time::Instant;

    const TPS: u32 = 60;

    fn setup(config: SchedulerConfig) -> (Arc<SimHost>, StatusPlugin) {
        let host = Arc::new(SimHost::new(config.max_slots, TPS, Instant::now()));
        let ctx = PluginContext::from_config(
            &config,
            Arc::clone(&host) as Arc<dyn EffectSink + Send + Sync>,
            Arc::new(host.clock().clone()),
        )
        .unwrap();
        let plugin = StatusPlugin::initialize(host.hooks(), ctx);
        (host, plugin)
    }

    fn glow_id() -> buffkeep_core::EffectId {
        EffectCatalog::standard()
            .get(EffectKind::Glow)
            .unwrap()
            .effect_id
    }

    #[test]
    fn test_initialize_subscribes_and_dispose_releases() {
        let (host, plugin) = setup(SchedulerConfig::default());
        assert!(plugin.is_loaded());
        assert_eq!(host.hooks().tick.subscriber_count(), 1);
        assert_eq!(host.hooks().login.subscriber_count(), 1);
        assert_eq!(host.hooks().leave.subscriber_count(), 1);

        plugin.dispose();
        assert!(!plugin.is_loaded());
        assert_eq!(host.hooks().tick.subscriber_count(), 0);
        assert_eq!(host.hooks().leave.subscriber_count(), 0);

        // Disposing twice is harmless
        plugin.dispose();
        assert!(matches!(
            plugin.toggle(SlotIndex::new(0), &[EffectKind::Glow]),
            Err(Error::Disposed)
        ));
    }

    #[test]
    fn test_drop_releases_hooks() {
        let (host, plugin) = setup(SchedulerConfig::default());
        drop(plugin);
        assert_eq!(host.hooks().tick.subscriber_count(), 0);
        assert_eq!(host.hooks().login.subscriber_count(), 0);
    }

    #[test]
    fn test_toggled_effect_never_lapses() {
        let (host, plugin) = setup(SchedulerConfig::default());
        let slot = SlotIndex::new(5);
        host.login(slot, false);

        let report = plugin.toggle(slot, &[EffectKind::Glow]).unwrap();
        assert_eq!(report.outcome(), ToggleOutcome::Enabled);

        // First pass lands one interval after startup
        host.run_ticks(u64::from(TPS) + 1);
        assert!(host.has_effect(slot, glow_id()));

        // Ten more intervals, checked every tick
        for _ in 0..(10 * TPS) {
            host.tick();
            assert!(host.has_effect(slot, glow_id()));
        }
        assert!(host.applied_to(slot) >= 9);
    }

    #[test]
    fn test_leave_and_rejoin_starts_resting() {
        let (host, plugin) = setup(SchedulerConfig::default());
        let slot = SlotIndex::new(5);
        host.login(slot, false);
        plugin
            .toggle(slot, &[EffectKind::Glow, EffectKind::LavaImmunity])
            .unwrap();
        host.run_ticks(u64::from(TPS) + 1);
        let before = host.applied_to(slot);
        assert_eq!(before, 2);

        host.leave(slot);
        assert!(!plugin.scheduler().is_any_active(slot).unwrap());

        // A new entity takes the same slot
        host.login(slot, false);
        host.run_ticks(5 * u64::from(TPS));
        assert_eq!(host.applied_to(slot), before);
        assert!(!host.has_effect(slot, glow_id()));
    }

    #[test]
    fn test_untouched_slots_receive_nothing() {
        let (host, plugin) = setup(SchedulerConfig::default());
        for i in 0..4 {
            host.login(SlotIndex::new(i), false);
        }
        plugin.toggle(SlotIndex::new(2), &[EffectKind::WaterWalking]).unwrap();

        host.run_ticks(3 * u64::from(TPS));
        assert!(host.applied_to(SlotIndex::new(2)) > 0);
        for i in [0, 1, 3] {
            assert_eq!(host.applied_to(SlotIndex::new(i)), 0);
        }
    }

    #[test]
    fn test_login_grant_respects_eligibility() {
        let (host, _plugin) = setup(SchedulerConfig::default());
        let bunny = EffectCatalog::standard()
            .get(EffectKind::Bunny)
            .unwrap()
            .effect_id;

        host.login(SlotIndex::new(1), false);
        assert_eq!(host.applied_to(SlotIndex::new(1)), 0);

        host.login(SlotIndex::new(2), true);
        assert_eq!(host.applied_to(SlotIndex::new(2)), 1);
        assert!(host.has_effect(SlotIndex::new(2), bunny));

        // Granted once, not maintained
        host.run_ticks(5 * u64::from(TPS));
        assert_eq!(host.applied_to(SlotIndex::new(2)), 1);
    }

    #[test]
    fn test_login_grants_can_be_disabled() {
        let config = SchedulerConfig {
            grant_on_login: Vec::new(),
            ..SchedulerConfig::default()
        };
        let (host, _plugin) = setup(config);
        host.login(SlotIndex::new(1), true);
        assert!(host.applied().is_empty());
    }

    #[test]
    fn test_grant_command_applies_bunny_once() {
        let (host, plugin) = setup(SchedulerConfig {
            grant_on_login: Vec::new(),
            ..SchedulerConfig::default()
        });
        let slot = SlotIndex::new(3);
        host.login(slot, true);
        assert_eq!(host.applied_to(slot), 0);

        plugin.grant(slot, EffectKind::Bunny).unwrap();

        let applied = host.applied();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].slot, slot);
        assert_eq!(applied[0].effect_id, buffkeep_core::EffectId::new(40));
        assert_eq!(applied[0].duration_ticks, 3600);
        assert!(applied[0].force);
        assert!(host.has_effect(slot, buffkeep_core::EffectId::new(40)));

        // Not a toggle: later passes leave it alone
        assert!(!plugin.scheduler().is_any_active(slot).unwrap());
        host.run_ticks(3 * u64::from(TPS));
        assert_eq!(host.applied_to(slot), 1);
    }

    #[test]
    fn test_grant_command_errors() {
        let (host, plugin) = setup(SchedulerConfig::default());

        // Nobody connected at the slot
        assert!(matches!(
            plugin.grant(SlotIndex::new(2), EffectKind::Bunny),
            Err(Error::Core(buffkeep_core::Error::Apply(
                buffkeep_core::ApplyError::NotConnected(_)
            )))
        ));

        host.login(SlotIndex::new(2), false);
        plugin.dispose();
        assert!(matches!(
            plugin.grant(SlotIndex::new(2), EffectKind::Bunny),
            Err(Error::Disposed)
        ));
        assert!(host.applied().is_empty());
    }

    #[test]
    fn test_disconnected_slot_failures_do_not_stop_pass() {
        let (host, plugin) = setup(SchedulerConfig::default());
        host.login(SlotIndex::new(1), false);
        host.login(SlotIndex::new(3), false);
        plugin.toggle(SlotIndex::new(1), &[EffectKind::Glow]).unwrap();
        plugin.toggle(SlotIndex::new(2), &[EffectKind::Glow]).unwrap();
        plugin.toggle(SlotIndex::new(3), &[EffectKind::Glow]).unwrap();

        // Slot 2 toggled but never connected: host rejects it, others still refresh
        let report = plugin
            .scheduler()
            .on_tick(host.clock().now() + plugin.scheduler().interval(), &*host)
            .unwrap();
        assert_eq!(report.active_slots, 3);
        assert_eq!(report.applied, 2);
        assert_eq!(report.failed, 1);
    }

    #[test]
    #[cfg_attr(
        debug_assertions,
        should_panic(expected = "leave hook for out-of-range slot")
    )]
    fn test_leave_for_out_of_range_slot() {
        let (host, plugin) = setup(SchedulerConfig {
            max_slots: 4,
            ..SchedulerConfig::default()
        });
        // Asserts in debug builds; release builds log and carry on
        host.leave(SlotIndex::new(10));
        assert!(plugin.is_loaded());
        assert_eq!(plugin.scheduler().active_count(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ticks_and_commands_from_different_threads() {
        let (host, plugin) = setup(SchedulerConfig {
            max_slots: 8,
            ..SchedulerConfig::default()
        });
        let plugin = Arc::new(plugin);
        for i in 0..8 {
            host.login(SlotIndex::new(i), false);
        }

        let ticker = {
            let host = Arc::clone(&host);
            tokio::spawn(async move {
                for _ in 0..(5 * TPS) {
                    host.tick();
                    tokio::task::yield_now().await;
                }
            })
        };

        for round in 0..200usize {
            let slot = SlotIndex::new(round % 8);
            plugin.toggle(slot, &[EffectKind::Glow]).unwrap();
            if round % 3 == 0 {
                host.leave(slot);
                host.login(slot, false);
            }
            tokio::task::yield_now().await;
        }
        ticker.await.unwrap();

        for i in 0..8 {
            host.leave(SlotIndex::new(i));
        }
        assert_eq!(plugin.scheduler().active_count(), 0);
    }
}
