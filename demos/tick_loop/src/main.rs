//! Drive the buffkeep plugin from a simulated 60 Hz host
//!
//! A few scripted players join, toggle effects, claim a one-shot effect,
//! and leave while a tokio interval ticks the host. Effects stay on toggled players for as long as
//! they are connected; the one player who leaves is cleared at once.
//!
//! ## Environment
//!
//! - `BUFFKEEP_CONFIG`: path to a RON config (defaults are used otherwise)
//! - `DEMO_SECONDS`: how long to run (default 6)
//! - `RUST_LOG`: log filter (default `info`)

use buffkeep_core::{
    EffectCatalog, EffectKind, EffectSink, SchedulerConfig, SlotIndex, TimeSource,
};
use buffkeep_host::{PluginContext, SimHost, StatusPlugin};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Scripted player action at a host tick
enum Action {
    Join { slot: usize, eligible: bool },
    Toggle {
        slot: usize,
        kinds: &'static [EffectKind],
    },
    Grant { slot: usize, kind: EffectKind },
    Leave { slot: usize },
}

const SCRIPT: &[(u64, Action)] = &[
    (
        0,
        Action::Join {
            slot: 0,
            eligible: true,
        },
    ),
    (
        0,
        Action::Join {
            slot: 1,
            eligible: false,
        },
    ),
    (
        10,
        Action::Toggle {
            slot: 0,
            kinds: &[EffectKind::Glow],
        },
    ),
    (
        30,
        Action::Toggle {
            slot: 1,
            kinds: &[EffectKind::WaterWalking, EffectKind::LavaImmunity],
        },
    ),
    (
        90,
        Action::Join {
            slot: 2,
            eligible: false,
        },
    ),
    (
        120,
        Action::Toggle {
            slot: 2,
            kinds: &[EffectKind::Glow],
        },
    ),
    (180, Action::Leave { slot: 1 }),
    (
        200,
        Action::Grant {
            slot: 2,
            kind: EffectKind::Bunny,
        },
    ),
    (
        240,
        Action::Join {
            slot: 1,
            eligible: false,
        },
    ),
    (
        300,
        Action::Toggle {
            slot: 2,
            kinds: &[EffectKind::Glow],
        },
    ),
];

fn load_config() -> Result<SchedulerConfig, buffkeep_core::ConfigError> {
    match std::env::var("BUFFKEEP_CONFIG") {
        Ok(path) => {
            info!(%path, "loading config");
            SchedulerConfig::load(path)
        }
        Err(_) => Ok(SchedulerConfig::default()),
    }
}

fn run_action(host: &SimHost, plugin: &StatusPlugin, action: &Action) {
    match action {
        Action::Join { slot, eligible } => {
            info!(slot = %SlotIndex::new(*slot), eligible, "player joined");
            host.login(SlotIndex::new(*slot), *eligible);
        }
        Action::Toggle { slot, kinds } => match plugin.toggle(SlotIndex::new(*slot), kinds) {
            Ok(report) => info!(slot = %report.slot(), "{}", report),
            Err(e) => warn!(slot, error = %e, "toggle rejected"),
        },
        Action::Grant { slot, kind } => match plugin.grant(SlotIndex::new(*slot), *kind) {
            Ok(()) => info!(slot = %SlotIndex::new(*slot), %kind, "granted"),
            Err(e) => warn!(slot, %kind, error = %e, "grant rejected"),
        },
        Action::Leave { slot } => {
            info!(slot = %SlotIndex::new(*slot), "player left");
            host.leave(SlotIndex::new(*slot));
        }
    }
}

fn summarize(host: &SimHost, plugin: &StatusPlugin, catalog: &EffectCatalog) {
    for slot in 0..3 {
        let slot = SlotIndex::new(slot);
        let toggled = plugin.scheduler().active_kinds(slot).unwrap_or_default();
        let on_entity: Vec<String> = catalog
            .iter()
            .filter(|(_, entry)| host.has_effect(slot, entry.effect_id))
            .map(|(kind, _)| kind.to_string())
            .collect();
        info!(
            %slot,
            connected = host.is_connected(slot),
            toggled = %toggled,
            on_entity = ?on_entity,
            applications = host.applied_to(slot),
            "final state"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = load_config()?;
    let seconds: u64 = std::env::var("DEMO_SECONDS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(6);

    let host = Arc::new(SimHost::new(
        config.max_slots,
        config.ticks_per_second,
        Instant::now(),
    ));
    let clock: Arc<dyn TimeSource> = Arc::new(host.clock().clone());
    let sink: Arc<dyn EffectSink + Send + Sync> = Arc::clone(&host) as _;
    let ctx = PluginContext::from_config(&config, sink, clock)?;
    let plugin = StatusPlugin::initialize(host.hooks(), ctx);
    info!(
        name = StatusPlugin::INFO.name,
        author = StatusPlugin::INFO.author,
        "{}",
        StatusPlugin::INFO.description
    );

    let total_ticks = seconds * u64::from(config.ticks_per_second);
    let mut interval = tokio::time::interval(host.tick_length());
    let mut script = SCRIPT.iter().peekable();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = interval.tick() => {}
            _ = &mut ctrl_c => {
                info!("interrupted");
                break;
            }
        }

        let tick = host.current_tick();
        while let Some((_, action)) = script.next_if(|(at, _)| *at <= tick) {
            run_action(&host, &plugin, action);
        }

        host.tick();
        if host.current_tick() >= total_ticks {
            break;
        }
        if host.current_tick() % u64::from(config.ticks_per_second) == 0 {
            info!(
                tick = host.current_tick(),
                active = plugin.scheduler().active_count(),
                "heartbeat"
            );
        }
    }

    summarize(&host, &plugin, plugin.scheduler().catalog());
    plugin.dispose();
    Ok(())
}
