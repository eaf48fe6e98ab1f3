//! Buffkeep Host - Game server glue for the status-effect scheduler
//!
//! This crate connects `buffkeep-core` to a host server:
//! - Host event hooks with disposable subscriptions (`HostHooks`)
//! - The plugin lifecycle, login grants, and the toggle command (`StatusPlugin`)
//! - An in-memory host for demos and tests (`SimHost`)

mod error;
pub mod hooks;
mod plugin;
mod sim;

pub use error::{Error, Result};
pub use hooks::{HookHandle, HookRegistry, HostHooks, LeaveArgs, LoginArgs};
pub use plugin::{PluginContext, PluginInfo, StatusPlugin};
pub use sim::SimHost;
