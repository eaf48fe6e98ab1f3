//! Error types for buffkeep-host

use thiserror::Error;

/// Result type for buffkeep-host operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or driving the plugin
#[derive(Debug, Error)]
pub enum Error {
    /// Scheduler error
    #[error("scheduler error: {0}")]
    Core(#[from] buffkeep_core::Error),

    /// Configuration could not be loaded or failed validation
    #[error("config error: {0}")]
    Config(#[from] buffkeep_core::ConfigError),

    /// The plugin was used after `dispose`
    #[error("plugin already disposed")]
    Disposed,
}

fn _assert_error_send_sync<T: Send + Sync>() {}
fn _error_is_send_sync() {
    _assert_error_send_sync::<Error>();
}
