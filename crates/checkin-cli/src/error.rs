use std::io;

use checkin_core::api::ApiError;
use checkin_core::config::ConfigError;
use checkin_core::{EventId, SyncError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] checkin_core::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Sync(#[from] SyncError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("No roster cached for event {0}. Run `checkin load` first.")]
    NotLoaded(EventId),
}
