//! Error type for every `mpx-ctl` command.

use mpx_core::{ConfigError, SeatError};
use thiserror::Error;

use crate::infrastructure::storage::StoreError;

#[derive(Debug, Error)]
pub enum CtlError {
    #[error(transparent)]
    Seat(#[from] SeatError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("scenario '{name}' not found (available: {available})")]
    UnknownScenario { name: String, available: String },

    #[error("{failed} of {total} scenario(s) failed")]
    ScenariosFailed { failed: usize, total: usize },

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CtlError {
    /// The name printed in `error[<kind>]: ...`.
    ///
    /// Registry failures use the registry's own taxonomy, including those
    /// raised while applying configuration documents.
    pub fn kind(&self) -> String {
        match self {
            CtlError::Seat(err) | CtlError::Config(ConfigError::Seat(err)) => {
                err.kind().to_string()
            }
            CtlError::Config(_) => "ConfigError".to_string(),
            CtlError::Store(_) => "StoreError".to_string(),
            CtlError::UnknownScenario { .. } => "UnknownScenarioError".to_string(),
            CtlError::ScenariosFailed { .. } => "ScenarioFailedError".to_string(),
            CtlError::Output(_) => "OutputError".to_string(),
        }
    }
}
