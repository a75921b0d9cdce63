use thiserror::Error;

use crate::credentials::CredentialError;
use crate::engine::EngineError;
use crate::epistola::EpistolaError;
use crate::job_path::JobPathError;

/// Crate-level error, for hosts that want a single error type at the seam.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("job path error: {0}")]
    JobPath(#[from] JobPathError),

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("credential error: {0}")]
    Credentials(#[from] CredentialError),

    #[error("Epistola API error: {0}")]
    Epistola(#[from] EpistolaError),
}
