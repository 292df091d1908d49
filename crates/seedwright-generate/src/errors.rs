use thiserror::Error;

use crate::executor::TransportError;

/// Errors emitted by the generation engine.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("schema error: {0}")]
    Schema(#[from] seedwright_core::Error),
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}
