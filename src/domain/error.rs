use crate::app::config::ConfigError;
use crate::app::source::SourceError;
use crate::pump::DeliveryError;
use crate::sender::ClientError;
use thiserror::Error;

/// Top-level error type for the pump.
#[derive(Error, Debug)]
pub enum PumpError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Client initialization error: {0}")]
    Client(#[from] ClientError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Record source error: {0}")]
    Source(#[from] SourceError),

    #[error("Logging setup error: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
