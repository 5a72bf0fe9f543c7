mod env;
mod validation;

use crate::projection::ProjectionConfig;
use crate::pump::{DeliveryOptions, DeliveryPolicy};
use crate::sender::{TlsMode, TransportConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use env::ENV_PREFIX;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Pump settings, keyed the way the gateway's pump configuration names them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PumpConfig {
    pub collector_token: String,
    pub collector_url: String,
    pub ssl_insecure_skip_verify: bool,
    pub ssl_cert_file: PathBuf,
    pub ssl_key_file: PathBuf,
    pub ssl_server_name: String,
    pub obfuscate_api_keys: bool,
    pub obfuscate_api_keys_length: usize,
    pub fields: Vec<String>,
    pub delivery_policy: DeliveryPolicy,
    pub strict_status: bool,
    pub max_in_flight: usize,
    pub request_timeout_ms: Option<u64>,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            collector_token: String::new(),
            collector_url: String::new(),
            ssl_insecure_skip_verify: false,
            ssl_cert_file: PathBuf::new(),
            ssl_key_file: PathBuf::new(),
            ssl_server_name: String::new(),
            obfuscate_api_keys: false,
            obfuscate_api_keys_length: 0,
            fields: Vec::new(),
            delivery_policy: DeliveryPolicy::FireAndForget,
            strict_status: false,
            max_in_flight: 1,
            request_timeout_ms: None,
        }
    }
}

impl PumpConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PumpConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Decodes the untyped `meta` section a host hands to its pumps.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let config: PumpConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = if self.ssl_insecure_skip_verify {
            TlsMode::SkipVerify
        } else {
            TlsMode::Verify {
                cert_file: self.ssl_cert_file.clone(),
                key_file: self.ssl_key_file.clone(),
                server_name: (!self.ssl_server_name.is_empty())
                    .then(|| self.ssl_server_name.clone()),
            }
        };

        let mut transport =
            TransportConfig::new(self.collector_token.clone(), self.collector_url.clone(), tls);
        if let Some(ms) = self.request_timeout_ms {
            transport = transport.with_request_timeout(Duration::from_millis(ms));
        }
        transport
    }

    pub fn projection(&self) -> ProjectionConfig {
        ProjectionConfig {
            fields: self.fields.clone(),
            obfuscate_api_keys: self.obfuscate_api_keys,
            obfuscate_api_keys_length: self.obfuscate_api_keys_length,
        }
    }

    pub fn delivery_options(&self) -> DeliveryOptions {
        DeliveryOptions {
            policy: self.delivery_policy,
            strict_status: self.strict_status,
            max_in_flight: self.max_in_flight,
        }
    }
}
