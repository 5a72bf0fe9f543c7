use super::{ConfigError, PumpConfig};
use std::path::PathBuf;

/// Prefix of every environment variable the pump reads.
pub const ENV_PREFIX: &str = "SPLUNK_PUMP_";

fn var(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}")).ok()
}

/// Loads and parses an environment variable.
/// Returns Ok(()) if the variable doesn't exist (keeps default).
fn load_env_var<T>(name: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = var(name) {
        *target = value
            .trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {ENV_PREFIX}{name}: {e}")))?;
    }
    Ok(())
}

fn load_env_var_opt<T>(name: &str, target: &mut Option<T>) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = var(name) {
        let parsed = value
            .trim()
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {ENV_PREFIX}{name}: {e}")))?;
        *target = Some(parsed);
    }
    Ok(())
}

fn load_env_string(name: &str, target: &mut String) {
    if let Some(value) = var(name) {
        *target = value;
    }
}

fn load_env_path(name: &str, target: &mut PathBuf) {
    if let Some(value) = var(name) {
        *target = PathBuf::from(value);
    }
}

/// Comma separated list; blank entries are dropped.
fn load_env_list(name: &str, target: &mut Vec<String>) {
    if let Some(value) = var(name) {
        *target = value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(ToString::to_string)
            .collect();
    }
}

impl PumpConfig {
    /// Builds the configuration from `SPLUNK_PUMP_*` variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = PumpConfig::default();

        load_env_string("COLLECTOR_TOKEN", &mut config.collector_token);
        load_env_string("COLLECTOR_URL", &mut config.collector_url);
        load_env_var("SSL_INSECURE_SKIP_VERIFY", &mut config.ssl_insecure_skip_verify)?;
        load_env_path("SSL_CERT_FILE", &mut config.ssl_cert_file);
        load_env_path("SSL_KEY_FILE", &mut config.ssl_key_file);
        load_env_string("SSL_SERVER_NAME", &mut config.ssl_server_name);
        load_env_var("OBFUSCATE_API_KEYS", &mut config.obfuscate_api_keys)?;
        load_env_var(
            "OBFUSCATE_API_KEYS_LENGTH",
            &mut config.obfuscate_api_keys_length,
        )?;
        load_env_list("FIELDS", &mut config.fields);
        load_env_var("DELIVERY_POLICY", &mut config.delivery_policy)?;
        load_env_var("STRICT_STATUS", &mut config.strict_status)?;
        load_env_var("MAX_IN_FLIGHT", &mut config.max_in_flight)?;
        load_env_var_opt("REQUEST_TIMEOUT_MS", &mut config.request_timeout_ms)?;

        config.validate()?;
        Ok(config)
    }
}
