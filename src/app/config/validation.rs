use super::{ConfigError, PumpConfig};

impl PumpConfig {
    /// Checks the settings that are independent of the transport.
    ///
    /// Token, URL and certificate problems surface when the client is built.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_in_flight == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_in_flight must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_ms == Some(0) {
            return Err(ConfigError::InvalidConfig(
                "request_timeout_ms must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
