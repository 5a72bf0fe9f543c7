use super::envelope::HecEnvelope;
use super::tls::{self, TlsError, TlsMode};
use crate::projection::Event;
use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

/// Event ingestion path of the HTTP Event Collector. Replaces whatever path
/// the configured URL carries.
pub const COLLECTOR_PATH: &str = "/services/collector/event/1.0";
const AUTH_SCHEME: &str = "Splunk";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),
    #[error("Invalid collector URL: {0}")]
    InvalidUrl(String),
    #[error("TLS setup failed: {0}")]
    TlsSetup(#[from] TlsError),
    #[error("Failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Error, Debug)]
pub enum SendError {
    #[error("Failed to serialize event: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Send cancelled")]
    Cancelled,
    #[error("Collector responded with HTTP {status}")]
    Status { status: u16 },
}

impl SendError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SendError::Cancelled)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, SendError::Network(err) if err.is_timeout())
    }
}

#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub token: String,
    pub collector_url: String,
    pub tls: TlsMode,
    pub request_timeout: Option<Duration>,
}

impl TransportConfig {
    pub fn new(token: impl Into<String>, collector_url: impl Into<String>, tls: TlsMode) -> Self {
        Self {
            token: token.into(),
            collector_url: collector_url.into(),
            tls,
            request_timeout: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// Client for the HTTP Event Collector.
///
/// Built once and shared; it owns its own transport and TLS configuration and
/// holds no per-request state, so clones and concurrent sends are fine.
#[derive(Debug, Clone)]
pub struct HecClient {
    client: Client,
    endpoint: Url,
    authorization: HeaderValue,
}

impl HecClient {
    pub fn new(config: TransportConfig) -> Result<Self, ClientError> {
        if config.token.is_empty() || config.collector_url.is_empty() {
            return Err(ClientError::InvalidSettings(
                "collector token and collector URL are required".to_string(),
            ));
        }

        let mut endpoint = Url::parse(&config.collector_url).map_err(|e| {
            ClientError::InvalidUrl(format!("'{}': {}", config.collector_url, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl(format!(
                "'{}': unsupported scheme '{}'",
                config.collector_url,
                endpoint.scheme()
            )));
        }
        endpoint.set_path(COLLECTOR_PATH);

        let mut authorization = HeaderValue::from_str(&format!("{AUTH_SCHEME} {}", config.token))
            .map_err(|_| {
                ClientError::InvalidSettings(
                    "collector token contains characters not allowed in a header".to_string(),
                )
            })?;
        authorization.set_sensitive(true);

        let mut builder = ClientBuilder::new()
            .user_agent(concat!("splunk-pump/", env!("CARGO_PKG_VERSION")));

        builder = match &config.tls {
            TlsMode::SkipVerify => builder.danger_accept_invalid_certs(true),
            TlsMode::Verify {
                cert_file,
                key_file,
                server_name,
            } => builder.use_preconfigured_tls(tls::client_config(
                cert_file,
                key_file,
                server_name.as_deref(),
            )?),
        };

        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            client,
            endpoint,
            authorization,
        })
    }

    /// Positional constructor: an empty `server_name` means "use the URL host".
    pub fn from_settings(
        token: &str,
        collector_url: &str,
        skip_verify: bool,
        cert_file: &str,
        key_file: &str,
        server_name: &str,
    ) -> Result<Self, ClientError> {
        let tls = if skip_verify {
            TlsMode::SkipVerify
        } else {
            TlsMode::Verify {
                cert_file: cert_file.into(),
                key_file: key_file.into(),
                server_name: (!server_name.is_empty()).then(|| server_name.to_string()),
            }
        };
        Self::new(TransportConfig::new(token, collector_url, tls))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts one event to the collector.
    ///
    /// The response is returned whatever its status; only transport failures
    /// and cancellation are errors here.
    pub async fn send(
        &self,
        cancel: &CancellationToken,
        event: &Event,
        timestamp: DateTime<Utc>,
    ) -> Result<Response, SendError> {
        if cancel.is_cancelled() {
            return Err(SendError::Cancelled);
        }

        let body = HecEnvelope::new(event, timestamp).to_bytes()?;
        debug!(bytes = body.len(), fields = event.len(), "Sending event");

        let request = self
            .client
            .post(self.endpoint.clone())
            .header(AUTHORIZATION, self.authorization.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send();

        tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SendError::Cancelled),
            response = request => Ok(response?),
        }
    }
}
