//! Batch delivery: project every record and post it to the collector.

pub mod report;

pub use report::{DeliveryError, DeliveryReport, ItemFailure};

use crate::app::config::PumpConfig;
use crate::domain::{AnalyticsRecord, PumpError};
use crate::projection::{ProjectionConfig, project};
use crate::sender::{HecClient, SendError};
use futures::StreamExt;
use futures::stream;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const PUMP_NAME: &str = "Splunk Pump";

/// What `write_data` reports when some events of a batch were not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Failures are logged and counted in the report; the call still succeeds.
    #[default]
    FireAndForget,
    /// Any failure turns the call into a `DeliveryError` carrying every failure.
    Aggregate,
}

impl FromStr for DeliveryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fire_and_forget" => Ok(DeliveryPolicy::FireAndForget),
            "aggregate" => Ok(DeliveryPolicy::Aggregate),
            other => Err(format!(
                "unknown delivery policy '{other}' (expected fire_and_forget or aggregate)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub policy: DeliveryPolicy,
    /// Count non-2xx collector responses as failures
    pub strict_status: bool,
    /// Upper bound on concurrent sends within a batch
    pub max_in_flight: usize,
}

/// A sink for batches of analytics records.
pub trait Pump: Send + Sync {
    fn name(&self) -> &'static str;

    fn write_data(
        &self,
        cancel: &CancellationToken,
        records: &[AnalyticsRecord],
    ) -> impl Future<Output = Result<DeliveryReport, DeliveryError>> + Send;
}

#[derive(Debug, Clone)]
pub struct SplunkPump {
    client: HecClient,
    projection: ProjectionConfig,
    options: DeliveryOptions,
}

impl SplunkPump {
    pub fn new(client: HecClient, projection: ProjectionConfig, options: DeliveryOptions) -> Self {
        Self {
            client,
            projection,
            options,
        }
    }

    pub fn init(config: &PumpConfig) -> Result<Self, PumpError> {
        config.validate()?;
        info!("{} Endpoint: {}", PUMP_NAME, config.collector_url);

        let client = HecClient::new(config.transport())?;
        let projection = config.projection();
        for name in projection.unknown_fields() {
            warn!(field = name, "Configured field is not an analytics field and will be skipped");
        }

        debug!(
            endpoint = %client.endpoint(),
            policy = ?config.delivery_policy,
            max_in_flight = config.max_in_flight,
            "{} Initialized",
            PUMP_NAME
        );
        Ok(Self::new(client, projection, config.delivery_options()))
    }

    /// Delivers every record of the batch, one event per record.
    ///
    /// Sends run at most `max_in_flight` at a time; outcomes are collected in
    /// input order. Once `cancel` fires, remaining records fail as cancelled.
    pub async fn write_data(
        &self,
        cancel: &CancellationToken,
        records: &[AnalyticsRecord],
    ) -> Result<DeliveryReport, DeliveryError> {
        info!("Writing {} records", records.len());

        let outcomes: Vec<_> = stream::iter(0..records.len())
            .map(|i| self.deliver(cancel, &records[i]))
            .buffered(self.options.max_in_flight.max(1))
            .collect()
            .await;

        let mut report = DeliveryReport::new(records.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(error) => {
                    warn!(index, error = %error, "Failed to deliver event");
                    report.failures.push(ItemFailure { index, error });
                }
            }
        }

        if report.failures.is_empty() {
            debug!(delivered = report.delivered, "Batch delivered");
            return Ok(report);
        }

        match self.options.policy {
            DeliveryPolicy::FireAndForget => {
                warn!(
                    failed = report.failed(),
                    attempted = report.attempted,
                    "Batch partially delivered"
                );
                Ok(report)
            }
            DeliveryPolicy::Aggregate => Err(DeliveryError { report }),
        }
    }

    async fn deliver(
        &self,
        cancel: &CancellationToken,
        record: &AnalyticsRecord,
    ) -> Result<(), SendError> {
        let event = project(record, &self.projection);
        let response = self.client.send(cancel, &event, record.timestamp).await?;

        let status = response.status();
        if !status.is_success() {
            if self.options.strict_status {
                return Err(SendError::Status {
                    status: status.as_u16(),
                });
            }
            debug!(status = status.as_u16(), "Collector returned non-success status");
        }
        Ok(())
    }
}

impl Pump for SplunkPump {
    fn name(&self) -> &'static str {
        PUMP_NAME
    }

    fn write_data(
        &self,
        cancel: &CancellationToken,
        records: &[AnalyticsRecord],
    ) -> impl Future<Output = Result<DeliveryReport, DeliveryError>> + Send {
        SplunkPump::write_data(self, cancel, records)
    }
}
