pub mod cli;
pub mod config;
pub mod logging;
pub mod source;

pub use cli::Cli;
pub use config::{ConfigError, PumpConfig};
pub use logging::{LogFormat, LogLevel, init_logging};
pub use source::{RecordReader, SourceError};

use crate::domain::PumpError;
use crate::pump::{DeliveryReport, Pump, SplunkPump};
use clap::Parser;
use std::process;
use tokio::io::{AsyncBufRead, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Totals over every batch written during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub attempted: usize,
    pub delivered: usize,
    pub failed: usize,
}

impl RunSummary {
    fn absorb(&mut self, report: &DeliveryReport) {
        self.batches += 1;
        self.attempted += report.attempted;
        self.delivered += report.delivered;
        self.failed += report.failed();
    }
}

/// Feeds records from `reader` to `pump` in batches of `batch_size`.
///
/// Stops at end of input or once `cancel` fires, including while waiting on
/// a stalled reader. A batch error (possible
/// under the aggregate policy) ends the run.
pub async fn pump_records<P, R>(
    pump: &P,
    cancel: &CancellationToken,
    reader: R,
    batch_size: usize,
) -> Result<RunSummary, PumpError>
where
    P: Pump,
    R: AsyncBufRead + Unpin,
{
    let mut records = RecordReader::new(reader);
    let mut summary = RunSummary::default();

    loop {
        let batch = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            batch = records.next_batch(batch_size.max(1)) => batch?,
        };
        if batch.is_empty() {
            break;
        }

        let report = pump.write_data(cancel, &batch).await?;
        summary.absorb(&report);
    }

    info!(
        pump = pump.name(),
        batches = summary.batches,
        delivered = summary.delivered,
        failed = summary.failed,
        "Finished writing records"
    );
    Ok(summary)
}

pub async fn run(cli: Cli) -> Result<RunSummary, PumpError> {
    let config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from file: {}", path.display());
            PumpConfig::from_file(path)?
        }
        None => PumpConfig::from_env()?,
    };

    let pump = SplunkPump::init(&config)?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling delivery");
                cancel.cancel();
            }
        }
    });

    let result = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path).await?;
            pump_records(&pump, &cancel, BufReader::new(file), cli.batch_size).await
        }
        None => {
            pump_records(&pump, &cancel, BufReader::new(tokio::io::stdin()), cli.batch_size).await
        }
    };

    interrupt.abort();
    result
}

pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// Main entry point for the application
pub async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.log_level, cli.log_format).map_err(PumpError::Logging)?;
    info!("Starting splunk-pump v{}", get_version());

    if let Err(e) = run(cli).await {
        error!("{}", e);
        process::exit(1);
    }
    Ok(())
}
