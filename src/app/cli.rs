use super::logging::{LogFormat, LogLevel};
use clap::Parser;
use std::path::PathBuf;

/// Ships analytics records to a Splunk HTTP Event Collector.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Pump configuration file (TOML); SPLUNK_PUMP_* variables are used when absent
    #[arg(long, env = "SPLUNK_PUMP_CONFIG")]
    pub config: Option<PathBuf>,

    /// NDJSON file of analytics records; stdin when absent
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Number of records handed to the pump per write
    #[arg(long, default_value = "100")]
    pub batch_size: usize,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: LogLevel,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}
