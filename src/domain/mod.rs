//! Domain layer for splunk-pump.
//!
//! Contains the canonical types shared across all modules:
//! - `AnalyticsRecord`: One recorded API request, the pump's input
//! - `PumpError`: Top-level error type

pub mod error;
pub mod record;

pub use error::PumpError;
pub use record::AnalyticsRecord;
