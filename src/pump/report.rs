use crate::sender::SendError;
use thiserror::Error;

/// A record that could not be delivered, identified by its position in the batch.
#[derive(Debug)]
pub struct ItemFailure {
    pub index: usize,
    pub error: SendError,
}

/// Outcome of one `write_data` call.
#[derive(Debug, Default)]
pub struct DeliveryReport {
    pub attempted: usize,
    pub delivered: usize,
    pub failures: Vec<ItemFailure>,
}

impl DeliveryReport {
    pub fn new(attempted: usize) -> Self {
        Self {
            attempted,
            delivered: 0,
            failures: Vec::new(),
        }
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    pub fn cancelled(&self) -> usize {
        self.failures
            .iter()
            .filter(|failure| failure.error.is_cancelled())
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.delivered == self.attempted
    }
}

#[derive(Error, Debug)]
#[error("{} of {} events failed to deliver", .report.failed(), .report.attempted)]
pub struct DeliveryError {
    pub report: DeliveryReport,
}

impl DeliveryError {
    pub fn failures(&self) -> &[ItemFailure] {
        &self.report.failures
    }
}
