use crate::domain::AnalyticsRecord;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("IO error while reading records: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid record on line {line}: {source}")]
    InvalidRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads newline-delimited JSON analytics records and hands them out in batches.
pub struct RecordReader<R> {
    lines: Lines<R>,
    line_number: usize,
}

impl<R: AsyncBufRead + Unpin> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_number: 0,
        }
    }

    /// Returns up to `size` records; an empty batch means the input is exhausted.
    pub async fn next_batch(&mut self, size: usize) -> Result<Vec<AnalyticsRecord>, SourceError> {
        let mut batch = Vec::with_capacity(size);

        while batch.len() < size {
            let Some(line) = self.lines.next_line().await? else {
                break;
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let record = serde_json::from_str(trimmed).map_err(|source| {
                SourceError::InvalidRecord {
                    line: self.line_number,
                    source,
                }
            })?;
            batch.push(record);
        }

        Ok(batch)
    }
}
