//! Batch extraction with per-item failure isolation.

use crate::coerce::ExtractedRecord;
use crate::error::ExtractError;
use crate::extract::extract;

/// A record recovered from one batch item, tagged with its input position.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSuccess {
    pub index: usize,
    pub record: ExtractedRecord,
}

/// A batch item nothing could be recovered from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchFailure {
    pub index: usize,
    pub reason: ExtractError,
}

/// Results of running extraction over a whole batch.
///
/// One failing item never aborts its siblings; it is recorded with its
/// reason and processing continues.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    pub succeeded: Vec<BatchSuccess>,
    pub failed: Vec<BatchFailure>,
}

impl BatchOutcome {
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Extracts every input, partitioning results by outcome. Order within
/// each partition follows input order.
#[must_use]
pub fn extract_batch<S: AsRef<str>>(inputs: &[S]) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();
    for (index, raw) in inputs.iter().enumerate() {
        match extract(raw.as_ref()) {
            Ok(record) => outcome.succeeded.push(BatchSuccess { index, record }),
            Err(reason) => {
                tracing::warn!(index, reason = %reason, "batch item failed extraction");
                outcome.failed.push(BatchFailure { index, reason });
            }
        }
    }
    tracing::info!(
        attempted = outcome.attempted(),
        succeeded = outcome.succeeded.len(),
        failed = outcome.failed.len(),
        "extraction batch finished"
    );
    outcome
}
