use std::path::Path;

use serde::{Deserialize, Serialize};
use sovrank_extract::{extract_batch, BatchOutcome, ExtractedRecord};

/// One raw model response keyed by the item it analyzed.
#[derive(Debug, Deserialize)]
struct ResponseRow {
    item_id: String,
    response: String,
}

#[derive(Debug, Serialize)]
struct AnnotationRow<'a> {
    item_id: &'a str,
    record: &'a ExtractedRecord,
}

#[derive(Debug, Serialize)]
struct FailureRow<'a> {
    item_id: &'a str,
    reason: String,
}

/// File written by the `extract` command: recovered records plus the
/// failures, so a retry queue can be built from the same file.
#[derive(Debug, Serialize)]
struct ExtractOutput<'a> {
    succeeded: Vec<AnnotationRow<'a>>,
    failed: Vec<FailureRow<'a>>,
}

/// Extract structured records from a batch of raw model responses.
///
/// # Errors
///
/// Returns an error if a file cannot be read, parsed, or written. Per-item
/// extraction failures are not errors; they land in the output's `failed`
/// list.
pub(crate) fn run_extract(input: &Path, output: &Path) -> anyhow::Result<()> {
    let rows: Vec<ResponseRow> = super::read_json(input)?;
    let responses: Vec<&str> = rows.iter().map(|row| row.response.as_str()).collect();
    let outcome = extract_batch(&responses);

    super::write_json(output, &keyed_output(&rows, &outcome))?;

    println!(
        "extracted {} of {} responses ({} failed)",
        outcome.succeeded.len(),
        outcome.attempted(),
        outcome.failed.len()
    );
    println!("wrote annotations to {}", output.display());
    Ok(())
}

/// Map batch positions back to item ids. Indices come from enumerating the
/// same rows, so they are always in range.
fn keyed_output<'a>(rows: &'a [ResponseRow], outcome: &'a BatchOutcome) -> ExtractOutput<'a> {
    let succeeded = outcome
        .succeeded
        .iter()
        .map(|success| AnnotationRow {
            item_id: &rows[success.index].item_id,
            record: &success.record,
        })
        .collect();
    let failed = outcome
        .failed
        .iter()
        .map(|failure| FailureRow {
            item_id: &rows[failure.index].item_id,
            reason: failure.reason.to_string(),
        })
        .collect();
    ExtractOutput { succeeded, failed }
}
