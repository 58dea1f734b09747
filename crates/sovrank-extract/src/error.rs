use thiserror::Error;

/// Why no record could be recovered from a model response.
///
/// The two variants separate "nothing to analyze" from "analysis failed",
/// so a caller can drop empty inputs silently but flag failed ones for
/// retry or exclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("input is empty or whitespace")]
    EmptyInput,
    #[error("no parseable JSON object found in input")]
    NoJsonObject,
}
