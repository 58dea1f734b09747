//! Structured-record recovery from annotator free text.
//!
//! Annotators return one JSON object per analyzed item, in theory. In
//! practice the object comes fenced, prose-wrapped, truncated, or padded
//! with repeated filler. This crate digs the object out ([`extract`]),
//! forces its standard fields into reliable shapes
//! ([`ExtractedRecord`]), and runs whole batches without letting one bad
//! response poison the rest ([`extract_batch`]).

pub mod batch;
pub mod coerce;
pub mod error;
pub mod extract;

pub use batch::{extract_batch, BatchFailure, BatchOutcome, BatchSuccess};
pub use coerce::ExtractedRecord;
pub use error::ExtractError;
pub use extract::{extract, scrub_hallucinations};
