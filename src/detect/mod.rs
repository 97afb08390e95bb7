//! Detection ingestion boundary.
//!
//! This module provides the types and sources for per-frame detection
//! batches from an external perception model:
//! - JSONL feeds written by a detector process (local file or FIFO)
//! - Synthetic source (`stub://` endpoints, tests, demo)
//!
//! Every source yields one batch per frame tick, ranked by descending
//! confidence. The core makes no assumption about batch size; zero
//! detections is a normal frame. Frame capture and model inference live
//! entirely behind this boundary.

mod jsonl;
mod result;
mod source;
mod synthetic;

use anyhow::Result;

pub use jsonl::JsonlSource;
pub use result::{BoundingBox, Detection};
pub use source::{DetectionSource, SourceStats};
pub use synthetic::{ScriptedSource, SyntheticSource};

/// Build a detection source for a configured endpoint.
///
/// `stub://` endpoints get a synthetic source emitting bursts of
/// `synthetic_class`; anything else is treated as a local JSONL path.
pub fn source_for_endpoint(
    endpoint: &str,
    synthetic_class: u32,
) -> Result<Box<dyn DetectionSource>> {
    if endpoint.starts_with("stub://") {
        Ok(Box::new(SyntheticSource::new(endpoint, synthetic_class)))
    } else {
        Ok(Box::new(JsonlSource::new(endpoint)?))
    }
}
