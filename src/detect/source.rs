use anyhow::Result;

use super::result::Detection;

/// Statistics for a detection source.
#[derive(Clone, Debug)]
pub struct SourceStats {
    pub frames_delivered: u64,
    pub endpoint: String,
}

/// Boundary to the external perception model.
///
/// A source yields one detection batch per frame tick. Batches MUST be
/// ranked by descending confidence; the monitor evaluates only the
/// first-ranked entry and does not re-sort. How a batch was produced is
/// entirely the source's responsibility, and upstream I/O failures
/// surface here and nowhere else in the pipeline.
pub trait DetectionSource {
    /// Source identifier.
    fn name(&self) -> &'static str;

    /// Establish the connection to the detector feed.
    fn connect(&mut self) -> Result<()>;

    /// The next frame's batch, or `Ok(None)` once the stream is exhausted.
    ///
    /// An empty batch is a valid frame (nothing detected).
    fn next_batch(&mut self) -> Result<Option<Vec<Detection>>>;

    /// Whether the source is currently delivering frames.
    fn is_healthy(&self) -> bool;

    /// Delivery statistics.
    fn stats(&self) -> SourceStats;
}
