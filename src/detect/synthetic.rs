use std::collections::VecDeque;

use anyhow::Result;

use super::result::{BoundingBox, Detection};
use super::source::{DetectionSource, SourceStats};

const BURST_FRAMES: u64 = 5;
const IDLE_FRAMES: u64 = 20;

/// Synthetic detection source for `stub://` endpoints.
///
/// Simulates a pet wandering up to the door: bursts of centered
/// target-class detections separated by empty stretches, so a default
/// configuration triggers, cools down, and re-arms without a camera or
/// model attached.
pub struct SyntheticSource {
    endpoint: String,
    class_id: u32,
    frame_count: u64,
}

impl SyntheticSource {
    pub fn new(endpoint: &str, class_id: u32) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            class_id,
            frame_count: 0,
        }
    }

    fn pet_at_center(&self) -> Detection {
        Detection {
            class_id: self.class_id,
            confidence: 0.9,
            bbox: BoundingBox {
                y_min: 0.4,
                x_min: 0.4,
                y_max: 0.6,
                x_max: 0.6,
            },
        }
    }

    /// Low-confidence background clutter, ranked below the pet.
    fn background_object(&self) -> Detection {
        Detection {
            class_id: 1,
            confidence: 0.35,
            bbox: BoundingBox {
                y_min: 0.1,
                x_min: 0.7,
                y_max: 0.3,
                x_max: 0.9,
            },
        }
    }
}

impl DetectionSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("SyntheticSource: connected to {}", self.endpoint);
        Ok(())
    }

    fn next_batch(&mut self) -> Result<Option<Vec<Detection>>> {
        let phase = self.frame_count % (BURST_FRAMES + IDLE_FRAMES);
        self.frame_count += 1;

        let batch = if phase < BURST_FRAMES {
            vec![self.pet_at_center(), self.background_object()]
        } else {
            vec![]
        };
        Ok(Some(batch))
    }

    fn is_healthy(&self) -> bool {
        true
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_delivered: self.frame_count,
            endpoint: self.endpoint.clone(),
        }
    }
}

/// Fixed-script source for tests and the demo binary.
///
/// Yields the scripted batches in order, then reports end of stream.
pub struct ScriptedSource {
    frames: VecDeque<Vec<Detection>>,
    delivered: u64,
}

impl ScriptedSource {
    pub fn new(frames: Vec<Vec<Detection>>) -> Self {
        Self {
            frames: frames.into(),
            delivered: 0,
        }
    }
}

impl DetectionSource for ScriptedSource {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn connect(&mut self) -> Result<()> {
        log::info!("ScriptedSource: {} scripted frames queued", self.frames.len());
        Ok(())
    }

    fn next_batch(&mut self) -> Result<Option<Vec<Detection>>> {
        let batch = self.frames.pop_front();
        if batch.is_some() {
            self.delivered += 1;
        }
        Ok(batch)
    }

    fn is_healthy(&self) -> bool {
        !self.frames.is_empty()
    }

    fn stats(&self) -> SourceStats {
        SourceStats {
            frames_delivered: self.delivered,
            endpoint: "script://fixed".to_string(),
        }
    }
}
