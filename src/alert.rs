//! Presence accumulation and the alert state machine.
//!
//! The monitor owns all mutable control state for the detection-to-alert
//! decision: a qualifying-frame count and an `Idle -> Triggered -> Cooldown`
//! lifecycle. The host calls [`AlertMonitor::process_frame`] exactly once
//! per frame tick; every duration here is counted in ticks, never
//! wall-clock.
//!
//! - `Idle`: the accumulator runs. The first-ranked detection of the batch
//!   counts when its class is in the target set and its centroid lies
//!   strictly inside the zone. Once the count exceeds the threshold the
//!   machine triggers.
//! - `Triggered`: instantaneous. The signal is asserted, the count resets,
//!   and the machine settles into `Cooldown` within the same tick.
//! - `Cooldown`: the signal stays HIGH while the remaining-tick counter
//!   drains; when it reaches zero the signal clears and the machine
//!   re-arms.

use std::collections::HashSet;

use anyhow::{anyhow, Result};

use crate::detect::Detection;
use crate::signal::SignalEmitter;
use crate::zone::{FrameDims, Zone};

/// Static configuration for an [`AlertMonitor`].
#[derive(Clone, Debug)]
pub struct MonitorConfig {
    /// Region of interest, pixel coordinates.
    pub zone: Zone,
    /// Frame dimensions used to denormalize bbox centroids.
    pub frame: FrameDims,
    /// Label-map class ids treated as pets.
    pub target_classes: HashSet<u32>,
    /// Qualifying-frame count that must be exceeded before the alert fires.
    pub detection_threshold: u32,
    /// Cooldown duration in frame ticks.
    pub pause_length: u32,
    /// Number of classes in the detector's label map; ids outside it are
    /// malformed.
    pub label_map_size: u32,
}

impl MonitorConfig {
    /// Reject configurations the state machine cannot run on. Called at
    /// startup; the machine itself has no recoverable error states.
    pub fn validate(&self) -> Result<()> {
        if self.detection_threshold == 0 {
            return Err(anyhow!("detection_threshold must be positive"));
        }
        if self.pause_length == 0 {
            return Err(anyhow!("pause_length must be positive"));
        }
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(anyhow!("frame dimensions must be positive"));
        }
        if self.target_classes.is_empty() {
            return Err(anyhow!("target class set must not be empty"));
        }
        if let Some(id) = self
            .target_classes
            .iter()
            .find(|id| **id == 0 || **id > self.label_map_size)
        {
            return Err(anyhow!(
                "target class {} is outside the label map (1..={})",
                id,
                self.label_map_size
            ));
        }
        Ok(())
    }
}

/// Alert lifecycle state.
///
/// `Triggered` is instantaneous: the machine passes through it and settles
/// in `Cooldown` within the same tick, so callers observing state between
/// ticks only ever see `Idle` or `Cooldown`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlertState {
    #[default]
    Idle,
    Triggered,
    Cooldown,
}

/// What one frame tick did, for transition logging.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No qualifying detection and no timer expiry.
    Unchanged,
    /// The top detection qualified; the presence count grew by one.
    Counted,
    /// The threshold was exceeded: signal asserted, cooldown started.
    Triggered,
    /// Cooldown expired: signal cleared, machine re-armed.
    Cleared,
}

/// Debounced presence-to-alert state machine.
///
/// Single-threaded and frame-synchronous: one `process_frame` call per
/// tick mutates the state exactly once, so no locking discipline is
/// required around an instance.
pub struct AlertMonitor {
    config: MonitorConfig,
    state: AlertState,
    count: u32,
    cooldown_remaining: u32,
}

impl AlertMonitor {
    pub fn new(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            state: AlertState::Idle,
            count: 0,
            cooldown_remaining: 0,
        })
    }

    /// Advance the machine by one frame tick.
    ///
    /// `detections` is the current frame's batch, ranked by descending
    /// confidence; only the first-ranked entry is evaluated. No confidence
    /// gate is applied here; callers that want low-confidence filtering
    /// apply it before this call.
    pub fn process_frame(
        &mut self,
        detections: &[Detection],
        signal: &mut dyn SignalEmitter,
    ) -> Result<TickOutcome> {
        match self.state {
            AlertState::Idle => self.tick_idle(detections, signal),
            // A stored `Triggered` only survives a failed signal assertion;
            // it is already cooling down.
            AlertState::Triggered | AlertState::Cooldown => self.tick_cooldown(signal),
        }
    }

    fn tick_idle(
        &mut self,
        detections: &[Detection],
        signal: &mut dyn SignalEmitter,
    ) -> Result<TickOutcome> {
        let counted = self.accumulate(detections);
        if self.count > self.config.detection_threshold {
            self.state = AlertState::Triggered;
            self.count = 0;
            self.cooldown_remaining = self.config.pause_length;
            signal.assert_signal()?;
            self.state = AlertState::Cooldown;
            return Ok(TickOutcome::Triggered);
        }
        Ok(if counted {
            TickOutcome::Counted
        } else {
            TickOutcome::Unchanged
        })
    }

    /// Evaluate the first-ranked detection of the batch; returns whether it
    /// qualified and bumped the count.
    fn accumulate(&mut self, detections: &[Detection]) -> bool {
        let Some(top) = detections.first() else {
            return false;
        };
        if !top.is_well_formed(self.config.label_map_size) {
            log::debug!(
                "skipping malformed detection: class_id={} bbox={:?}",
                top.class_id,
                top.bbox
            );
            return false;
        }
        if !self.config.target_classes.contains(&top.class_id) {
            return false;
        }
        if !self.config.zone.contains(top.bbox.centroid(self.config.frame)) {
            return false;
        }
        self.count += 1;
        true
    }

    fn tick_cooldown(&mut self, signal: &mut dyn SignalEmitter) -> Result<TickOutcome> {
        self.cooldown_remaining = self.cooldown_remaining.saturating_sub(1);
        if self.cooldown_remaining == 0 {
            signal.clear_signal()?;
            self.count = 0;
            self.state = AlertState::Idle;
            return Ok(TickOutcome::Cleared);
        }
        Ok(TickOutcome::Unchanged)
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// Qualifying-frame count accumulated so far (overlay/telemetry).
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Ticks left before the signal clears; zero outside `Cooldown`.
    pub fn cooldown_remaining(&self) -> u32 {
        self.cooldown_remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::BoundingBox;
    use crate::signal::{LogSignal, SignalLevel};

    fn test_config(threshold: u32, pause: u32) -> MonitorConfig {
        let dims = FrameDims {
            width: 640,
            height: 480,
        };
        MonitorConfig {
            zone: Zone::full_frame(dims),
            frame: dims,
            target_classes: HashSet::from([17, 18, 88]),
            detection_threshold: threshold,
            pause_length: pause,
            label_map_size: 90,
        }
    }

    fn centered(class_id: u32) -> Detection {
        Detection {
            class_id,
            confidence: 0.9,
            bbox: BoundingBox {
                y_min: 0.4,
                x_min: 0.4,
                y_max: 0.6,
                x_max: 0.6,
            },
        }
    }

    #[test]
    fn count_grows_only_past_threshold_then_triggers() {
        let mut monitor = AlertMonitor::new(test_config(2, 10)).unwrap();
        let mut signal = LogSignal::new();
        let batch = vec![centered(17)];

        assert_eq!(
            monitor.process_frame(&batch, &mut signal).unwrap(),
            TickOutcome::Counted
        );
        assert_eq!(
            monitor.process_frame(&batch, &mut signal).unwrap(),
            TickOutcome::Counted
        );
        assert_eq!(monitor.count(), 2);

        assert_eq!(
            monitor.process_frame(&batch, &mut signal).unwrap(),
            TickOutcome::Triggered
        );
        assert_eq!(monitor.state(), AlertState::Cooldown);
        assert_eq!(monitor.count(), 0);
        assert_eq!(monitor.cooldown_remaining(), 10);
        assert_eq!(signal.level(), SignalLevel::High);
    }

    #[test]
    fn cooldown_drains_then_clears_and_rearms() {
        let mut monitor = AlertMonitor::new(test_config(1, 3)).unwrap();
        let mut signal = LogSignal::new();
        let batch = vec![centered(18)];

        monitor.process_frame(&batch, &mut signal).unwrap();
        monitor.process_frame(&batch, &mut signal).unwrap();
        assert_eq!(monitor.state(), AlertState::Cooldown);

        assert_eq!(
            monitor.process_frame(&[], &mut signal).unwrap(),
            TickOutcome::Unchanged
        );
        assert_eq!(
            monitor.process_frame(&[], &mut signal).unwrap(),
            TickOutcome::Unchanged
        );
        assert_eq!(signal.level(), SignalLevel::High);

        assert_eq!(
            monitor.process_frame(&[], &mut signal).unwrap(),
            TickOutcome::Cleared
        );
        assert_eq!(monitor.state(), AlertState::Idle);
        assert_eq!(monitor.cooldown_remaining(), 0);
        assert_eq!(signal.level(), SignalLevel::Low);
    }

    #[test]
    fn count_is_frozen_during_cooldown() {
        let mut monitor = AlertMonitor::new(test_config(1, 5)).unwrap();
        let mut signal = LogSignal::new();
        let batch = vec![centered(17)];

        monitor.process_frame(&batch, &mut signal).unwrap();
        monitor.process_frame(&batch, &mut signal).unwrap();
        assert_eq!(monitor.state(), AlertState::Cooldown);

        monitor.process_frame(&batch, &mut signal).unwrap();
        assert_eq!(monitor.count(), 0);
    }

    #[test]
    fn zero_threshold_is_a_startup_error() {
        assert!(AlertMonitor::new(test_config(0, 10)).is_err());
    }

    #[test]
    fn zero_pause_length_is_a_startup_error() {
        assert!(AlertMonitor::new(test_config(2, 0)).is_err());
    }

    #[test]
    fn empty_target_set_is_a_startup_error() {
        let mut config = test_config(2, 10);
        config.target_classes.clear();
        assert!(AlertMonitor::new(config).is_err());
    }

    #[test]
    fn target_class_outside_label_map_is_a_startup_error() {
        let mut config = test_config(2, 10);
        config.target_classes.insert(91);
        assert!(AlertMonitor::new(config).is_err());
    }
}
