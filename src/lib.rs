//! Pet Sentry
//!
//! Frame-by-frame detection-to-alert decision core for a pet-watching
//! camera. An external perception model reports (class, confidence, bbox)
//! batches once per frame; this crate decides whether a monitored class is
//! present and settled inside a configured zone long enough to raise a
//! binary alert signal, then holds the signal through a cooldown before
//! re-arming.
//!
//! # Architecture
//!
//! - `detect`: detection types and the external-detector boundary
//! - `zone`: the rectangular region-of-interest test
//! - `alert`: presence accumulation and the Idle/Triggered/Cooldown machine
//! - `signal`: the assert/clear output boundary and platform adapters
//! - `config`: startup configuration (file + env), validated before run
//!
//! The pipeline is single-threaded and frame-synchronous: one
//! [`alert::AlertMonitor::process_frame`] call per tick, with all timing
//! counted in frame ticks rather than wall-clock. Camera capture and model
//! inference stay behind the `detect` boundary; alert delivery stays
//! behind the `signal` boundary. Neither is this crate's concern.

pub mod alert;
pub mod config;
pub mod detect;
pub mod signal;
pub mod zone;

pub use alert::{AlertMonitor, AlertState, MonitorConfig, TickOutcome};
pub use config::{SentryConfig, SignalAdapter};
pub use detect::{
    source_for_endpoint, BoundingBox, Detection, DetectionSource, JsonlSource, ScriptedSource,
    SourceStats, SyntheticSource,
};
pub use signal::{LogSignal, SignalEmitter, SignalLevel};
pub use zone::{FrameDims, Zone};
