//! Alert signal boundary.
//!
//! The monitor drives a binary output through [`SignalEmitter`]: HIGH while
//! an alert is active, LOW otherwise. Adapters behind the trait deliver the
//! level to a platform channel such as a GPIO pin or an MQTT topic,
//! keeping the state machine portable and testable without hardware.
//!
//! The alert monitor is the sole caller. Both operations are idempotent
//! and take effect before the next frame tick begins; there is no queuing
//! or batching.

#[cfg(feature = "signal-gpio")]
pub mod gpio;
#[cfg(feature = "signal-mqtt")]
pub mod mqtt;

use anyhow::Result;

/// Binary signal level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SignalLevel {
    High,
    #[default]
    Low,
}

/// Boundary to the physical or logical alert channel.
pub trait SignalEmitter {
    /// Adapter identifier.
    fn name(&self) -> &'static str;

    /// Drive the signal HIGH. Idempotent.
    fn assert_signal(&mut self) -> Result<()>;

    /// Drive the signal LOW. Idempotent.
    fn clear_signal(&mut self) -> Result<()>;

    /// Currently driven level, for telemetry.
    fn level(&self) -> SignalLevel;
}

/// Log-only adapter; the default when no hardware is configured.
pub struct LogSignal {
    level: SignalLevel,
}

impl LogSignal {
    pub fn new() -> Self {
        Self {
            level: SignalLevel::Low,
        }
    }
}

impl Default for LogSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalEmitter for LogSignal {
    fn name(&self) -> &'static str {
        "log"
    }

    fn assert_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::High {
            self.level = SignalLevel::High;
            log::info!("alert signal HIGH");
        }
        Ok(())
    }

    fn clear_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::Low {
            self.level = SignalLevel::Low;
            log::info!("alert signal LOW");
        }
        Ok(())
    }

    fn level(&self) -> SignalLevel {
        self.level
    }
}
