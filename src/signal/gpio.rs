//! Raspberry Pi GPIO signal adapter.
//!
//! Drives a BCM output pin HIGH while an alert is active, LOW otherwise.
//! The pin is driven LOW on construction and again on drop.

use anyhow::{Context, Result};
use rppal::gpio::{Gpio, OutputPin};

use super::{SignalEmitter, SignalLevel};

pub struct GpioSignal {
    pin: OutputPin,
    bcm_pin: u8,
    level: SignalLevel,
}

impl GpioSignal {
    pub fn new(bcm_pin: u8) -> Result<Self> {
        let gpio = Gpio::new().context("initialize GPIO")?;
        let mut pin = gpio
            .get(bcm_pin)
            .with_context(|| format!("claim GPIO pin {}", bcm_pin))?
            .into_output();
        pin.set_low();
        log::info!("GpioSignal: driving BCM pin {}", bcm_pin);
        Ok(Self {
            pin,
            bcm_pin,
            level: SignalLevel::Low,
        })
    }
}

impl SignalEmitter for GpioSignal {
    fn name(&self) -> &'static str {
        "gpio"
    }

    fn assert_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::High {
            self.pin.set_high();
            self.level = SignalLevel::High;
            log::info!("alert signal HIGH on BCM pin {}", self.bcm_pin);
        }
        Ok(())
    }

    fn clear_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::Low {
            self.pin.set_low();
            self.level = SignalLevel::Low;
            log::info!("alert signal LOW on BCM pin {}", self.bcm_pin);
        }
        Ok(())
    }

    fn level(&self) -> SignalLevel {
        self.level
    }
}

impl Drop for GpioSignal {
    fn drop(&mut self) {
        self.pin.set_low();
    }
}
