//! petsentryd - Pet Sentry daemon
//!
//! This daemon:
//! 1. Loads configuration (JSON file + env overrides)
//! 2. Connects a detection source (synthetic stub or local JSONL feed)
//! 3. Runs the per-frame accumulate/trigger/cooldown loop
//! 4. Drives the configured signal adapter (log, GPIO pin, MQTT topic)
//! 5. Clears the signal on shutdown so the emitter is left LOW

use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use pet_sentry::config::{SentryConfig, SignalAdapter, SignalSettings};
use pet_sentry::{source_for_endpoint, AlertMonitor, LogSignal, SignalEmitter, TickOutcome};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = SentryConfig::load()?;
    let mut monitor = AlertMonitor::new(cfg.monitor_config()?)?;

    // Target classes are validated non-empty; the first one seeds the
    // synthetic source for stub:// endpoints.
    let synthetic_class = cfg.alert.target_classes[0];
    let mut source = source_for_endpoint(&cfg.detector.endpoint, synthetic_class)?;
    source.connect()?;

    let mut signal = build_signal(&cfg.signal)?;

    let running = Arc::new(AtomicBool::new(true));
    let stop_flag = running.clone();
    ctrlc::set_handler(move || {
        stop_flag.store(false, Ordering::SeqCst);
    })?;

    log::info!(
        "petsentryd running. endpoint={} source={} signal={}",
        cfg.detector.endpoint,
        source.name(),
        signal.name()
    );
    log::info!(
        "zone top_left={:?} bottom_right={:?}, classes={:?}, threshold={}, pause={} frames",
        cfg.zone.top_left,
        cfg.zone.bottom_right,
        cfg.alert.target_classes,
        cfg.alert.detection_threshold,
        cfg.alert.pause_length
    );

    let frame_interval = Duration::from_millis(1000 / u64::from(cfg.detector.target_fps));
    let mut last_health_log = Instant::now();
    let mut frame_count = 0u64;

    while running.load(Ordering::SeqCst) {
        let Some(batch) = source.next_batch()? else {
            log::info!("detection source exhausted after {} frames", frame_count);
            break;
        };
        frame_count += 1;

        match monitor.process_frame(&batch, signal.as_mut())? {
            TickOutcome::Triggered => {
                log::info!(
                    "pet detected! signal HIGH for {} frames",
                    cfg.alert.pause_length
                );
            }
            TickOutcome::Cleared => log::info!("cooldown complete, signal LOW, re-armed"),
            TickOutcome::Counted => log::debug!("qualifying frame, count={}", monitor.count()),
            TickOutcome::Unchanged => {}
        }

        if last_health_log.elapsed() >= Duration::from_secs(5) {
            let stats = source.stats();
            log::info!(
                "source health={} frames={} state={:?} count={} cooldown={}",
                source.is_healthy(),
                stats.frames_delivered,
                monitor.state(),
                monitor.count(),
                monitor.cooldown_remaining()
            );
            last_health_log = Instant::now();
        }

        std::thread::sleep(frame_interval);
    }

    // Leave the emitter in a defined LOW state on the way out.
    signal.clear_signal()?;
    log::info!("petsentryd stopped");
    Ok(())
}

fn build_signal(settings: &SignalSettings) -> Result<Box<dyn SignalEmitter>> {
    match settings.adapter {
        SignalAdapter::Log => Ok(Box::new(LogSignal::new())),
        #[cfg(feature = "signal-gpio")]
        SignalAdapter::Gpio => Ok(Box::new(pet_sentry::signal::gpio::GpioSignal::new(
            settings.gpio_pin,
        )?)),
        #[cfg(not(feature = "signal-gpio"))]
        SignalAdapter::Gpio => Err(anyhow::anyhow!(
            "GPIO signal requires the signal-gpio feature"
        )),
        #[cfg(feature = "signal-mqtt")]
        SignalAdapter::Mqtt => {
            let config = pet_sentry::signal::mqtt::MqttSignalConfig::for_broker(
                &settings.mqtt_broker_addr,
                &settings.mqtt_topic,
            )?;
            Ok(Box::new(pet_sentry::signal::mqtt::MqttSignal::connect(
                config,
            )?))
        }
        #[cfg(not(feature = "signal-mqtt"))]
        SignalAdapter::Mqtt => Err(anyhow::anyhow!(
            "MQTT signal requires the signal-mqtt feature"
        )),
    }
}
