//! demo - scripted end-to-end run of the alert lifecycle
//!
//! Feeds a fixed detection script through the monitor: a qualifying burst
//! that trips the threshold, a cooldown drain, then a second burst after
//! re-arming. Prints one line per tick.

use anyhow::Result;
use clap::Parser;
use std::collections::HashSet;

use pet_sentry::{
    AlertMonitor, BoundingBox, Detection, DetectionSource, FrameDims, LogSignal, MonitorConfig,
    ScriptedSource, SignalEmitter, SignalLevel, Zone,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Scripted pet-sentry lifecycle demo")]
struct Args {
    /// Qualifying frames per burst.
    #[arg(long, default_value_t = 4)]
    qualifying: u32,

    /// Empty frames between bursts.
    #[arg(long, default_value_t = 12)]
    gap: u32,

    /// Debounce threshold (count must exceed it to trigger).
    #[arg(long, default_value_t = 2)]
    threshold: u32,

    /// Cooldown length in frames.
    #[arg(long, default_value_t = 10)]
    pause: u32,

    /// Target class id (COCO: 17 = cat, 18 = dog).
    #[arg(long, default_value_t = 17)]
    class: u32,
}

fn centered_pet(class_id: u32) -> Detection {
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

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let dims = FrameDims {
        width: 640,
        height: 480,
    };
    let config = MonitorConfig {
        zone: Zone::full_frame(dims),
        frame: dims,
        target_classes: HashSet::from([args.class]),
        detection_threshold: args.threshold,
        pause_length: args.pause,
        label_map_size: 90,
    };
    let mut monitor = AlertMonitor::new(config)?;
    let mut signal = LogSignal::new();

    let mut script: Vec<Vec<Detection>> = Vec::new();
    for _ in 0..2 {
        for _ in 0..args.qualifying {
            script.push(vec![centered_pet(args.class)]);
        }
        for _ in 0..args.gap {
            script.push(vec![]);
        }
    }

    let mut source = ScriptedSource::new(script);
    source.connect()?;

    let mut tick = 0u32;
    while let Some(batch) = source.next_batch()? {
        tick += 1;
        let outcome = monitor.process_frame(&batch, &mut signal)?;
        println!(
            "tick {:>3}: detections={} state={:?} count={} cooldown={:>2} signal={:?} outcome={:?}",
            tick,
            batch.len(),
            monitor.state(),
            monitor.count(),
            monitor.cooldown_remaining(),
            signal.level(),
            outcome
        );
    }

    if signal.level() == SignalLevel::High {
        signal.clear_signal()?;
    }
    Ok(())
}
