use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::path::Path;

use crate::alert::MonitorConfig;
use crate::zone::{FrameDims, Zone};

const DEFAULT_ENDPOINT: &str = "stub://front_door";
const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;
const DEFAULT_TARGET_FPS: u32 = 10;
const DEFAULT_LABEL_MAP_SIZE: u32 = 90;
/// COCO ids: 17 = cat, 18 = dog, 88 = teddy bear (test stand-in).
const DEFAULT_TARGET_CLASSES: &[u32] = &[17, 18, 88];
const DEFAULT_DETECTION_THRESHOLD: u32 = 2;
const DEFAULT_PAUSE_LENGTH: u32 = 10;
const DEFAULT_GPIO_PIN: u8 = 18;
const DEFAULT_MQTT_BROKER_ADDR: &str = "127.0.0.1:1883";
const DEFAULT_MQTT_TOPIC: &str = "petsentry/alert";

#[derive(Debug, Deserialize, Default)]
struct SentryConfigFile {
    detector: Option<DetectorConfigFile>,
    zone: Option<ZoneConfigFile>,
    alert: Option<AlertConfigFile>,
    signal: Option<SignalConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    endpoint: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
    label_map_size: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct ZoneConfigFile {
    top_left: Option<[f32; 2]>,
    bottom_right: Option<[f32; 2]>,
}

#[derive(Debug, Deserialize, Default)]
struct AlertConfigFile {
    target_classes: Option<Vec<u32>>,
    detection_threshold: Option<u32>,
    pause_length: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct SignalConfigFile {
    adapter: Option<String>,
    gpio_pin: Option<u8>,
    mqtt_broker_addr: Option<String>,
    mqtt_topic: Option<String>,
}

/// Resolved daemon configuration: file values, env overrides, validated.
#[derive(Debug, Clone)]
pub struct SentryConfig {
    pub detector: DetectorSettings,
    pub zone: ZoneSettings,
    pub alert: AlertSettings,
    pub signal: SignalSettings,
}

#[derive(Debug, Clone)]
pub struct DetectorSettings {
    /// `stub://` endpoint or a local JSONL path.
    pub endpoint: String,
    pub frame: FrameDims,
    pub target_fps: u32,
    pub label_map_size: u32,
}

#[derive(Debug, Clone)]
pub struct ZoneSettings {
    pub top_left: (f32, f32),
    pub bottom_right: (f32, f32),
}

#[derive(Debug, Clone)]
pub struct AlertSettings {
    pub target_classes: Vec<u32>,
    pub detection_threshold: u32,
    pub pause_length: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignalAdapter {
    Log,
    Gpio,
    Mqtt,
}

impl SignalAdapter {
    fn parse(value: &str) -> Result<Self> {
        match value {
            "log" => Ok(Self::Log),
            "gpio" => Ok(Self::Gpio),
            "mqtt" => Ok(Self::Mqtt),
            other => Err(anyhow!(
                "unknown signal adapter '{}' (expected log, gpio, or mqtt)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignalSettings {
    pub adapter: SignalAdapter,
    pub gpio_pin: u8,
    pub mqtt_broker_addr: String,
    pub mqtt_topic: String,
}

impl SentryConfig {
    /// Load configuration: the JSON file named by `PETSENTRY_CONFIG` (when
    /// set), then env-var overrides, then validation. Any malformed value
    /// refuses startup.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("PETSENTRY_CONFIG").ok();
        let file_cfg = match config_path.as_deref() {
            Some(path) => Some(read_config_file(Path::new(path))?),
            None => None,
        };
        let mut cfg = Self::from_file(file_cfg.unwrap_or_default())?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: SentryConfigFile) -> Result<Self> {
        let detector = DetectorSettings {
            endpoint: file
                .detector
                .as_ref()
                .and_then(|d| d.endpoint.clone())
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            frame: FrameDims {
                width: file
                    .detector
                    .as_ref()
                    .and_then(|d| d.width)
                    .unwrap_or(DEFAULT_FRAME_WIDTH),
                height: file
                    .detector
                    .as_ref()
                    .and_then(|d| d.height)
                    .unwrap_or(DEFAULT_FRAME_HEIGHT),
            },
            target_fps: file
                .detector
                .as_ref()
                .and_then(|d| d.target_fps)
                .unwrap_or(DEFAULT_TARGET_FPS),
            label_map_size: file
                .detector
                .as_ref()
                .and_then(|d| d.label_map_size)
                .unwrap_or(DEFAULT_LABEL_MAP_SIZE),
        };
        let zone = ZoneSettings {
            top_left: file
                .zone
                .as_ref()
                .and_then(|z| z.top_left)
                .map(|[x, y]| (x, y))
                .unwrap_or((0.0, 0.0)),
            bottom_right: file
                .zone
                .as_ref()
                .and_then(|z| z.bottom_right)
                .map(|[x, y]| (x, y))
                .unwrap_or((
                    detector.frame.width as f32,
                    detector.frame.height as f32,
                )),
        };
        let alert = AlertSettings {
            target_classes: file
                .alert
                .as_ref()
                .and_then(|a| a.target_classes.clone())
                .unwrap_or_else(|| DEFAULT_TARGET_CLASSES.to_vec()),
            detection_threshold: file
                .alert
                .as_ref()
                .and_then(|a| a.detection_threshold)
                .unwrap_or(DEFAULT_DETECTION_THRESHOLD),
            pause_length: file
                .alert
                .as_ref()
                .and_then(|a| a.pause_length)
                .unwrap_or(DEFAULT_PAUSE_LENGTH),
        };
        let signal = SignalSettings {
            adapter: file
                .signal
                .as_ref()
                .and_then(|s| s.adapter.as_deref())
                .map(SignalAdapter::parse)
                .transpose()?
                .unwrap_or(SignalAdapter::Log),
            gpio_pin: file
                .signal
                .as_ref()
                .and_then(|s| s.gpio_pin)
                .unwrap_or(DEFAULT_GPIO_PIN),
            mqtt_broker_addr: file
                .signal
                .as_ref()
                .and_then(|s| s.mqtt_broker_addr.clone())
                .unwrap_or_else(|| DEFAULT_MQTT_BROKER_ADDR.to_string()),
            mqtt_topic: file
                .signal
                .and_then(|s| s.mqtt_topic)
                .unwrap_or_else(|| DEFAULT_MQTT_TOPIC.to_string()),
        };
        Ok(Self {
            detector,
            zone,
            alert,
            signal,
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(endpoint) = std::env::var("PETSENTRY_DETECTOR_ENDPOINT") {
            if !endpoint.trim().is_empty() {
                self.detector.endpoint = endpoint;
            }
        }
        if let Ok(classes) = std::env::var("PETSENTRY_TARGET_CLASSES") {
            let parsed = parse_class_csv(&classes)?;
            if !parsed.is_empty() {
                self.alert.target_classes = parsed;
            }
        }
        if let Ok(threshold) = std::env::var("PETSENTRY_DETECTION_THRESHOLD") {
            self.alert.detection_threshold = threshold
                .parse()
                .map_err(|_| anyhow!("PETSENTRY_DETECTION_THRESHOLD must be an integer"))?;
        }
        if let Ok(pause) = std::env::var("PETSENTRY_PAUSE_LENGTH") {
            self.alert.pause_length = pause
                .parse()
                .map_err(|_| anyhow!("PETSENTRY_PAUSE_LENGTH must be an integer"))?;
        }
        if let Ok(adapter) = std::env::var("PETSENTRY_SIGNAL") {
            if !adapter.trim().is_empty() {
                self.signal.adapter = SignalAdapter::parse(adapter.trim())?;
            }
        }
        if let Ok(pin) = std::env::var("PETSENTRY_GPIO_PIN") {
            self.signal.gpio_pin = pin
                .parse()
                .map_err(|_| anyhow!("PETSENTRY_GPIO_PIN must be a BCM pin number"))?;
        }
        if let Ok(addr) = std::env::var("PETSENTRY_MQTT_BROKER_ADDR") {
            if !addr.trim().is_empty() {
                self.signal.mqtt_broker_addr = addr;
            }
        }
        if let Ok(topic) = std::env::var("PETSENTRY_MQTT_TOPIC") {
            if !topic.trim().is_empty() {
                self.signal.mqtt_topic = topic;
            }
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        if self.detector.target_fps == 0 {
            return Err(anyhow!("detector target_fps must be positive"));
        }
        if self.detector.endpoint.trim().is_empty() {
            return Err(anyhow!("detector endpoint must not be empty"));
        }
        // Zone and alert parameters share validation with the monitor.
        self.monitor_config()?;
        Ok(())
    }

    /// Resolve the monitor configuration (zone + thresholds) from these
    /// settings; fails on an inverted zone or out-of-range parameters.
    pub fn monitor_config(&self) -> Result<MonitorConfig> {
        let zone = Zone::new(self.zone.top_left, self.zone.bottom_right)?;
        let config = MonitorConfig {
            zone,
            frame: self.detector.frame,
            target_classes: self.alert.target_classes.iter().copied().collect(),
            detection_threshold: self.alert.detection_threshold,
            pause_length: self.alert.pause_length,
            label_map_size: self.detector.label_map_size,
        };
        config.validate()?;
        Ok(config)
    }
}

fn read_config_file(path: &Path) -> Result<SentryConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

fn parse_class_csv(value: &str) -> Result<Vec<u32>> {
    value
        .split(',')
        .map(|entry| entry.trim())
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            entry
                .parse()
                .map_err(|_| anyhow!("invalid class id '{}' in PETSENTRY_TARGET_CLASSES", entry))
        })
        .collect()
}
