use std::io::Write;
use std::sync::Mutex;

use tempfile::NamedTempFile;

use pet_sentry::config::{SentryConfig, SignalAdapter};

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "PETSENTRY_CONFIG",
        "PETSENTRY_DETECTOR_ENDPOINT",
        "PETSENTRY_TARGET_CLASSES",
        "PETSENTRY_DETECTION_THRESHOLD",
        "PETSENTRY_PAUSE_LENGTH",
        "PETSENTRY_SIGNAL",
        "PETSENTRY_GPIO_PIN",
        "PETSENTRY_MQTT_BROKER_ADDR",
        "PETSENTRY_MQTT_TOPIC",
    ] {
        std::env::remove_var(key);
    }
}

fn write_config(json: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp config");
    file.write_all(json.as_bytes()).expect("write config");
    file
}

#[test]
fn defaults_are_complete_and_valid() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = SentryConfig::load().expect("load defaults");

    assert_eq!(cfg.detector.endpoint, "stub://front_door");
    assert_eq!(cfg.detector.frame.width, 640);
    assert_eq!(cfg.detector.frame.height, 480);
    assert_eq!(cfg.detector.target_fps, 10);
    assert_eq!(cfg.alert.target_classes, vec![17, 18, 88]);
    assert_eq!(cfg.alert.detection_threshold, 2);
    assert_eq!(cfg.alert.pause_length, 10);
    assert_eq!(cfg.zone.top_left, (0.0, 0.0));
    assert_eq!(cfg.zone.bottom_right, (640.0, 480.0));
    assert_eq!(cfg.signal.adapter, SignalAdapter::Log);
    assert_eq!(cfg.signal.gpio_pin, 18);

    cfg.monitor_config().expect("monitor config");
    clear_env();
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "detector": {
                "endpoint": "detections.jsonl",
                "width": 800,
                "height": 600,
                "target_fps": 12,
                "label_map_size": 90
            },
            "zone": {
                "top_left": [40.0, 0.0],
                "bottom_right": [760.0, 560.0]
            },
            "alert": {
                "target_classes": [17, 18],
                "detection_threshold": 3,
                "pause_length": 20
            },
            "signal": {
                "adapter": "mqtt",
                "mqtt_broker_addr": "10.0.0.5:1883",
                "mqtt_topic": "home/petsentry"
            }
        }"#,
    );

    std::env::set_var("PETSENTRY_CONFIG", file.path());
    std::env::set_var("PETSENTRY_DETECTION_THRESHOLD", "5");
    std::env::set_var("PETSENTRY_SIGNAL", "log");

    let cfg = SentryConfig::load().expect("load config");

    assert_eq!(cfg.detector.endpoint, "detections.jsonl");
    assert_eq!(cfg.detector.frame.width, 800);
    assert_eq!(cfg.detector.frame.height, 600);
    assert_eq!(cfg.detector.target_fps, 12);
    assert_eq!(cfg.zone.top_left, (40.0, 0.0));
    assert_eq!(cfg.zone.bottom_right, (760.0, 560.0));
    assert_eq!(cfg.alert.target_classes, vec![17, 18]);
    // Env wins over the file.
    assert_eq!(cfg.alert.detection_threshold, 5);
    assert_eq!(cfg.signal.adapter, SignalAdapter::Log);
    assert_eq!(cfg.alert.pause_length, 20);
    assert_eq!(cfg.signal.mqtt_broker_addr, "10.0.0.5:1883");
    assert_eq!(cfg.signal.mqtt_topic, "home/petsentry");

    clear_env();
}

#[test]
fn target_classes_env_is_parsed_as_csv() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PETSENTRY_TARGET_CLASSES", "17, 18");
    let cfg = SentryConfig::load().expect("load config");
    assert_eq!(cfg.alert.target_classes, vec![17, 18]);

    std::env::set_var("PETSENTRY_TARGET_CLASSES", "17,cat");
    assert!(SentryConfig::load().is_err());

    clear_env();
}

#[test]
fn zero_threshold_refuses_startup() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PETSENTRY_DETECTION_THRESHOLD", "0");
    assert!(SentryConfig::load().is_err());

    clear_env();
}

#[test]
fn zero_pause_length_refuses_startup() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PETSENTRY_PAUSE_LENGTH", "0");
    assert!(SentryConfig::load().is_err());

    clear_env();
}

#[test]
fn inverted_zone_refuses_startup() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let file = write_config(
        r#"{
            "zone": {
                "top_left": [400.0, 0.0],
                "bottom_right": [100.0, 480.0]
            }
        }"#,
    );
    std::env::set_var("PETSENTRY_CONFIG", file.path());
    assert!(SentryConfig::load().is_err());

    clear_env();
}

#[test]
fn unknown_signal_adapter_refuses_startup() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PETSENTRY_SIGNAL", "semaphore");
    assert!(SentryConfig::load().is_err());

    clear_env();
}

#[test]
fn target_class_outside_label_map_refuses_startup() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("PETSENTRY_TARGET_CLASSES", "17,900");
    assert!(SentryConfig::load().is_err());

    clear_env();
}
