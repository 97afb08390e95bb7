//! MQTT signal adapter.
//!
//! Publishes the alert level as a retained payload so notification bridges
//! (phone push, Home Assistant automations) see the current state on
//! subscribe. A last-will message marks the sentry OFFLINE if the process
//! dies while connected.

use std::time::Duration;

use anyhow::{anyhow, Result};
use rumqttc::v5::mqttbytes::v5::LastWill;
use rumqttc::v5::{mqttbytes::QoS, Client, Event, MqttOptions};

use super::{SignalEmitter, SignalLevel};

const PAYLOAD_HIGH: &str = "HIGH";
const PAYLOAD_LOW: &str = "LOW";
const PAYLOAD_OFFLINE: &str = "OFFLINE";

#[derive(Clone, Debug)]
pub struct MqttSignalConfig {
    pub host: String,
    pub port: u16,
    pub client_id: String,
    pub topic: String,
}

impl MqttSignalConfig {
    /// Build a config from a `host:port` broker address.
    pub fn for_broker(broker_addr: &str, topic: &str) -> Result<Self> {
        let (host, port) = broker_addr
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("MQTT broker address must be host:port: {}", broker_addr))?;
        let port: u16 = port
            .parse()
            .map_err(|_| anyhow!("invalid MQTT broker port in {}", broker_addr))?;
        Ok(Self {
            host: host.to_string(),
            port,
            client_id: "petsentry".to_string(),
            topic: topic.to_string(),
        })
    }
}

pub struct MqttSignal {
    client: Client,
    topic: String,
    level: SignalLevel,
    connection_handle: Option<std::thread::JoinHandle<()>>,
}

impl MqttSignal {
    /// Connect to the broker and publish an initial LOW state.
    pub fn connect(config: MqttSignalConfig) -> Result<Self> {
        let mut options = MqttOptions::new(&config.client_id, &config.host, config.port);
        options.set_keep_alive(Duration::from_secs(60));
        options.set_clean_start(true);
        let will = LastWill::new(
            config.topic.as_str(),
            PAYLOAD_OFFLINE.as_bytes().to_vec(),
            QoS::AtLeastOnce,
            true,
            None,
        );
        options.set_last_will(will);

        let (client, mut connection) = Client::new(options, 10);
        let handle = std::thread::spawn(move || {
            for event in connection.iter() {
                match event {
                    Ok(Event::Incoming(_)) | Ok(Event::Outgoing(_)) => {}
                    Err(e) => {
                        log::warn!("MQTT connection error: {}", e);
                        break;
                    }
                }
            }
        });
        log::info!(
            "MqttSignal: publishing alert level to {} on {}:{}",
            config.topic,
            config.host,
            config.port
        );

        let mut emitter = Self {
            client,
            topic: config.topic,
            level: SignalLevel::Low,
            connection_handle: Some(handle),
        };
        emitter.publish(PAYLOAD_LOW)?;
        Ok(emitter)
    }

    fn publish(&mut self, payload: &str) -> Result<()> {
        self.client.publish(
            self.topic.as_str(),
            QoS::AtLeastOnce,
            true,
            payload.as_bytes().to_vec(),
        )?;
        Ok(())
    }

    /// Disconnect cleanly, joining the connection thread.
    pub fn disconnect(mut self) -> Result<()> {
        self.client.disconnect()?;
        if let Some(handle) = self.connection_handle.take() {
            let _ = handle.join();
        }
        Ok(())
    }
}

impl SignalEmitter for MqttSignal {
    fn name(&self) -> &'static str {
        "mqtt"
    }

    fn assert_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::High {
            self.publish(PAYLOAD_HIGH)?;
            self.level = SignalLevel::High;
        }
        Ok(())
    }

    fn clear_signal(&mut self) -> Result<()> {
        if self.level != SignalLevel::Low {
            self.publish(PAYLOAD_LOW)?;
            self.level = SignalLevel::Low;
        }
        Ok(())
    }

    fn level(&self) -> SignalLevel {
        self.level
    }
}
