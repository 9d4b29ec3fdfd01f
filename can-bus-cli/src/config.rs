//! Catalog file loading and parsing

use anyhow::{bail, Context, Result};
use can_bus_core::{CanBus, Command, DescriptorCatalog, Signal};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Descriptor tables, buses and replay samples (loaded from catalog.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub signals: Vec<Signal>,
    #[serde(default)]
    pub commands: Vec<Command>,
    #[serde(default)]
    pub buses: Vec<BusConfig>,
    #[serde(default)]
    pub samples: Vec<CounterSample>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusConfig {
    pub address: u8,
}

/// Counters observed on one bus at one point in time
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CounterSample {
    pub time_ms: u64,
    pub bus: u8,
    pub received: u64,
    #[serde(default)]
    pub dropped: u64,
    /// Receive time of the newest frame; defaults to `time_ms` when frames arrived
    pub last_message_ms: Option<u64>,
}

impl AppConfig {
    pub fn catalog(&self) -> DescriptorCatalog {
        DescriptorCatalog::new(self.signals.clone(), self.commands.clone())
    }

    pub fn create_buses(&self) -> Vec<CanBus> {
        self.buses.iter().map(|bus| CanBus::new(bus.address)).collect()
    }

    /// Samples ordered by time, stable for equal timestamps
    pub fn sorted_samples(&self) -> Vec<CounterSample> {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|sample| sample.time_ms);
        samples
    }

    fn validate(&self) -> Result<()> {
        for sample in &self.samples {
            if !self.buses.iter().any(|bus| bus.address == sample.bus) {
                bail!(
                    "Sample at {} ms refers to unknown bus {}",
                    sample.time_ms,
                    sample.bus
                );
            }
        }
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .validate()
        .with_context(|| format!("Invalid config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"
        [[signals]]
        generic_name = "ENGINE_SPEED"

        [[signals]]
        generic_name = "DOOR_LOCK"
        writable = true
        states = [
            { name = "UNLOCKED", value = 0 },
            { name = "LOCKED", value = 1 },
        ]

        [[commands]]
        generic_name = "DEVICE_ID"

        [[buses]]
        address = 1

        [[samples]]
        time_ms = 10000
        bus = 1
        received = 250

        [[samples]]
        time_ms = 5000
        bus = 1
        received = 100
        dropped = 2
        last_message_ms = 4900
    "#;

    #[test]
    fn test_config_deserialization() {
        let config: AppConfig = toml::from_str(CATALOG).unwrap();
        assert_eq!(config.signals.len(), 2);
        assert!(!config.signals[0].writable);
        assert_eq!(config.signals[1].states[1].name, "LOCKED");
        assert_eq!(config.commands[0].generic_name, "DEVICE_ID");

        let samples = config.sorted_samples();
        assert_eq!(samples[0].time_ms, 5000);
        assert_eq!(samples[0].last_message_ms, Some(4900));
        assert_eq!(samples[1].dropped, 0);

        assert!(config.catalog().writable_signal("DOOR_LOCK").is_some());
        assert_eq!(config.create_buses()[0].address, 1);
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.samples.len(), 2);
    }

    #[test]
    fn test_unknown_bus_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[[samples]]\ntime_ms = 1\nbus = 4\nreceived = 1\n").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("unknown bus 4"));
    }
}
