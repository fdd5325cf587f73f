use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::address::Room;
use crate::error::Result;

/// Endpoint of a single device. Immutable once handed to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    /// Deadline for connecting and for each send or receive.
    pub timeout_ms: u64,
    /// Reject read responses whose transaction id or function code differ
    /// from the request instead of only logging them.
    pub verify_read_responses: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 502,
            timeout_ms: 60_000,
            verify_read_responses: false,
        }
    }
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis().try_into().unwrap_or(u64::MAX);
        self
    }

    pub fn with_verified_reads(mut self, verify: bool) -> Self {
        self.verify_read_responses = verify;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// `host:port`, for messages.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration file of `wgtctl`.
///
/// ```yaml
/// device:
///   host: 192.168.1.40
///   port: 502
///   timeout_ms: 5000
/// room: 3
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub device: ClientConfig,
    pub room: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: ClientConfig::default(),
            room: 1,
        }
    }
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn room(&self) -> Result<Room> {
        Room::new(self.room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_match_the_device() {
        let config = ClientConfig::default();
        assert_eq!(config.port, 502);
        assert_eq!(config.timeout(), Duration::from_secs(60));
        assert!(!config.verify_read_responses);
    }

    #[test]
    fn yaml_fills_missing_keys_with_defaults() {
        let config = Config::from_yaml("device:\n  host: 10.0.0.7\n  timeout_ms: 1500\nroom: 4\n")
            .unwrap();
        assert_eq!(config.device.host, "10.0.0.7");
        assert_eq!(config.device.port, 502);
        assert_eq!(config.device.timeout(), Duration::from_millis(1500));
        assert_eq!(config.room().unwrap().number(), 4);
    }

    #[test]
    fn invalid_room_and_yaml_are_rejected() {
        let config = Config::from_yaml("room: 18\n").unwrap();
        assert!(matches!(config.room(), Err(Error::OutOfRange { .. })));
        assert!(matches!(
            Config::from_yaml("device: [1, 2]"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn builder_helpers() {
        let config = ClientConfig::new("wgt.local", 5020)
            .with_timeout(Duration::from_millis(250))
            .with_verified_reads(true);
        assert_eq!(config.endpoint(), "wgt.local:5020");
        assert_eq!(config.timeout_ms, 250);
        assert!(config.verify_read_responses);
    }
}
