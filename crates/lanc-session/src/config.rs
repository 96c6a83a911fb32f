//! Client settings, loadable from a JSON file.
//!
//! ```json
//! {
//!   "local_uuid": "00000000000000000000000000000005",
//!   "pin": 4321,
//!   "device_address": "10.0.0.14",
//!   "keepalive_interval": "30s"
//! }
//! ```
//!
//! Durations accept `"30s"`, `"500ms"` or a bare number of seconds.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use lanc_frame::DeviceUuid;
use lanc_transport::{DiscoveryConfig, TransportConfig, DEFAULT_PORT};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

const DEFAULT_LOCAL_UUID: DeviceUuid = DeviceUuid::from_bytes([
    0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 5,
]);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Identity of this app on the device.
    pub local_uuid: DeviceUuid,
    pub pin: u32,
    /// Name this app registers under.
    pub device_name: String,
    pub broadcast: IpAddr,
    pub port: u16,
    /// Local port the discovery listener binds to.
    pub discovery_port: u16,
    /// Filled in by discovery, or preset to skip it.
    pub device_address: Option<IpAddr>,
    pub device_uuid: Option<DeviceUuid>,
    #[serde(with = "duration_format")]
    pub keepalive_interval: Duration,
    /// Pause between sensor re-subscriptions after a reconnect.
    #[serde(with = "duration_format")]
    pub resubscribe_delay: Duration,
    #[serde(with = "duration_format")]
    pub connect_timeout: Duration,
    #[serde(with = "optional_duration_format")]
    pub idle_timeout: Option<Duration>,
    #[serde(with = "optional_duration_format")]
    pub discovery_timeout: Option<Duration>,
    /// Log frame hex dumps at debug level.
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            local_uuid: DEFAULT_LOCAL_UUID,
            pin: 0,
            device_name: "lanc".to_string(),
            broadcast: IpAddr::V4(Ipv4Addr::BROADCAST),
            port: DEFAULT_PORT,
            discovery_port: DEFAULT_PORT,
            device_address: None,
            device_uuid: None,
            keepalive_interval: Duration::from_secs(30),
            resubscribe_delay: Duration::from_millis(250),
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(60)),
            discovery_timeout: None,
            debug: false,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| SessionError::SettingsIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Address and UUID of the device, once both are known.
    pub fn device(&self) -> Option<(SocketAddr, DeviceUuid)> {
        Some((
            SocketAddr::new(self.device_address?, self.port),
            self.device_uuid?,
        ))
    }

    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            connect_timeout: self.connect_timeout,
            idle_timeout: self.idle_timeout,
            log_payloads: self.debug,
            ..TransportConfig::default()
        }
    }

    pub fn discovery_config(&self) -> DiscoveryConfig {
        DiscoveryConfig {
            bind_port: self.discovery_port,
            target_port: self.port,
            broadcast: self.broadcast,
            device: self.device_address,
            timeout: self.discovery_timeout,
        }
    }
}

/// Parse `"30s"`, `"500ms"` or `"30"` (seconds).
pub fn parse_duration(input: &str) -> std::result::Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .trim()
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;

    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

fn format_duration(duration: Duration) -> String {
    if duration.subsec_millis() == 0 {
        format!("{}s", duration.as_secs())
    } else {
        format!("{}ms", duration.as_millis())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDuration {
    Seconds(u64),
    Text(String),
}

impl RawDuration {
    fn into_duration(self) -> std::result::Result<Duration, String> {
        match self {
            Self::Seconds(0) => Err("duration must be greater than zero".to_string()),
            Self::Seconds(secs) => Ok(Duration::from_secs(secs)),
            Self::Text(text) => parse_duration(&text),
        }
    }
}

mod duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_duration, RawDuration};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        RawDuration::deserialize(deserializer)?
            .into_duration()
            .map_err(serde::de::Error::custom)
    }
}

mod optional_duration_format {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::{format_duration, RawDuration};

    pub fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_str(&format_duration(*duration)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        Option::<RawDuration>::deserialize(deserializer)?
            .map(RawDuration::into_duration)
            .transpose()
            .map_err(serde::de::Error::custom)
    }
}
