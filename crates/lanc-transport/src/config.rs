use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use lanc_frame::DEFAULT_MAX_FRAME;

/// Port the device listens on for both discovery and sessions.
pub const DEFAULT_PORT: u16 = 56747;

/// Tuning for the TCP connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    pub connect_timeout: Duration,
    /// Close the connection after this long without traffic. `None` disables it.
    pub idle_timeout: Option<Duration>,
    /// Enable TCP keepalive probing on the socket.
    pub tcp_keepalive: bool,
    pub max_frame: usize,
    /// Log frame hex dumps at debug instead of trace.
    pub log_payloads: bool,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Some(Duration::from_secs(60)),
            tcp_keepalive: true,
            max_frame: DEFAULT_MAX_FRAME,
            log_payloads: false,
        }
    }
}

/// Tuning for the UDP discovery exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Local port the listener binds to. 0 picks an ephemeral port.
    pub bind_port: u16,
    /// Port the discovery request is sent to.
    pub target_port: u16,
    /// Broadcast (or multicast group) address used when no device is known.
    pub broadcast: IpAddr,
    /// Known device address; the request is sent unicast when set.
    pub device: Option<IpAddr>,
    /// How long to wait for a reply. `None` waits forever.
    pub timeout: Option<Duration>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            bind_port: DEFAULT_PORT,
            target_port: DEFAULT_PORT,
            broadcast: IpAddr::V4(Ipv4Addr::BROADCAST),
            device: None,
            timeout: None,
        }
    }
}
