//! One-shot UDP discovery.
//!
//! A fixed search request goes out as a broadcast (no device known yet) or as a
//! unicast to a known address. The first reply that decodes as a gateway
//! search response wins; the listener is closed right after, so further
//! replies are dropped.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use lanc_frame::DeviceUuid;
use lanc_proto::MessageCodec;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::config::DiscoveryConfig;
use crate::error::{Result, TransportError};

const RECV_BUFFER_SIZE: usize = 1500;

/// Result of a successful discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// Address the device reported for itself.
    pub address: IpAddr,
    pub uuid: DeviceUuid,
    /// Where the reply datagram came from.
    pub responder: SocketAddr,
    pub version: Option<u32>,
}

/// Find the device and resolve its address and identity.
///
/// Without [`DiscoveryConfig::timeout`] this waits for a reply forever.
pub async fn discover<C>(codec: &C, config: &DiscoveryConfig) -> Result<DiscoveredDevice>
where
    C: MessageCodec + ?Sized,
{
    let exchange = exchange(codec, config);
    match config.timeout {
        Some(after) => tokio::time::timeout(after, exchange)
            .await
            .map_err(|_| TransportError::Timeout {
                operation: "discovery",
                after,
            })?,
        None => exchange.await,
    }
}

async fn exchange<C>(codec: &C, config: &DiscoveryConfig) -> Result<DiscoveredDevice>
where
    C: MessageCodec + ?Sized,
{
    let unspecified = match config.device.unwrap_or(config.broadcast) {
        IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
        IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
    };
    let bind_addr = SocketAddr::new(unspecified, config.bind_port);
    let socket = UdpSocket::bind(bind_addr)
        .await
        .map_err(|source| TransportError::Bind {
            addr: bind_addr,
            source,
        })?;

    let request = codec.discovery_request();
    let target = match config.device {
        Some(device) => SocketAddr::new(device, config.target_port),
        None => {
            if let IpAddr::V4(group) = config.broadcast {
                if group.is_multicast() {
                    socket.join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)?;
                }
            }
            socket.set_broadcast(true)?;
            SocketAddr::new(config.broadcast, config.target_port)
        }
    };
    debug!(%target, request = %hex::encode(&request), "sending discovery request");
    socket.send_to(&request, target).await?;

    let mut buf = vec![0u8; RECV_BUFFER_SIZE];
    loop {
        let (len, responder) = socket.recv_from(&mut buf).await?;
        let datagram = &buf[..len];
        if datagram == request.as_ref() {
            // our own broadcast looping back
            continue;
        }
        debug!(%responder, reply = %hex::encode(datagram), "discovery reply");
        let response = match codec.decode_discovery(datagram) {
            Ok(response) => response,
            Err(err) => {
                warn!(%responder, error = %err, "undecodable discovery reply");
                return Err(err.into());
            }
        };
        info!(address = %response.address, uuid = %response.uuid, "device discovered");
        return Ok(DiscoveredDevice {
            address: response.address,
            uuid: response.uuid,
            responder,
            version: response.version,
        });
    }
}
