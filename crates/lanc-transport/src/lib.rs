//! Network layer of the LAN C client.
//!
//! - [`FrameTransport`] owns the single TCP connection to the device, frames
//!   outbound envelope/body pairs and emits every inbound frame as a
//!   [`TransportEvent`].
//! - [`discover`] performs the one-shot UDP exchange that resolves the
//!   device's address and identity before any connection is attempted.

pub mod config;
pub mod discovery;
pub mod error;
pub mod state;
pub mod tcp;

pub use config::{DiscoveryConfig, TransportConfig, DEFAULT_PORT};
pub use discovery::{discover, DiscoveredDevice};
pub use error::{Result, TransportError};
pub use state::ConnectionState;
pub use tcp::{FrameTransport, ReceivedFrame, TransportEvent};
