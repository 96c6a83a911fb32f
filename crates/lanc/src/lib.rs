//! Client for ventilation units speaking the LAN C protocol.
//!
//! # Crate Structure
//!
//! - [`frame`]: stream frame format, device UUIDs and the transmit header
//! - [`proto`]: message codec, operation kinds, sensor and command tables
//! - [`transport`]: TCP frame transport and UDP discovery
//! - [`session`]: session lifecycle, keepalive and reconnect
//!
//! ```no_run
//! use lanc::session::{Session, SessionEvent, Settings};
//!
//! # async fn run() -> lanc::session::Result<()> {
//! let (session, mut events) = Session::new(Settings::default());
//! session.discover().await?;
//! session.start_session(true).await?;
//! session.register_sensor(227).await?;
//! while let Some(event) = events.recv().await {
//!     if let SessionEvent::Message(inbound) = event {
//!         println!("{:?}", inbound.message.payload);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Re-export frame types.
pub mod frame {
    pub use lanc_frame::*;
}

/// Re-export codec types.
pub mod proto {
    pub use lanc_proto::*;
}

/// Re-export transport types.
pub mod transport {
    pub use lanc_transport::*;
}

/// Re-export session types.
pub mod session {
    pub use lanc_session::*;
}
