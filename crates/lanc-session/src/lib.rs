//! Session management for the LAN C protocol.
//!
//! A [`Session`] drives one device through discovery, session start,
//! keepalive and reconnection, and reports every decoded inbound frame on
//! its event channel. Requests are fire-and-forget: operations resolve once
//! the frame is written and replies arrive later as [`SessionEvent`]s.

pub mod config;
pub mod error;
pub mod event;
pub mod pending;
pub mod session;
pub mod state;
pub mod subscriptions;

pub use config::{parse_duration, Settings};
pub use error::{Result, SessionError};
pub use event::{DisconnectReason, InboundMessage, SessionEvent};
pub use pending::{PendingEntry, PendingResponses};
pub use session::Session;
pub use state::SessionState;
pub use subscriptions::Subscriptions;
