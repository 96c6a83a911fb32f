//! Message codec for the LAN C protocol.
//!
//! Turns logical requests into an operation envelope plus a command body,
//! and inbound envelope/body pairs back into typed messages. The wire
//! messages are protobuf (proto2) and are declared by hand in [`messages`].
//!
//! The static lookup tables live here as well:
//! - [`kind`]: operation-type codes
//! - [`sensor`]: sensor ids, value widths and names
//! - [`command`]: named RMI commands and product codes

pub mod codec;
pub mod command;
pub mod error;
pub mod kind;
pub mod messages;
pub mod payload;
pub mod result;
pub mod sensor;

pub use codec::{
    DecodedMessage, DiscoveryResponse, EncodedMessage, MessageCodec, ProtobufCodec, Request,
    DISCOVERY_REQUEST,
};
pub use command::{lookup_command, product_name, COMMANDS};
pub use error::{ProtoError, Result};
pub use kind::MessageKind;
pub use payload::{
    AlarmInfo, GatewayVersion, NodeInfo, Payload, RegisteredApp, SensorReading, SessionStarted,
};
pub use result::ResultCode;
pub use sensor::{decode_sensor_value, lookup_sensor, SensorInfo, SensorKind, SensorValue, SENSORS};
