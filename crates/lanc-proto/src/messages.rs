//! Protobuf (proto2) message definitions for the LAN C gateway protocol.
//!
//! Declared by hand with `prost` derives; every field is optional on the
//! wire so partial replies from older firmware still decode.

use prost::Message;

/// Envelope carried in front of every command body.
#[derive(Clone, PartialEq, Message)]
pub struct GatewayOperation {
    #[prost(int32, optional, tag = "1")]
    pub r#type: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub result: Option<i32>,
    #[prost(string, optional, tag = "3")]
    pub result_description: Option<String>,
    #[prost(uint32, optional, tag = "4")]
    pub reference: Option<u32>,
}

/// Discovery datagram wrapper.
#[derive(Clone, PartialEq, Message)]
pub struct DiscoveryOperation {
    #[prost(message, optional, tag = "1")]
    pub search_gateway_request: Option<SearchGatewayRequest>,
    #[prost(message, optional, tag = "2")]
    pub search_gateway_response: Option<SearchGatewayResponse>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SearchGatewayRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct SearchGatewayResponse {
    #[prost(string, optional, tag = "1")]
    pub ipaddress: Option<String>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "3")]
    pub version: Option<u32>,
    #[prost(int32, optional, tag = "4")]
    pub r#type: Option<i32>,
}

// Session

#[derive(Clone, PartialEq, Message)]
pub struct StartSessionRequest {
    #[prost(bool, optional, tag = "1")]
    pub takeover: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct StartSessionConfirm {
    #[prost(string, optional, tag = "1")]
    pub devicename: Option<String>,
    #[prost(bool, optional, tag = "2")]
    pub resumed: Option<bool>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CloseSessionRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct KeepAlive {}

// App registration

#[derive(Clone, PartialEq, Message)]
pub struct RegisterAppRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "2")]
    pub pin: Option<u32>,
    #[prost(string, optional, tag = "3")]
    pub devicename: Option<String>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DeregisterAppRequest {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct ListRegisteredAppsRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct ListRegisteredAppsConfirm {
    #[prost(message, repeated, tag = "1")]
    pub apps: Vec<RegisteredApp>,
}

#[derive(Clone, PartialEq, Message)]
pub struct RegisteredApp {
    #[prost(bytes = "vec", optional, tag = "1")]
    pub uuid: Option<Vec<u8>>,
    #[prost(string, optional, tag = "2")]
    pub devicename: Option<String>,
}

// Gateway info

#[derive(Clone, PartialEq, Message)]
pub struct VersionRequest {}

#[derive(Clone, PartialEq, Message)]
pub struct VersionConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub gateway_version: Option<u32>,
    #[prost(string, optional, tag = "2")]
    pub serial_number: Option<String>,
    #[prost(uint32, optional, tag = "3")]
    pub comfonet_version: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnTimeRequest {
    #[prost(uint32, optional, tag = "1")]
    pub set_time: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnTimeConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub current_time: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnNodeNotification {
    #[prost(uint32, optional, tag = "1")]
    pub node_id: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub product_id: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub zone_id: Option<u32>,
    #[prost(int32, optional, tag = "4")]
    pub mode: Option<i32>,
}

// Remote method invocation

#[derive(Clone, PartialEq, Message)]
pub struct CnRmiRequest {
    #[prost(uint32, optional, tag = "1")]
    pub node_id: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnRmiResponse {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnRmiAsyncConfirm {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnRmiAsyncResponse {
    #[prost(uint32, optional, tag = "1")]
    pub result: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub message: Option<Vec<u8>>,
}

// Process data

#[derive(Clone, PartialEq, Message)]
pub struct CnRpdoRequest {
    #[prost(uint32, optional, tag = "1")]
    pub pdid: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub zone: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub r#type: Option<u32>,
    #[prost(uint32, optional, tag = "4")]
    pub timeout: Option<u32>,
    #[prost(uint32, optional, tag = "5")]
    pub interval: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct CnRpdoNotification {
    #[prost(uint32, optional, tag = "1")]
    pub pdid: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "2")]
    pub data: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "3")]
    pub zone: Option<u32>,
}

// Alarms and push

#[derive(Clone, PartialEq, Message)]
pub struct CnAlarmNotification {
    #[prost(uint32, optional, tag = "1")]
    pub zone: Option<u32>,
    #[prost(uint32, optional, tag = "2")]
    pub product_id: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub product_variant: Option<u32>,
    #[prost(string, optional, tag = "4")]
    pub serial_number: Option<String>,
    #[prost(uint32, optional, tag = "5")]
    pub sw_program_version: Option<u32>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub errors: Option<Vec<u8>>,
    #[prost(uint32, optional, tag = "7")]
    pub error_id: Option<u32>,
    #[prost(uint32, optional, tag = "8")]
    pub node_id: Option<u32>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GatewayNotification {
    #[prost(bytes = "vec", repeated, tag = "1")]
    pub push_uuids: Vec<Vec<u8>>,
    #[prost(message, optional, tag = "2")]
    pub alarm: Option<CnAlarmNotification>,
}
