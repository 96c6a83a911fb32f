//! Typed payloads of decoded inbound messages.

use bytes::Bytes;

use crate::command::product_name;
use crate::messages;
use crate::sensor::{decode_sensor_value, SensorValue};

/// Decoded command body, one variant per message kind with a body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Kinds without a body, non-OK results and undecodable bodies.
    Empty,
    SessionStarted(SessionStarted),
    /// The device closed this session because another client took over.
    SessionPreempted,
    RegisteredApps(Vec<RegisteredApp>),
    Version(GatewayVersion),
    Time { current_time: u32 },
    Node(NodeInfo),
    RmiResponse { result: u32, message: Bytes },
    RmiAsyncConfirm { result: u32 },
    RmiAsyncResponse { result: u32, message: Bytes },
    Sensor(SensorReading),
    Alarm(AlarmInfo),
    GatewayNotification {
        push_uuids: Vec<Bytes>,
        alarm: Option<AlarmInfo>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStarted {
    pub device_name: Option<String>,
    pub resumed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredApp {
    /// Usually 16 bytes; kept raw since the device does not guarantee it.
    pub uuid: Bytes,
    pub device_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayVersion {
    pub gateway_version: u32,
    pub serial_number: String,
    pub comfonet_version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub node_id: u32,
    pub product_id: u32,
    pub zone_id: u32,
    pub mode: i32,
}

impl NodeInfo {
    pub fn product_name(&self) -> Option<&'static str> {
        product_name(self.product_id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorReading {
    pub pdid: u32,
    pub zone: Option<u32>,
    pub data: Bytes,
    pub value: SensorValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmInfo {
    pub zone: u32,
    pub product_id: u32,
    pub product_variant: u32,
    pub serial_number: String,
    pub sw_program_version: u32,
    pub errors: Bytes,
    pub error_id: u32,
    pub node_id: u32,
}

fn to_bytes(v: Option<Vec<u8>>) -> Bytes {
    v.map(Bytes::from).unwrap_or_default()
}

impl From<messages::StartSessionConfirm> for SessionStarted {
    fn from(msg: messages::StartSessionConfirm) -> Self {
        Self {
            device_name: msg.devicename,
            resumed: msg.resumed.unwrap_or(false),
        }
    }
}

impl From<messages::RegisteredApp> for RegisteredApp {
    fn from(msg: messages::RegisteredApp) -> Self {
        Self {
            uuid: to_bytes(msg.uuid),
            device_name: msg.devicename.unwrap_or_default(),
        }
    }
}

impl From<messages::VersionConfirm> for GatewayVersion {
    fn from(msg: messages::VersionConfirm) -> Self {
        Self {
            gateway_version: msg.gateway_version.unwrap_or_default(),
            serial_number: msg.serial_number.unwrap_or_default(),
            comfonet_version: msg.comfonet_version.unwrap_or_default(),
        }
    }
}

impl From<messages::CnNodeNotification> for NodeInfo {
    fn from(msg: messages::CnNodeNotification) -> Self {
        Self {
            node_id: msg.node_id.unwrap_or_default(),
            product_id: msg.product_id.unwrap_or_default(),
            zone_id: msg.zone_id.unwrap_or_default(),
            mode: msg.mode.unwrap_or_default(),
        }
    }
}

impl From<messages::CnRpdoNotification> for SensorReading {
    fn from(msg: messages::CnRpdoNotification) -> Self {
        let pdid = msg.pdid.unwrap_or_default();
        let data = to_bytes(msg.data);
        Self {
            pdid,
            zone: msg.zone,
            value: decode_sensor_value(pdid, &data),
            data,
        }
    }
}

impl From<messages::CnAlarmNotification> for AlarmInfo {
    fn from(msg: messages::CnAlarmNotification) -> Self {
        Self {
            zone: msg.zone.unwrap_or_default(),
            product_id: msg.product_id.unwrap_or_default(),
            product_variant: msg.product_variant.unwrap_or_default(),
            serial_number: msg.serial_number.unwrap_or_default(),
            sw_program_version: msg.sw_program_version.unwrap_or_default(),
            errors: to_bytes(msg.errors),
            error_id: msg.error_id.unwrap_or_default(),
            node_id: msg.node_id.unwrap_or_default(),
        }
    }
}

impl From<messages::GatewayNotification> for Payload {
    fn from(msg: messages::GatewayNotification) -> Self {
        Self::GatewayNotification {
            push_uuids: msg.push_uuids.into_iter().map(Bytes::from).collect(),
            alarm: msg.alarm.map(AlarmInfo::from),
        }
    }
}
