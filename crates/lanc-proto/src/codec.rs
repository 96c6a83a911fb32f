//! Request encoding and inbound message decoding.

use std::net::IpAddr;

use bytes::Bytes;
use lanc_frame::DeviceUuid;
use prost::Message;

use crate::error::{ProtoError, Result};
use crate::kind::MessageKind;
use crate::messages;
use crate::payload::{Payload, SessionStarted};
use crate::result::ResultCode;
use crate::sensor::lookup_sensor;

/// Fixed discovery request: a `DiscoveryOperation` with an empty search request.
pub const DISCOVERY_REQUEST: [u8; 2] = [0x0a, 0x00];

/// A logical request the session can issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    StartSession { takeover: bool },
    CloseSession,
    ListRegisteredApps,
    RegisterApp {
        uuid: DeviceUuid,
        pin: u32,
        device_name: String,
    },
    DeregisterApp { uuid: DeviceUuid },
    RegisterSensor { pdid: u32 },
    Rmi { node_id: u32, message: Bytes },
    Version,
    Time,
    KeepAlive,
}

impl Request {
    /// Operation type written into the envelope.
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::StartSession { .. } => MessageKind::StartSessionRequest,
            Self::CloseSession => MessageKind::CloseSessionRequest,
            Self::ListRegisteredApps => MessageKind::ListRegisteredAppsRequest,
            Self::RegisterApp { .. } => MessageKind::RegisterAppRequest,
            Self::DeregisterApp { .. } => MessageKind::DeregisterAppRequest,
            Self::RegisterSensor { .. } => MessageKind::CnRpdoRequest,
            Self::Rmi { .. } => MessageKind::CnRmiRequest,
            Self::Version => MessageKind::VersionRequest,
            Self::Time => MessageKind::CnTimeRequest,
            Self::KeepAlive => MessageKind::KeepAlive,
        }
    }

    /// Confirmation kind the device answers with, if any.
    pub fn expected_confirm(&self) -> Option<MessageKind> {
        match self {
            Self::StartSession { .. } => Some(MessageKind::StartSessionConfirm),
            Self::CloseSession => Some(MessageKind::CloseSessionConfirm),
            Self::ListRegisteredApps => Some(MessageKind::ListRegisteredAppsConfirm),
            Self::RegisterApp { .. } => Some(MessageKind::RegisterAppConfirm),
            Self::DeregisterApp { .. } => Some(MessageKind::DeregisterAppConfirm),
            Self::RegisterSensor { .. } => Some(MessageKind::CnRpdoConfirm),
            Self::Rmi { .. } => Some(MessageKind::CnRmiResponse),
            Self::Version => Some(MessageKind::VersionConfirm),
            Self::Time => Some(MessageKind::CnTimeConfirm),
            Self::KeepAlive => None,
        }
    }
}

/// Envelope and body ready to be framed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedMessage {
    pub reference: u32,
    pub kind: MessageKind,
    pub operation: Bytes,
    pub command: Bytes,
}

/// A decoded inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedMessage {
    pub reference: Option<u32>,
    pub kind: MessageKind,
    pub result: ResultCode,
    pub result_description: Option<String>,
    pub payload: Payload,
    /// Set when the envelope or body could not be decoded.
    pub error: Option<String>,
}

impl DecodedMessage {
    fn malformed(error: String) -> Self {
        Self {
            reference: None,
            kind: MessageKind::NoOperation,
            result: ResultCode::Unknown,
            result_description: None,
            payload: Payload::Empty,
            error: Some(error),
        }
    }

    /// OK result and a body that decoded cleanly.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok() && self.error.is_none()
    }

    /// Device-initiated close: another client took over the session.
    pub fn is_preemption(&self) -> bool {
        self.kind == MessageKind::CloseSessionRequest
    }
}

/// Reply to a discovery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryResponse {
    pub address: IpAddr,
    pub uuid: DeviceUuid,
    pub version: Option<u32>,
}

/// Encode/decode seam between the session and the wire schema.
pub trait MessageCodec: Send + Sync + 'static {
    /// Encode `request` with the given envelope reference.
    fn encode(&self, reference: u32, request: &Request) -> Result<EncodedMessage>;

    /// Decode an inbound envelope and body. Never fails; decode problems are
    /// reported through [`DecodedMessage::error`].
    fn decode(&self, operation: &[u8], command: &[u8]) -> DecodedMessage;

    /// Datagram sent to find devices.
    fn discovery_request(&self) -> Bytes {
        Bytes::from_static(&DISCOVERY_REQUEST)
    }

    /// Decode a discovery reply datagram.
    fn decode_discovery(&self, datagram: &[u8]) -> Result<DiscoveryResponse>;
}

/// [`MessageCodec`] for the protobuf gateway schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtobufCodec;

impl ProtobufCodec {
    pub fn new() -> Self {
        Self
    }

    fn encode_body(request: &Request) -> Result<Vec<u8>> {
        let body = match request {
            Request::StartSession { takeover } => messages::StartSessionRequest {
                takeover: Some(*takeover),
            }
            .encode_to_vec(),
            Request::CloseSession => messages::CloseSessionRequest {}.encode_to_vec(),
            Request::ListRegisteredApps => messages::ListRegisteredAppsRequest {}.encode_to_vec(),
            Request::RegisterApp {
                uuid,
                pin,
                device_name,
            } => messages::RegisterAppRequest {
                uuid: Some(uuid.as_bytes().to_vec()),
                pin: Some(*pin),
                devicename: Some(device_name.clone()),
            }
            .encode_to_vec(),
            Request::DeregisterApp { uuid } => messages::DeregisterAppRequest {
                uuid: Some(uuid.as_bytes().to_vec()),
            }
            .encode_to_vec(),
            Request::RegisterSensor { pdid } => {
                let info = lookup_sensor(*pdid).ok_or(ProtoError::UnknownSensor(*pdid))?;
                messages::CnRpdoRequest {
                    pdid: Some(*pdid),
                    r#type: Some(info.kind.code()),
                    ..Default::default()
                }
                .encode_to_vec()
            }
            Request::Rmi { node_id, message } => messages::CnRmiRequest {
                node_id: Some(*node_id),
                message: Some(message.to_vec()),
            }
            .encode_to_vec(),
            Request::Version => messages::VersionRequest {}.encode_to_vec(),
            Request::Time => messages::CnTimeRequest::default().encode_to_vec(),
            Request::KeepAlive => messages::KeepAlive {}.encode_to_vec(),
        };
        Ok(body)
    }

    fn decode_body(kind: MessageKind, command: &[u8]) -> Result<Payload> {
        let payload = match kind {
            MessageKind::StartSessionConfirm => Payload::SessionStarted(SessionStarted::from(
                messages::StartSessionConfirm::decode(command)?,
            )),
            MessageKind::CloseSessionRequest => Payload::SessionPreempted,
            MessageKind::ListRegisteredAppsConfirm => Payload::RegisteredApps(
                messages::ListRegisteredAppsConfirm::decode(command)?
                    .apps
                    .into_iter()
                    .map(Into::into)
                    .collect(),
            ),
            MessageKind::VersionConfirm => {
                Payload::Version(messages::VersionConfirm::decode(command)?.into())
            }
            MessageKind::CnTimeConfirm => Payload::Time {
                current_time: messages::CnTimeConfirm::decode(command)?
                    .current_time
                    .unwrap_or_default(),
            },
            MessageKind::CnNodeNotification => {
                Payload::Node(messages::CnNodeNotification::decode(command)?.into())
            }
            MessageKind::CnRmiResponse => {
                let msg = messages::CnRmiResponse::decode(command)?;
                Payload::RmiResponse {
                    result: msg.result.unwrap_or_default(),
                    message: msg.message.map(Bytes::from).unwrap_or_default(),
                }
            }
            MessageKind::CnRmiAsyncConfirm => Payload::RmiAsyncConfirm {
                result: messages::CnRmiAsyncConfirm::decode(command)?
                    .result
                    .unwrap_or_default(),
            },
            MessageKind::CnRmiAsyncResponse => {
                let msg = messages::CnRmiAsyncResponse::decode(command)?;
                Payload::RmiAsyncResponse {
                    result: msg.result.unwrap_or_default(),
                    message: msg.message.map(Bytes::from).unwrap_or_default(),
                }
            }
            MessageKind::CnRpdoNotification => {
                Payload::Sensor(messages::CnRpdoNotification::decode(command)?.into())
            }
            MessageKind::CnAlarmNotification => {
                Payload::Alarm(messages::CnAlarmNotification::decode(command)?.into())
            }
            MessageKind::GatewayNotification => {
                messages::GatewayNotification::decode(command)?.into()
            }
            _ => Payload::Empty,
        };
        Ok(payload)
    }
}

impl MessageCodec for ProtobufCodec {
    fn encode(&self, reference: u32, request: &Request) -> Result<EncodedMessage> {
        let kind = request.kind();
        let operation = messages::GatewayOperation {
            r#type: Some(kind.wire_code()),
            reference: Some(reference),
            ..Default::default()
        }
        .encode_to_vec();
        let command = Self::encode_body(request)?;
        Ok(EncodedMessage {
            reference,
            kind,
            operation: Bytes::from(operation),
            command: Bytes::from(command),
        })
    }

    fn decode(&self, operation: &[u8], command: &[u8]) -> DecodedMessage {
        let envelope = match messages::GatewayOperation::decode(operation) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, operation = %hex::encode(operation), "undecodable envelope");
                return DecodedMessage::malformed(err.to_string());
            }
        };

        let kind = MessageKind::from_wire(envelope.r#type.unwrap_or_default());
        let result = ResultCode::from_code(envelope.result.unwrap_or_default());
        let mut decoded = DecodedMessage {
            reference: envelope.reference,
            kind,
            result,
            result_description: envelope.result_description,
            payload: Payload::Empty,
            error: None,
        };

        if kind == MessageKind::CloseSessionRequest {
            decoded.payload = Payload::SessionPreempted;
        } else if result.is_ok() {
            match Self::decode_body(kind, command) {
                Ok(payload) => decoded.payload = payload,
                Err(err) => {
                    tracing::warn!(%kind, error = %err, "undecodable command body");
                    decoded.error = Some(err.to_string());
                }
            }
        }
        decoded
    }

    fn decode_discovery(&self, datagram: &[u8]) -> Result<DiscoveryResponse> {
        let response = messages::DiscoveryOperation::decode(datagram)?
            .search_gateway_response
            .ok_or_else(|| ProtoError::InvalidDiscovery("missing searchGatewayResponse".into()))?;
        let address = response
            .ipaddress
            .as_deref()
            .ok_or_else(|| ProtoError::InvalidDiscovery("missing ipaddress".into()))?
            .trim()
            .parse::<IpAddr>()
            .map_err(|err| ProtoError::InvalidDiscovery(format!("bad ipaddress: {err}")))?;
        let uuid = response
            .uuid
            .as_deref()
            .ok_or_else(|| ProtoError::InvalidDiscovery("missing uuid".into()))
            .and_then(|raw| DeviceUuid::from_slice(raw).map_err(ProtoError::from))?;
        if uuid.is_nil() {
            return Err(ProtoError::InvalidDiscovery("nil uuid".into()));
        }
        Ok(DiscoveryResponse {
            address,
            uuid,
            version: response.version,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::RegisteredApp;
    use crate::sensor::SensorValue;

    fn reply(kind: MessageKind, result: i32, body: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
        let op = messages::GatewayOperation {
            r#type: Some(kind.wire_code()),
            result: Some(result),
            result_description: None,
            reference: Some(9),
        };
        (op.encode_to_vec(), body)
    }

    #[test]
    fn encode_sets_type_and_reference() {
        let codec = ProtobufCodec::new();
        let msg = codec
            .encode(42, &Request::StartSession { takeover: true })
            .unwrap();
        let op = messages::GatewayOperation::decode(msg.operation.as_ref()).unwrap();
        assert_eq!(op.r#type, Some(3));
        assert_eq!(op.reference, Some(42));
        assert_eq!(op.result, None);
        let body = messages::StartSessionRequest::decode(msg.command.as_ref()).unwrap();
        assert_eq!(body.takeover, Some(true));
    }

    #[test]
    fn register_sensor_uses_table_kind() {
        let codec = ProtobufCodec::new();
        let msg = codec.encode(1, &Request::RegisterSensor { pdid: 276 }).unwrap();
        let body = messages::CnRpdoRequest::decode(msg.command.as_ref()).unwrap();
        assert_eq!(body.pdid, Some(276));
        assert_eq!(body.r#type, Some(6));
        assert_eq!(body.zone, None);
    }

    #[test]
    fn register_unknown_sensor_fails() {
        let err = ProtobufCodec
            .encode(1, &Request::RegisterSensor { pdid: 1 })
            .unwrap_err();
        assert!(matches!(err, ProtoError::UnknownSensor(1)));
    }

    #[test]
    fn register_app_carries_uuid_bytes() {
        let uuid: DeviceUuid = "00000000000000000000000000000005".parse().unwrap();
        let msg = ProtobufCodec
            .encode(
                3,
                &Request::RegisterApp {
                    uuid,
                    pin: 4321,
                    device_name: "lanc".into(),
                },
            )
            .unwrap();
        let body = messages::RegisterAppRequest::decode(msg.command.as_ref()).unwrap();
        assert_eq!(body.uuid.as_deref(), Some(&uuid.as_bytes()[..]));
        assert_eq!(body.pin, Some(4321));
        assert_eq!(body.devicename.as_deref(), Some("lanc"));
    }

    #[test]
    fn expected_confirmations() {
        assert_eq!(
            Request::StartSession { takeover: false }.expected_confirm(),
            Some(MessageKind::StartSessionConfirm)
        );
        assert_eq!(
            Request::RegisterSensor { pdid: 227 }.expected_confirm(),
            Some(MessageKind::CnRpdoConfirm)
        );
        assert_eq!(Request::KeepAlive.expected_confirm(), None);
    }

    #[test]
    fn decode_start_session_confirm() {
        let body = messages::StartSessionConfirm {
            devicename: Some("unit".into()),
            resumed: Some(false),
        }
        .encode_to_vec();
        let (op, cmd) = reply(MessageKind::StartSessionConfirm, 0, body);
        let decoded = ProtobufCodec.decode(&op, &cmd);
        assert!(decoded.is_ok());
        assert_eq!(decoded.kind, MessageKind::StartSessionConfirm);
        assert_eq!(decoded.reference, Some(9));
        assert_eq!(
            decoded.payload,
            Payload::SessionStarted(SessionStarted {
                device_name: Some("unit".into()),
                resumed: false,
            })
        );
    }

    #[test]
    fn decode_sensor_notification_value() {
        let body = messages::CnRpdoNotification {
            pdid: Some(227),
            data: Some(vec![0x64]),
            zone: Some(1),
        }
        .encode_to_vec();
        let (op, cmd) = reply(MessageKind::CnRpdoNotification, 0, body);
        let decoded = ProtobufCodec.decode(&op, &cmd);
        match decoded.payload {
            Payload::Sensor(reading) => {
                assert_eq!(reading.pdid, 227);
                assert_eq!(reading.value, SensorValue::Integer(100));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn decode_registered_apps() {
        let body = messages::ListRegisteredAppsConfirm {
            apps: vec![messages::RegisteredApp {
                uuid: Some(vec![5; 16]),
                devicename: Some("phone".into()),
            }],
        }
        .encode_to_vec();
        let (op, cmd) = reply(MessageKind::ListRegisteredAppsConfirm, 0, body);
        let decoded = ProtobufCodec.decode(&op, &cmd);
        assert_eq!(
            decoded.payload,
            Payload::RegisteredApps(vec![RegisteredApp {
                uuid: Bytes::from(vec![5; 16]),
                device_name: "phone".into(),
            }])
        );
    }

    #[test]
    fn non_ok_result_has_no_payload() {
        let (op, cmd) = reply(MessageKind::ListRegisteredAppsConfirm, 5, vec![0xff, 0xff]);
        let decoded = ProtobufCodec.decode(&op, &cmd);
        assert_eq!(decoded.result, ResultCode::NotAllowed);
        assert_eq!(decoded.payload, Payload::Empty);
        assert!(decoded.error.is_none());
        assert!(!decoded.is_ok());
    }

    #[test]
    fn preemption_is_recognized() {
        let (op, cmd) = reply(MessageKind::CloseSessionRequest, 0, Vec::new());
        let decoded = ProtobufCodec.decode(&op, &cmd);
        assert!(decoded.is_preemption());
        assert_eq!(decoded.payload, Payload::SessionPreempted);
    }

    #[test]
    fn malformed_envelope_is_reported_not_raised() {
        let decoded = ProtobufCodec.decode(&[0xff, 0xff, 0xff], &[]);
        assert!(decoded.error.is_some());
        assert!(!decoded.is_ok());
    }

    #[test]
    fn malformed_body_is_reported() {
        let (op, _) = reply(MessageKind::VersionConfirm, 0, Vec::new());
        let decoded = ProtobufCodec.decode(&op, &[0x0a, 0x05, 0x01]);
        assert_eq!(decoded.kind, MessageKind::VersionConfirm);
        assert!(decoded.error.is_some());
    }

    #[test]
    fn discovery_request_is_an_empty_search() {
        let search = messages::DiscoveryOperation {
            search_gateway_request: Some(messages::SearchGatewayRequest {}),
            search_gateway_response: None,
        }
        .encode_to_vec();
        assert_eq!(search, DISCOVERY_REQUEST);
        assert_eq!(ProtobufCodec.discovery_request().as_ref(), &DISCOVERY_REQUEST);
    }

    #[test]
    fn decode_discovery_reply() {
        let uuid: DeviceUuid = "00000000000910138001144fd71e13cb".parse().unwrap();
        let datagram = messages::DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(messages::SearchGatewayResponse {
                ipaddress: Some("10.0.0.14".into()),
                uuid: Some(uuid.as_bytes().to_vec()),
                version: Some(1),
                r#type: None,
            }),
        }
        .encode_to_vec();
        let response = ProtobufCodec.decode_discovery(&datagram).unwrap();
        assert_eq!(response.address, "10.0.0.14".parse::<IpAddr>().unwrap());
        assert_eq!(response.uuid, uuid);
        assert_eq!(response.version, Some(1));
    }

    #[test]
    fn discovery_reply_without_uuid_fails() {
        let datagram = messages::DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(messages::SearchGatewayResponse {
                ipaddress: Some("10.0.0.14".into()),
                ..Default::default()
            }),
        }
        .encode_to_vec();
        let err = ProtobufCodec.decode_discovery(&datagram).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidDiscovery(_)));
    }

    #[test]
    fn discovery_reply_with_nil_uuid_fails() {
        let datagram = messages::DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(messages::SearchGatewayResponse {
                ipaddress: Some("10.0.0.14".into()),
                uuid: Some(DeviceUuid::NIL.as_bytes().to_vec()),
                version: Some(1),
                r#type: None,
            }),
        }
        .encode_to_vec();
        let err = ProtobufCodec.decode_discovery(&datagram).unwrap_err();
        assert!(matches!(err, ProtoError::InvalidDiscovery(ref why) if why == "nil uuid"));
    }
}
