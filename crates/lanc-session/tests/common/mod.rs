#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use bytes::BytesMut;
use lanc_frame::{decode_frame, encode_frame, DeviceUuid, TransmitHeader, DEFAULT_MAX_FRAME};
use lanc_proto::messages::{
    CnRpdoRequest, DiscoveryOperation, GatewayOperation, SearchGatewayResponse,
    StartSessionConfirm, StartSessionRequest,
};
use lanc_proto::{MessageKind, Payload};
use lanc_session::{SessionEvent, SessionState, Settings};
use prost::Message;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream, UdpSocket};
use tokio::sync::mpsc;

pub const LOCAL: &str = "00000000000000000000000000000005";
pub const DEVICE: &str = "00000000000910138001144fd71e13cb";

pub const TIMEOUT: Duration = Duration::from_secs(5);

pub fn local_uuid() -> DeviceUuid {
    LOCAL.parse().unwrap()
}

pub fn device_uuid() -> DeviceUuid {
    DEVICE.parse().unwrap()
}

/// Settings pointing at a device already known at `addr`.
pub fn settings_for(addr: SocketAddr) -> Settings {
    Settings {
        local_uuid: local_uuid(),
        device_address: Some(addr.ip()),
        device_uuid: Some(device_uuid()),
        port: addr.port(),
        discovery_port: 0,
        keepalive_interval: Duration::from_secs(30),
        resubscribe_delay: Duration::from_millis(10),
        ..Settings::default()
    }
}

pub async fn listen() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    (listener, addr)
}

/// Answer one discovery request on `port` with the test device's identity.
pub async fn udp_responder(port: u16) -> tokio::task::JoinHandle<Vec<u8>> {
    let socket = UdpSocket::bind(("127.0.0.1", port)).await.unwrap();
    tokio::spawn(async move {
        let mut buf = [0u8; 64];
        let (len, from) = socket.recv_from(&mut buf).await.unwrap();
        let reply = DiscoveryOperation {
            search_gateway_request: None,
            search_gateway_response: Some(SearchGatewayResponse {
                ipaddress: Some("127.0.0.1".to_string()),
                uuid: Some(device_uuid().as_bytes().to_vec()),
                version: Some(1),
                r#type: None,
            }),
        }
        .encode_to_vec();
        socket.send_to(&reply, from).await.unwrap();
        buf[..len].to_vec()
    })
}

/// An inbound request as seen by the fake device.
#[derive(Debug)]
pub struct Received {
    pub source: DeviceUuid,
    pub destination: DeviceUuid,
    pub kind: MessageKind,
    pub reference: u32,
    pub command: Vec<u8>,
}

impl Received {
    pub fn takeover(&self) -> bool {
        StartSessionRequest::decode(self.command.as_slice())
            .unwrap()
            .takeover
            .unwrap_or(false)
    }

    pub fn pdid(&self) -> u32 {
        CnRpdoRequest::decode(self.command.as_slice())
            .unwrap()
            .pdid
            .unwrap()
    }
}

/// Device side of one TCP connection.
pub struct DeviceConn {
    stream: TcpStream,
    buf: BytesMut,
    header: TransmitHeader,
}

impl DeviceConn {
    pub async fn accept(listener: &TcpListener) -> Self {
        let (stream, _) = tokio::time::timeout(TIMEOUT, listener.accept())
            .await
            .expect("no connection")
            .unwrap();
        Self {
            stream,
            buf: BytesMut::new(),
            header: TransmitHeader::new(device_uuid(), local_uuid()),
        }
    }

    /// Next request, or `None` if nothing arrives within `wait`.
    pub async fn try_recv(&mut self, wait: Duration) -> Option<Received> {
        self.recv_until(tokio::time::Instant::now() + wait).await
    }

    async fn recv_until(&mut self, deadline: tokio::time::Instant) -> Option<Received> {
        loop {
            if let Some(frame) = decode_frame(&mut self.buf, DEFAULT_MAX_FRAME).unwrap() {
                let op = GatewayOperation::decode(frame.operation.as_ref()).unwrap();
                return Some(Received {
                    source: frame.source,
                    destination: frame.destination,
                    kind: MessageKind::from_wire(op.r#type.unwrap_or_default()),
                    reference: op.reference.unwrap_or_default(),
                    command: frame.command.to_vec(),
                });
            }
            match tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.buf)).await {
                Ok(Ok(0)) | Err(_) => return None,
                Ok(Ok(_)) => {}
                Ok(Err(err)) => panic!("device read failed: {err}"),
            }
        }
    }

    pub async fn recv(&mut self) -> Received {
        self.try_recv(TIMEOUT).await.expect("no request from client")
    }

    /// Next request within `wait` that is not a keepalive.
    pub async fn recv_skipping_keepalive(&mut self, wait: Duration) -> Option<Received> {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            let received = self.recv_until(deadline).await?;
            if received.kind != MessageKind::KeepAlive {
                return Some(received);
            }
        }
    }

    /// Whether the client closes the connection within `wait`. Anything it
    /// sends meanwhile is discarded.
    pub async fn closed_within(&mut self, wait: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + wait;
        loop {
            match tokio::time::timeout_at(deadline, self.stream.read_buf(&mut self.buf)).await {
                Ok(Ok(0)) | Ok(Err(_)) => return true,
                Ok(Ok(_)) => self.buf.clear(),
                Err(_) => return false,
            }
        }
    }

    pub async fn send(&mut self, kind: MessageKind, result: i32, body: Vec<u8>) {
        let op = GatewayOperation {
            r#type: Some(kind.wire_code()),
            result: Some(result),
            result_description: None,
            reference: None,
        }
        .encode_to_vec();
        let mut wire = BytesMut::new();
        encode_frame(&self.header, &op, &body, &mut wire).unwrap();
        self.stream.write_all(&wire).await.unwrap();
    }

    pub async fn confirm_session(&mut self, resumed: bool) {
        let body = StartSessionConfirm {
            devicename: Some("test unit".to_string()),
            resumed: Some(resumed),
        }
        .encode_to_vec();
        self.send(MessageKind::StartSessionConfirm, 0, body).await;
    }

    /// Expect a StartSession request and confirm it.
    pub async fn accept_session(&mut self, resumed: bool) -> Received {
        let request = self.recv().await;
        assert_eq!(request.kind, MessageKind::StartSessionRequest);
        self.confirm_session(resumed).await;
        request
    }
}

pub async fn wait_for_state(session: &lanc_session::Session, target: SessionState) {
    let mut states = session.subscribe_state();
    let reached = tokio::time::timeout(TIMEOUT, async {
        let _ = states.wait_for(|state| *state == target).await;
    })
    .await;
    assert!(
        reached.is_ok(),
        "state {target} not reached, still {}",
        session.state()
    );
}

pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> SessionEvent {
    tokio::time::timeout(TIMEOUT, rx.recv())
        .await
        .expect("no session event")
        .expect("event channel closed")
}

/// Skip events until a message of `kind` arrives and return its payload.
pub async fn next_message(
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    kind: MessageKind,
) -> Payload {
    loop {
        if let SessionEvent::Message(inbound) = next_event(rx).await {
            if inbound.message.kind == kind {
                return inbound.message.payload;
            }
        }
    }
}

/// Drain whatever arrives within `wait`.
pub async fn drain(
    rx: &mut mpsc::UnboundedReceiver<SessionEvent>,
    wait: Duration,
) -> Vec<SessionEvent> {
    let mut seen = Vec::new();
    while let Ok(Some(event)) = tokio::time::timeout(wait, rx.recv()).await {
        seen.push(event);
    }
    seen
}
