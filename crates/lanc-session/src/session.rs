//! The session state machine.
//!
//! ```text
//! NotDiscovered --discover--> Discovered --start_session--> SessionRequested
//! SessionRequested --confirm OK--> SessionActive (keepalive armed)
//! SessionRequested --confirm !OK--> Discovered (reconnect armed)
//! SessionActive --preemption notice or OTHER_SESSION result--> OtherSessionLost
//! SessionActive --connection lost--> Discovered (reconnect armed)
//! any --close_session--> Closed (timers and subscriptions cleared)
//! ```
//!
//! All inbound frames are handled by one pump task, in arrival order. The
//! keepalive and reconnect timers are tasks of their own; both hold only a
//! weak reference so dropping the last [`Session`] handle stops them.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use lanc_frame::TransmitHeader;
use lanc_proto::{
    lookup_command, lookup_sensor, MessageCodec, MessageKind, Payload, ProtoError,
    ProtobufCodec, Request, ResultCode,
};
use lanc_transport::{
    discover, ConnectionState, DiscoveredDevice, FrameTransport, ReceivedFrame, TransportEvent,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{Result, SessionError};
use crate::event::{DisconnectReason, InboundMessage, SessionEvent};
use crate::pending::PendingResponses;
use crate::state::SessionState;
use crate::subscriptions::Subscriptions;

#[derive(Default)]
struct Core {
    /// The caller wants a session; drives automatic reconnection.
    reconnect: bool,
    resumed: bool,
    /// A reconnect owns the session start; it arms keepalive after replay.
    defer_keepalive: bool,
    pending: PendingResponses,
    subscriptions: Subscriptions,
    keepalive_task: Option<JoinHandle<()>>,
    reconnect_task: Option<JoinHandle<()>>,
    pump_task: Option<JoinHandle<()>>,
}

impl Core {
    fn clear_timers(&mut self) {
        if let Some(task) = self.keepalive_task.take() {
            task.abort();
        }
        if let Some(task) = self.reconnect_task.take() {
            task.abort();
        }
    }
}

struct Inner {
    settings: Mutex<Settings>,
    codec: Arc<dyn MessageCodec>,
    next_reference: AtomicU32,
    core: Mutex<Core>,
    transport: Mutex<Option<FrameTransport>>,
    state: watch::Sender<SessionState>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

/// Client for one device session.
///
/// Cheap to clone; clones share the session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a session using the protobuf codec.
    pub fn new(settings: Settings) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        Self::with_codec(settings, Arc::new(ProtobufCodec::new()))
    }

    /// Create a session with a specific codec.
    ///
    /// Starts in `Discovered` when `settings` already carry the device
    /// address and UUID.
    pub fn with_codec(
        settings: Settings,
        codec: Arc<dyn MessageCodec>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let initial = if settings.device().is_some() {
            SessionState::Discovered
        } else {
            SessionState::NotDiscovered
        };
        let (events, rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(initial);
        let inner = Inner {
            settings: Mutex::new(settings),
            codec,
            next_reference: AtomicU32::new(1),
            core: Mutex::new(Core::default()),
            transport: Mutex::new(None),
            state,
            events,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    pub fn state(&self) -> SessionState {
        *self.inner.state.borrow()
    }

    /// Watch session state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Whether the device reported the last session as resumed.
    pub fn is_resumed(&self) -> bool {
        self.inner.core().resumed
    }

    /// Whether the session will be re-established after a loss.
    pub fn wants_reconnect(&self) -> bool {
        self.inner.core().reconnect
    }

    /// Sensor ids that will be replayed after a reconnect.
    pub fn subscriptions(&self) -> Vec<u32> {
        self.inner.core().subscriptions.to_vec()
    }

    pub fn pending_count(&self) -> usize {
        self.inner.core().pending.len()
    }

    pub fn settings(&self) -> Settings {
        self.inner.settings().clone()
    }

    /// State of the TCP connection, once a device is known.
    pub fn connection_state(&self) -> Option<ConnectionState> {
        self.inner.transport_slot().as_ref().map(FrameTransport::state)
    }

    /// The transmit header, once a device is known.
    pub fn header(&self) -> Option<TransmitHeader> {
        self.inner
            .transport_slot()
            .as_ref()
            .map(|transport| transport.header().clone())
    }

    /// Resolve the device's address and UUID over UDP.
    ///
    /// Re-running discovery is allowed as long as the same device answers.
    pub async fn discover(&self) -> Result<DiscoveredDevice> {
        let config = self.inner.settings().discovery_config();
        let found = discover(self.inner.codec.as_ref(), &config).await?;

        if let Some(transport) = self.inner.transport_slot().as_ref() {
            let expected = transport.header().device();
            if expected != found.uuid {
                return Err(SessionError::DeviceChanged {
                    expected,
                    found: found.uuid,
                });
            }
        }

        {
            let mut settings = self.inner.settings();
            settings.device_address = Some(found.address);
            settings.device_uuid = Some(found.uuid);
        }
        self.inner.ensure_transport()?;
        if self.state() == SessionState::NotDiscovered {
            self.inner.set_state(SessionState::Discovered);
        }
        Ok(found)
    }

    /// Ask the device for a session. `force` takes it over from another client.
    ///
    /// Resolves once the request is written; the outcome arrives as a
    /// `StartSessionConfirm` message and a state change.
    pub async fn start_session(&self, force: bool) -> Result<u32> {
        self.inner.core().reconnect = true;
        self.inner.start_session(force).await
    }

    /// Close the session. Safe to call in any state; a no-op once closed.
    pub async fn close_session(&self) -> Result<()> {
        let previous = self.state();
        {
            let mut core = self.inner.core();
            core.clear_timers();
            core.subscriptions.clear();
            core.reconnect = false;
            core.resumed = false;
        }
        if matches!(previous, SessionState::Closed | SessionState::NotDiscovered) {
            return Ok(());
        }
        self.inner.set_state(SessionState::Closed);

        let held = matches!(
            previous,
            SessionState::SessionActive | SessionState::SessionRequested
        );
        let connected = self
            .inner
            .transport_slot()
            .as_ref()
            .is_some_and(FrameTransport::is_connected);
        if held && connected {
            self.inner.issue(Request::CloseSession).await?;
        }
        info!("session closed");
        Ok(())
    }

    /// Close the session and the connection, and stop all background tasks.
    pub async fn shutdown(&self) {
        if let Err(err) = self.close_session().await {
            debug!(error = %err, "close during shutdown failed");
        }
        let transport = self.inner.transport_slot().clone();
        if let Some(transport) = transport {
            transport.close().await;
        }
        if let Some(task) = self.inner.core().pump_task.take() {
            task.abort();
        }
    }

    pub async fn keep_alive(&self) -> Result<u32> {
        self.inner.issue(Request::KeepAlive).await
    }

    pub async fn list_registered_apps(&self) -> Result<u32> {
        self.inner.issue(Request::ListRegisteredApps).await
    }

    /// Register this app with the configured UUID, pin and name.
    pub async fn register_app(&self) -> Result<u32> {
        let request = {
            let settings = self.inner.settings();
            Request::RegisterApp {
                uuid: settings.local_uuid,
                pin: settings.pin,
                device_name: settings.device_name.clone(),
            }
        };
        self.inner.issue(request).await
    }

    pub async fn deregister_app(&self, uuid: lanc_frame::DeviceUuid) -> Result<u32> {
        self.inner.issue(Request::DeregisterApp { uuid }).await
    }

    /// Subscribe to a sensor. The id is remembered and replayed after every
    /// reconnect until the session is closed.
    pub async fn register_sensor(&self, pdid: u32) -> Result<u32> {
        if lookup_sensor(pdid).is_none() {
            return Err(ProtoError::UnknownSensor(pdid).into());
        }
        if self.inner.core().subscriptions.insert(pdid) {
            debug!(pdid, "sensor subscribed");
        }
        self.inner.issue(Request::RegisterSensor { pdid }).await
    }

    /// Send a named command (e.g. `FAN_MODE_HIGH`) to a node.
    pub async fn send_command(&self, node_id: u32, name: &str) -> Result<u32> {
        let message = lookup_command(name)?;
        self.inner.issue(Request::Rmi { node_id, message }).await
    }

    pub async fn version_request(&self) -> Result<u32> {
        self.inner.issue(Request::Version).await
    }

    pub async fn time_request(&self) -> Result<u32> {
        self.inner.issue(Request::Time).await
    }
}

impl Inner {
    fn core(&self) -> MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn settings(&self) -> MutexGuard<'_, Settings> {
        self.settings.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transport_slot(&self) -> MutexGuard<'_, Option<FrameTransport>> {
        self.transport.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    fn set_state(&self, next: SessionState) {
        let previous = self.state.send_replace(next);
        if previous != next {
            debug!(from = %previous, to = %next, "session state");
        }
    }

    fn emit(&self, event: SessionEvent) {
        // Nobody listening is fine.
        let _ = self.events.send(event);
    }

    fn keepalive_interval(&self) -> Duration {
        self.settings().keepalive_interval
    }

    /// The transport, created on first use once the device is known.
    fn ensure_transport(self: &Arc<Self>) -> Result<FrameTransport> {
        let mut slot = self.transport_slot();
        if let Some(transport) = slot.as_ref() {
            return Ok(transport.clone());
        }

        let (addr, header, config) = {
            let settings = self.settings();
            let (addr, device) = settings.device().ok_or(SessionError::NotDiscovered)?;
            (
                addr,
                TransmitHeader::new(settings.local_uuid, device),
                settings.transport_config(),
            )
        };
        let (transport, events) = FrameTransport::new(addr, header, config);
        *slot = Some(transport.clone());
        drop(slot);

        let pump = tokio::spawn(pump(Arc::downgrade(self), events));
        if let Some(previous) = self.core().pump_task.replace(pump) {
            previous.abort();
        }
        debug!(%addr, "transport ready");
        Ok(transport)
    }

    fn next_reference(&self) -> u32 {
        self.next_reference.fetch_add(1, Ordering::Relaxed)
    }

    /// Encode, connect if needed, record the expected reply and send.
    async fn issue(self: &Arc<Self>, request: Request) -> Result<u32> {
        let transport = self.ensure_transport()?;
        let reference = self.next_reference();
        let encoded = self.codec.encode(reference, &request)?;

        transport.connect().await?;
        if let Some(expected) = request.expected_confirm() {
            self.core().pending.push(expected, reference);
        }
        transport.send(encoded.operation, encoded.command).await?;
        debug!(reference, kind = %encoded.kind, "request sent");
        Ok(reference)
    }

    async fn start_session(self: &Arc<Self>, force: bool) -> Result<u32> {
        self.ensure_transport()?;
        self.set_state(SessionState::SessionRequested);
        match self.issue(Request::StartSession { takeover: force }).await {
            Ok(reference) => {
                info!(force, "session requested");
                Ok(reference)
            }
            Err(err) => {
                warn!(error = %err, "start session failed");
                if self.state() == SessionState::SessionRequested {
                    self.set_state(SessionState::Discovered);
                }
                self.arm_reconnect();
                Err(err)
            }
        }
    }

    fn handle_frame(self: &Arc<Self>, received: ReceivedFrame) {
        let ReceivedFrame { frame, received_at } = received;
        let message = self.codec.decode(&frame.operation, &frame.command);
        if let Some(error) = &message.error {
            warn!(kind = %message.kind, error, "frame could not be decoded");
        }
        debug!(
            reference = ?message.reference,
            kind = %message.kind,
            result = %message.result,
            "frame received"
        );

        if self.core().pending.resolve(message.kind).is_none() {
            debug!(kind = %message.kind, "no request waiting for this kind");
        }

        if message.result == ResultCode::OtherSession
            && message.kind != MessageKind::StartSessionConfirm
        {
            self.on_preempted();
        }

        match message.kind {
            MessageKind::StartSessionConfirm => {
                let resumed = match &message.payload {
                    Payload::SessionStarted(started) => started.resumed,
                    _ => false,
                };
                self.on_session_confirm(message.is_ok(), resumed, &message.result.to_string());
            }
            MessageKind::CloseSessionRequest => self.on_preempted(),
            _ => {}
        }

        self.emit(SessionEvent::Message(InboundMessage {
            message,
            received_at,
        }));
    }

    fn on_session_confirm(self: &Arc<Self>, ok: bool, resumed: bool, result: &str) {
        if self.state() != SessionState::SessionRequested {
            debug!(state = %self.state(), "unsolicited session confirmation");
            return;
        }
        if ok {
            self.core().resumed = resumed;
            self.set_state(SessionState::SessionActive);
            info!(resumed, "session active");
            if !self.core().defer_keepalive {
                self.arm_keepalive();
            }
        } else {
            warn!(result, "session refused");
            self.set_state(SessionState::Discovered);
            self.arm_reconnect();
        }
    }

    fn on_preempted(self: &Arc<Self>) {
        if self.state() != SessionState::SessionActive {
            return;
        }
        warn!("session taken over by another client");
        {
            let mut core = self.core();
            if let Some(task) = core.keepalive_task.take() {
                task.abort();
            }
            core.pending.clear();
        }
        self.set_state(SessionState::OtherSessionLost);
        self.emit(SessionEvent::Disconnected(DisconnectReason::OtherSession));
        self.arm_reconnect();
    }

    fn on_connection_lost(self: &Arc<Self>) {
        match self.state() {
            SessionState::SessionActive | SessionState::SessionRequested => {
                warn!("connection to device lost");
                {
                    let mut core = self.core();
                    if let Some(task) = core.keepalive_task.take() {
                        task.abort();
                    }
                    core.pending.clear();
                }
                self.set_state(SessionState::Discovered);
                self.emit(SessionEvent::Disconnected(DisconnectReason::ConnectionLost));
                self.arm_reconnect();
            }
            state => debug!(%state, "connection closed"),
        }
    }

    fn arm_keepalive(self: &Arc<Self>) {
        let interval = self.keepalive_interval();
        let weak = Arc::downgrade(self);
        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                let Some(inner) = weak.upgrade() else { return };
                if !inner.keepalive_tick().await {
                    return;
                }
            }
        });
        if let Some(previous) = self.core().keepalive_task.replace(task) {
            previous.abort();
        }
    }

    /// One keepalive round. Returns false when the timer should stop.
    async fn keepalive_tick(self: &Arc<Self>) -> bool {
        let connected = self
            .transport_slot()
            .as_ref()
            .is_some_and(FrameTransport::is_connected);
        let state = self.state();
        if state != SessionState::SessionActive || !connected {
            debug!(%state, connected, "keepalive skipped");
            if state == SessionState::SessionActive && self.core().reconnect {
                // reconnect() does nothing while Active.
                self.on_connection_lost();
            } else {
                self.arm_reconnect();
            }
            return false;
        }

        let interval = self.keepalive_interval();
        for entry in self.core().pending.overdue(interval) {
            warn!(
                expected = %entry.expected,
                reference = entry.reference,
                "reply overdue"
            );
        }

        match self.issue(Request::KeepAlive).await {
            Ok(_) => true,
            Err(err) => {
                warn!(error = %err, "keepalive failed");
                self.arm_reconnect();
                false
            }
        }
    }

    /// Start the reconnect timer unless it is already running or the caller
    /// does not want a session.
    fn arm_reconnect(self: &Arc<Self>) {
        let mut core = self.core();
        if !core.reconnect {
            return;
        }
        if core
            .reconnect_task
            .as_ref()
            .is_some_and(|task| !task.is_finished())
        {
            return;
        }
        let interval = self.keepalive_interval();
        let weak = Arc::downgrade(self);
        core.reconnect_task = Some(tokio::spawn(reconnect_loop(weak, interval)));
        debug!(?interval, "reconnect armed");
    }

    /// Re-establish the session, replay sensor subscriptions, then arm the
    /// keepalive timer.
    async fn reconnect(self: &Arc<Self>) -> Result<()> {
        if self.state() == SessionState::SessionActive {
            if self.core().keepalive_task.is_none() {
                self.arm_keepalive();
            }
            return Ok(());
        }

        self.core().defer_keepalive = true;
        let result = self.resume().await;
        self.core().defer_keepalive = false;

        match result {
            Ok(()) => {
                self.arm_keepalive();
                info!("session re-established");
                Ok(())
            }
            Err(err) => {
                // Leave Active so the next attempt replays from the start.
                if self.state() == SessionState::SessionActive {
                    self.set_state(SessionState::Discovered);
                }
                Err(err)
            }
        }
    }

    async fn resume(self: &Arc<Self>) -> Result<()> {
        let mut states = self.state.subscribe();
        self.start_session(false).await?;

        let wait = self.keepalive_interval();
        let settled = tokio::time::timeout(wait, async {
            let _ = states
                .wait_for(|state| *state != SessionState::SessionRequested)
                .await;
        })
        .await;
        if settled.is_err() {
            return Err(SessionError::Timeout(wait));
        }
        let state = self.state();
        if state != SessionState::SessionActive {
            return Err(SessionError::NotActive(state));
        }

        let (resumed, replay, delay) = {
            let core = self.core();
            (
                core.resumed,
                core.subscriptions.to_vec(),
                self.settings().resubscribe_delay,
            )
        };
        if resumed {
            debug!("session resumed, skipping sensor replay");
            return Ok(());
        }
        for pdid in replay {
            tokio::time::sleep(delay).await;
            let state = self.state();
            if state != SessionState::SessionActive {
                return Err(SessionError::NotActive(state));
            }
            self.issue(Request::RegisterSensor { pdid }).await?;
            debug!(pdid, "sensor re-subscribed");
        }
        Ok(())
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        let core = self.core.get_mut().unwrap_or_else(PoisonError::into_inner);
        core.clear_timers();
        if let Some(task) = core.pump_task.take() {
            task.abort();
        }
        // The transport reader keeps the socket alive on its own.
        let transport = self
            .transport
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let (Some(transport), Ok(runtime)) = (transport, tokio::runtime::Handle::try_current())
        {
            runtime.spawn(async move { transport.close().await });
        }
    }
}

async fn reconnect_loop(weak: Weak<Inner>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;
        let Some(inner) = weak.upgrade() else { return };
        if !inner.core().reconnect {
            return;
        }
        match inner.reconnect().await {
            Ok(()) => return,
            Err(err) => warn!(error = %err, retry_in = ?interval, "reconnect failed"),
        }
    }
}

async fn pump(weak: Weak<Inner>, mut events: mpsc::UnboundedReceiver<TransportEvent>) {
    while let Some(event) = events.recv().await {
        let Some(inner) = weak.upgrade() else { return };
        match event {
            TransportEvent::Frame(received) => inner.handle_frame(received),
            TransportEvent::Error(err) => inner.emit(SessionEvent::Error(err.to_string())),
            TransportEvent::Disconnected => inner.on_connection_lost(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn operations_need_a_device() {
        let (session, _rx) = Session::new(Settings::default());
        assert_eq!(session.state(), SessionState::NotDiscovered);
        let err = session.list_registered_apps().await.unwrap_err();
        assert!(matches!(err, SessionError::NotDiscovered));
        assert!(session.header().is_none());
    }

    #[tokio::test]
    async fn preset_device_starts_discovered() {
        let settings = Settings {
            device_address: Some("127.0.0.1".parse().unwrap()),
            device_uuid: Some("00000000000910138001144fd71e13cb".parse().unwrap()),
            ..Settings::default()
        };
        let (session, _rx) = Session::new(settings);
        assert_eq!(session.state(), SessionState::Discovered);
    }

    #[tokio::test]
    async fn unknown_sensor_is_not_remembered() {
        let settings = Settings {
            device_address: Some("127.0.0.1".parse().unwrap()),
            device_uuid: Some("00000000000910138001144fd71e13cb".parse().unwrap()),
            ..Settings::default()
        };
        let (session, _rx) = Session::new(settings);
        let err = session.register_sensor(1).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Proto(ProtoError::UnknownSensor(1))
        ));
        assert!(session.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn unknown_command_is_rejected() {
        let (session, _rx) = Session::new(Settings::default());
        let err = session.send_command(1, "FAN_MODE_TURBO").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Proto(ProtoError::UnknownCommand(_))
        ));
    }

    async fn read_kind(stream: &mut tokio::net::TcpStream) -> (MessageKind, Vec<u8>) {
        use lanc_proto::messages::GatewayOperation;
        use prost::Message;
        use tokio::io::AsyncReadExt;

        let mut buf = bytes::BytesMut::new();
        loop {
            if let Some(frame) = lanc_frame::decode_frame(&mut buf, lanc_frame::DEFAULT_MAX_FRAME)
                .unwrap()
            {
                let op = GatewayOperation::decode(frame.operation.as_ref()).unwrap();
                let kind = MessageKind::from_wire(op.r#type.unwrap_or_default());
                return (kind, frame.command.to_vec());
            }
            assert_ne!(stream.read_buf(&mut buf).await.unwrap(), 0, "connection closed");
        }
    }

    /// An Active session whose transport exists but never connected.
    async fn active_without_connection(
        intent: bool,
    ) -> (
        Session,
        mpsc::UnboundedReceiver<SessionEvent>,
        tokio::net::TcpListener,
    ) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let settings = Settings {
            device_address: Some(addr.ip()),
            device_uuid: Some("00000000000910138001144fd71e13cb".parse().unwrap()),
            port: addr.port(),
            keepalive_interval: Duration::from_millis(100),
            ..Settings::default()
        };
        let (session, rx) = Session::new(settings);
        session.inner.ensure_transport().unwrap();
        session.inner.core().reconnect = intent;
        session.inner.set_state(SessionState::SessionActive);
        (session, rx, listener)
    }

    #[tokio::test]
    async fn keepalive_while_disconnected_reconnects_instead_of_sending() {
        use lanc_proto::messages::StartSessionRequest;
        use prost::Message;

        let (session, mut rx, listener) = active_without_connection(true).await;
        assert!(!session.inner.keepalive_tick().await);

        assert_eq!(session.state(), SessionState::Discovered);
        assert!(session.inner.core().reconnect_task.is_some());
        assert!(matches!(
            rx.recv().await,
            Some(SessionEvent::Disconnected(DisconnectReason::ConnectionLost))
        ));

        let (mut stream, _) = tokio::time::timeout(Duration::from_secs(5), listener.accept())
            .await
            .expect("reconnect should dial the device")
            .unwrap();
        let (kind, command) = read_kind(&mut stream).await;
        assert_eq!(kind, MessageKind::StartSessionRequest);
        let request = StartSessionRequest::decode(command.as_slice()).unwrap();
        assert_eq!(request.takeover, Some(false));

        session.close_session().await.unwrap();
    }

    #[tokio::test]
    async fn keepalive_while_disconnected_without_intent_does_nothing() {
        let (session, mut rx, listener) = active_without_connection(false).await;
        assert!(!session.inner.keepalive_tick().await);

        assert!(session.inner.core().reconnect_task.is_none());
        assert_eq!(session.pending_count(), 0);
        assert!(rx.try_recv().is_err());
        let dialed = tokio::time::timeout(Duration::from_millis(300), listener.accept()).await;
        assert!(dialed.is_err(), "no connection should be attempted");
    }

    #[tokio::test]
    async fn close_before_discovery_is_a_noop() {
        let (session, _rx) = Session::new(Settings::default());
        session.close_session().await.unwrap();
        session.close_session().await.unwrap();
        assert_eq!(session.state(), SessionState::NotDiscovered);
        assert!(!session.wants_reconnect());
    }
}
