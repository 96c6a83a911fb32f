//! Session setup shared by the one-shot subcommands.

use std::future::Future;
use std::time::Duration;

use lanc_proto::{DecodedMessage, MessageKind, Payload};
use lanc_session::{Result as SessionResult, Session, SessionEvent, Settings};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

use crate::cmd::DeviceArgs;
use crate::exit::{session_error, CliError, CliResult, FAILURE, TIMEOUT};

/// Settings from the file (or defaults) with command-line overrides applied.
pub fn load_settings(opts: &DeviceArgs) -> CliResult<Settings> {
    let mut settings = match &opts.settings {
        Some(path) => Settings::load(path).map_err(|err| session_error("settings", err))?,
        None => Settings::default(),
    };
    if let Some(host) = opts.host {
        settings.device_address = Some(host);
    }
    if let Some(port) = opts.port {
        settings.port = port;
    }
    if let Some(uuid) = opts.uuid {
        settings.local_uuid = uuid;
    }
    if let Some(device) = opts.device_uuid {
        settings.device_uuid = Some(device);
    }
    if let Some(pin) = opts.pin {
        settings.pin = pin;
    }
    if opts.debug {
        settings.debug = true;
    }
    if settings.discovery_timeout.is_none() {
        settings.discovery_timeout = Some(opts.timeout);
    }
    Ok(settings)
}

/// A started session plus its event stream.
pub struct Client {
    pub session: Session,
    events: UnboundedReceiver<SessionEvent>,
    timeout: Duration,
}

impl Client {
    /// Discover the device if needed and take over its session.
    pub async fn connect(opts: &DeviceArgs) -> CliResult<Self> {
        let settings = load_settings(opts)?;
        let (session, events) = Session::new(settings);
        let mut client = Self {
            session,
            events,
            timeout: opts.timeout,
        };

        if client.session.settings().device().is_none() {
            let device = client
                .session
                .discover()
                .await
                .map_err(|err| session_error("discovery failed", err))?;
            debug!(address = %device.address, uuid = %device.uuid, "using device");
        }

        let session = client.session.clone();
        let confirm = client
            .request(session.start_session(true), MessageKind::StartSessionConfirm)
            .await;
        let confirm = match confirm {
            Ok(confirm) => confirm,
            Err(err) => {
                client.session.shutdown().await;
                return Err(err);
            }
        };
        if !confirm.is_ok() {
            client.session.shutdown().await;
            return Err(CliError::new(
                FAILURE,
                format!("device refused the session: {}", confirm.result),
            ));
        }
        if let Payload::SessionStarted(started) = &confirm.payload {
            info!(
                device = started.device_name.as_deref().unwrap_or("-"),
                resumed = started.resumed,
                "session started"
            );
        }
        Ok(client)
    }

    /// Issue one operation and wait for the first message of `expected`.
    pub async fn request<F>(&mut self, issue: F, expected: MessageKind) -> CliResult<DecodedMessage>
    where
        F: Future<Output = SessionResult<u32>>,
    {
        let reference = issue
            .await
            .map_err(|err| session_error("request failed", err))?;
        debug!(reference, %expected, "waiting for reply");
        let timeout = self.timeout;
        tokio::time::timeout(timeout, self.next_of(expected))
            .await
            .map_err(|_| {
                CliError::new(
                    TIMEOUT,
                    format!("no {expected} from device within {timeout:?}"),
                )
            })?
    }

    async fn next_of(&mut self, expected: MessageKind) -> CliResult<DecodedMessage> {
        while let Some(event) = self.events.recv().await {
            match event {
                SessionEvent::Message(inbound) if inbound.message.kind == expected => {
                    return Ok(inbound.message);
                }
                SessionEvent::Message(inbound) => {
                    debug!(kind = %inbound.message.kind, "ignoring message");
                }
                SessionEvent::Disconnected(reason) => {
                    return Err(CliError::new(FAILURE, format!("disconnected: {reason}")));
                }
                SessionEvent::Error(err) => debug!(error = %err, "transport error"),
            }
        }
        Err(CliError::new(FAILURE, "session ended"))
    }

    /// The event stream, for commands that consume notifications directly.
    pub fn events(&mut self) -> &mut UnboundedReceiver<SessionEvent> {
        &mut self.events
    }

    pub async fn close(self) {
        self.session.shutdown().await;
    }
}

/// Exit code for a reply: success only when the device said OK.
pub fn reply_code(message: &DecodedMessage) -> i32 {
    if message.is_ok() {
        crate::exit::SUCCESS
    } else {
        FAILURE
    }
}
