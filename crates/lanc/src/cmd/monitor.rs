use lanc_proto::{lookup_sensor, Payload, ProtoError};
use lanc_session::{DisconnectReason, SessionEvent};
use tracing::{info, warn};

use crate::cmd::client::Client;
use crate::cmd::{DeviceArgs, MonitorArgs};
use crate::exit::{proto_error, session_error, CliError, CliResult, FAILURE, SUCCESS};
use crate::output::{print_sensor, OutputFormat};

pub async fn run(args: MonitorArgs, opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    for &pdid in &args.sensors {
        if lookup_sensor(pdid).is_none() {
            return Err(proto_error(
                "invalid sensor",
                ProtoError::UnknownSensor(pdid),
            ));
        }
    }

    let mut client = Client::connect(opts).await?;
    for &pdid in &args.sensors {
        if let Err(err) = client.session.register_sensor(pdid).await {
            client.close().await;
            return Err(session_error("subscribe failed", err));
        }
    }
    info!(sensors = ?args.sensors, "monitoring");

    let result = watch(&mut client, args.count, format).await;
    client.close().await;
    result
}

async fn watch(client: &mut Client, count: Option<usize>, format: OutputFormat) -> CliResult<i32> {
    let mut printed = 0usize;
    loop {
        let event = tokio::select! {
            event = client.events().recv() => event,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                return Ok(SUCCESS);
            }
        };
        let Some(event) = event else {
            return Err(CliError::new(FAILURE, "session ended"));
        };

        match event {
            SessionEvent::Message(inbound) => {
                if let Payload::Sensor(reading) = &inbound.message.payload {
                    print_sensor(reading, format);
                    printed = printed.saturating_add(1);
                    if count.is_some_and(|count| printed >= count) {
                        return Ok(SUCCESS);
                    }
                }
            }
            // The session re-establishes itself and replays the subscriptions.
            SessionEvent::Disconnected(DisconnectReason::OtherSession) => {
                warn!("session taken over by another client, waiting to reclaim it");
            }
            SessionEvent::Disconnected(DisconnectReason::ConnectionLost) => {
                warn!("connection lost, reconnecting");
            }
            SessionEvent::Error(err) => warn!(error = %err, "transport error"),
        }
    }
}
