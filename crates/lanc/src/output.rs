use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lanc_proto::{lookup_sensor, DecodedMessage, Payload, SensorReading, SensorValue};
use lanc_transport::DiscoveredDevice;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct DeviceOutput {
    address: String,
    uuid: String,
    responder: String,
    version: Option<u32>,
}

pub fn print_device(device: &DiscoveredDevice, format: OutputFormat) {
    let out = DeviceOutput {
        address: device.address.to_string(),
        uuid: device.uuid.to_string(),
        responder: device.responder.to_string(),
        version: device.version,
    };
    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let mut table = new_table(vec!["ADDRESS", "UUID", "VERSION"]);
            table.add_row(vec![
                out.address,
                out.uuid,
                out.version.map_or_else(|| "-".to_string(), |v| v.to_string()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("Device:");
            println!("  Address: {}", out.address);
            println!("  UUID:    {}", out.uuid);
            if let Some(version) = out.version {
                println!("  Version: {version}");
            }
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    kind: String,
    reference: Option<u32>,
    result: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    result_description: Option<&'a str>,
    payload: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

/// Print one decoded reply or notification.
pub fn print_message(message: &DecodedMessage, format: OutputFormat) {
    let payload = payload_json(&message.payload);
    match format {
        OutputFormat::Json => print_json(&MessageOutput {
            kind: message.kind.to_string(),
            reference: message.reference,
            result: message.result.as_str(),
            result_description: message.result_description.as_deref(),
            payload,
            error: message.error.as_deref(),
        }),
        OutputFormat::Table => {
            if let Payload::RegisteredApps(apps) = &message.payload {
                let mut table = new_table(vec!["UUID", "NAME"]);
                for app in apps {
                    table.add_row(vec![hex::encode(&app.uuid), app.device_name.clone()]);
                }
                println!("{table}");
                return;
            }
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            table.add_row(vec!["kind".to_string(), message.kind.to_string()]);
            table.add_row(vec!["result".to_string(), message.result.to_string()]);
            for (key, value) in fields(&payload) {
                table.add_row(vec![key, value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{} ({})", message.kind, message.result);
            if let Some(description) = &message.result_description {
                println!("  {description}");
            }
            for (key, value) in fields(&payload) {
                println!("  {key}: {value}");
            }
        }
    }
}

#[derive(Serialize)]
struct SensorOutput<'a> {
    pdid: u32,
    name: &'a str,
    zone: Option<u32>,
    value: Value,
    raw: String,
}

pub fn print_sensor(reading: &SensorReading, format: OutputFormat) {
    let name = lookup_sensor(reading.pdid).map_or("", |info| info.name);
    match format {
        OutputFormat::Json => print_json(&SensorOutput {
            pdid: reading.pdid,
            name,
            zone: reading.zone,
            value: sensor_json(&reading.value),
            raw: hex::encode(&reading.data),
        }),
        OutputFormat::Table => {
            let mut table = new_table(vec!["PDID", "NAME", "VALUE"]);
            table.add_row(vec![
                reading.pdid.to_string(),
                name.to_string(),
                reading.value.to_string(),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{:>4} {:<40} {}", reading.pdid, name, reading.value);
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

/// Flatten a payload object into printable key/value pairs.
fn fields(payload: &Value) -> Vec<(String, String)> {
    match payload {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![("payload".to_string(), other.to_string())],
    }
}

fn sensor_json(value: &SensorValue) -> Value {
    match value {
        SensorValue::Integer(v) => json!(v),
        SensorValue::Decimal(v) => json!(v),
        SensorValue::Raw(data) => json!(hex::encode(data)),
    }
}

pub fn payload_json(payload: &Payload) -> Value {
    match payload {
        Payload::Empty => Value::Null,
        Payload::SessionStarted(started) => json!({
            "device_name": started.device_name,
            "resumed": started.resumed,
        }),
        Payload::SessionPreempted => json!({ "preempted": true }),
        Payload::RegisteredApps(apps) => json!({
            "apps": apps
                .iter()
                .map(|app| json!({
                    "uuid": hex::encode(&app.uuid),
                    "device_name": app.device_name,
                }))
                .collect::<Vec<_>>(),
        }),
        Payload::Version(version) => json!({
            "gateway_version": version.gateway_version,
            "serial_number": version.serial_number,
            "comfonet_version": version.comfonet_version,
        }),
        Payload::Time { current_time } => json!({ "current_time": current_time }),
        Payload::Node(node) => json!({
            "node_id": node.node_id,
            "product_id": node.product_id,
            "product": node.product_name(),
            "zone_id": node.zone_id,
            "mode": node.mode,
        }),
        Payload::RmiResponse { result, message } | Payload::RmiAsyncResponse { result, message } => {
            json!({ "result": result, "message": hex::encode(message) })
        }
        Payload::RmiAsyncConfirm { result } => json!({ "result": result }),
        Payload::Sensor(reading) => json!({
            "pdid": reading.pdid,
            "zone": reading.zone,
            "value": sensor_json(&reading.value),
            "raw": hex::encode(&reading.data),
        }),
        Payload::Alarm(alarm) => json!({
            "zone": alarm.zone,
            "product_id": alarm.product_id,
            "product_variant": alarm.product_variant,
            "serial_number": alarm.serial_number,
            "sw_program_version": alarm.sw_program_version,
            "errors": hex::encode(&alarm.errors),
            "error_id": alarm.error_id,
            "node_id": alarm.node_id,
        }),
        Payload::GatewayNotification { push_uuids, alarm } => json!({
            "push_uuids": push_uuids.iter().map(hex::encode).collect::<Vec<_>>(),
            "alarm": alarm.as_ref().map(|alarm| payload_json(&Payload::Alarm(alarm.clone()))),
        }),
    }
}
