use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use lanc_frame::DeviceUuid;
use lanc_session::parse_duration;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod apps;
pub mod client;
pub mod command;
pub mod discover;
pub mod info;
pub mod monitor;
pub mod tables;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find the device on the local network.
    Discover,
    /// List the apps registered on the device.
    Apps,
    /// Register this app with its UUID, pin and name.
    Register,
    /// Remove a registered app.
    Deregister(DeregisterArgs),
    /// Show the gateway version.
    Version,
    /// Show the device time.
    Time,
    /// Send a named command to a node.
    Command(CommandArgs),
    /// Subscribe to sensors and print their values as they arrive.
    Monitor(MonitorArgs),
    /// Print the built-in sensor or command table.
    List(ListArgs),
}

pub async fn run(command: Command, opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Discover => discover::run(opts, format).await,
        Command::Apps => apps::list(opts, format).await,
        Command::Register => apps::register(opts, format).await,
        Command::Deregister(args) => apps::deregister(args, opts, format).await,
        Command::Version => info::version(opts, format).await,
        Command::Time => info::time(opts, format).await,
        Command::Command(args) => command::run(args, opts, format).await,
        Command::Monitor(args) => monitor::run(args, opts, format).await,
        Command::List(args) => tables::run(args, format),
    }
}

/// How to reach the device. Flags override the settings file.
#[derive(Args, Debug, Clone)]
pub struct DeviceArgs {
    /// JSON settings file.
    #[arg(long, value_name = "PATH", global = true, env = "LANC_SETTINGS")]
    pub settings: Option<PathBuf>,
    /// Device address; discovery is sent there instead of broadcast.
    #[arg(long, value_name = "ADDR", global = true)]
    pub host: Option<IpAddr>,
    /// Device TCP/UDP port.
    #[arg(long, global = true)]
    pub port: Option<u16>,
    /// UUID of this app (32 hex characters).
    #[arg(long, value_name = "UUID", global = true)]
    pub uuid: Option<DeviceUuid>,
    /// Device UUID; with --host this skips discovery.
    #[arg(long, value_name = "UUID", global = true)]
    pub device_uuid: Option<DeviceUuid>,
    /// Pin used when registering.
    #[arg(long, global = true)]
    pub pin: Option<u32>,
    /// How long to wait for the device (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s", value_parser = parse_duration, global = true)]
    pub timeout: Duration,
    /// Log frame hex dumps (raises the log level to debug).
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Args, Debug)]
pub struct DeregisterArgs {
    /// UUID of the app to remove.
    pub uuid: DeviceUuid,
}

#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Target node id.
    pub node: u32,
    /// Command name, e.g. FAN_MODE_HIGH.
    pub name: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    /// Sensor id to subscribe to (repeatable).
    #[arg(long = "sensor", short = 's', value_name = "ID", required = true)]
    pub sensors: Vec<u32>,
    /// Exit after N sensor values.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    pub table: TableKind,
}

#[derive(Copy, Clone, Debug, clap::ValueEnum)]
pub enum TableKind {
    Sensors,
    Commands,
}
