mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::client::load_settings;
use crate::cmd::{Command, DeviceArgs};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "lanc", version, about = "LAN C ventilation unit client")]
struct Cli {
    #[command(flatten)]
    device: DeviceArgs,

    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    // A bad settings file is reported by the command itself.
    let frame_dumps = load_settings(&cli.device).is_ok_and(|settings| settings.debug);
    init_logging(cli.log_format, cli.log_level, frame_dumps);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, &cli.device, format).await;

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn parses_global_device_flags() {
        let cli = Cli::try_parse_from([
            "lanc",
            "version",
            "--host",
            "10.0.0.14",
            "--uuid",
            "00000000000000000000000000000005",
            "--pin",
            "4321",
            "--timeout",
            "500ms",
        ])
        .expect("version args should parse");

        assert!(matches!(cli.command, Command::Version));
        assert_eq!(cli.device.host, Some("10.0.0.14".parse().unwrap()));
        assert_eq!(cli.device.pin, Some(4321));
        assert_eq!(cli.device.timeout, Duration::from_millis(500));
    }

    #[test]
    fn debug_flag_turns_on_frame_dumps() {
        let cli = Cli::try_parse_from(["lanc", "--debug", "time"]).expect("time should parse");
        assert!(cli.device.debug);
        assert!(load_settings(&cli.device).unwrap().debug);

        let cli = Cli::try_parse_from(["lanc", "time"]).expect("time should parse");
        assert!(!load_settings(&cli.device).unwrap().debug);
    }

    #[test]
    fn timeout_defaults_to_five_seconds() {
        let cli = Cli::try_parse_from(["lanc", "apps"]).expect("apps should parse");
        assert_eq!(cli.device.timeout, Duration::from_secs(5));
    }

    #[test]
    fn parses_command_subcommand() {
        let cli = Cli::try_parse_from(["lanc", "command", "1", "FAN_MODE_HIGH"])
            .expect("command args should parse");
        match cli.command {
            Command::Command(args) => {
                assert_eq!(args.node, 1);
                assert_eq!(args.name, "FAN_MODE_HIGH");
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn monitor_collects_repeated_sensors() {
        let cli = Cli::try_parse_from([
            "lanc", "monitor", "--sensor", "227", "-s", "276", "--count", "3",
        ])
        .expect("monitor args should parse");
        match cli.command {
            Command::Monitor(args) => {
                assert_eq!(args.sensors, vec![227, 276]);
                assert_eq!(args.count, Some(3));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn monitor_requires_a_sensor() {
        let err = Cli::try_parse_from(["lanc", "monitor"]).expect_err("no sensors should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn rejects_malformed_uuid() {
        let err = Cli::try_parse_from(["lanc", "deregister", "not-a-uuid"])
            .expect_err("bad uuid should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Cli::try_parse_from(["lanc", "time", "--timeout", "0s"])
            .expect_err("zero timeout should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
