use lanc_session::Session;

use crate::cmd::client::load_settings;
use crate::cmd::DeviceArgs;
use crate::exit::{session_error, CliResult, SUCCESS};
use crate::output::{print_device, OutputFormat};

pub async fn run(opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut settings = load_settings(opts)?;
    // Always search, even when the settings already name the device.
    settings.device_uuid = None;
    let (session, _events) = Session::new(settings);

    let device = session
        .discover()
        .await
        .map_err(|err| session_error("discovery failed", err))?;
    print_device(&device, format);
    session.shutdown().await;
    Ok(SUCCESS)
}
