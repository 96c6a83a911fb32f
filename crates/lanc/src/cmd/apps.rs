use lanc_proto::MessageKind;

use crate::cmd::client::{reply_code, Client};
use crate::cmd::{DeregisterArgs, DeviceArgs};
use crate::exit::CliResult;
use crate::output::{print_message, OutputFormat};

pub async fn list(opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(
            session.list_registered_apps(),
            MessageKind::ListRegisteredAppsConfirm,
        )
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}

pub async fn register(opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(session.register_app(), MessageKind::RegisterAppConfirm)
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}

pub async fn deregister(
    args: DeregisterArgs,
    opts: &DeviceArgs,
    format: OutputFormat,
) -> CliResult<i32> {
    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(
            session.deregister_app(args.uuid),
            MessageKind::DeregisterAppConfirm,
        )
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}
