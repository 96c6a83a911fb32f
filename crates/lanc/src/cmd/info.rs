use lanc_proto::MessageKind;

use crate::cmd::client::{reply_code, Client};
use crate::cmd::DeviceArgs;
use crate::exit::CliResult;
use crate::output::{print_message, OutputFormat};

pub async fn version(opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(session.version_request(), MessageKind::VersionConfirm)
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}

pub async fn time(opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(session.time_request(), MessageKind::CnTimeConfirm)
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}
