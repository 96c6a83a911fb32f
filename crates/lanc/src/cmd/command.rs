use lanc_proto::{lookup_command, MessageKind};

use crate::cmd::client::{reply_code, Client};
use crate::cmd::{CommandArgs, DeviceArgs};
use crate::exit::{proto_error, CliResult};
use crate::output::{print_message, OutputFormat};

pub async fn run(args: CommandArgs, opts: &DeviceArgs, format: OutputFormat) -> CliResult<i32> {
    // Reject unknown names before touching the network.
    lookup_command(&args.name).map_err(|err| proto_error("invalid command", err))?;

    let mut client = Client::connect(opts).await?;
    let session = client.session.clone();
    let reply = client
        .request(
            session.send_command(args.node, &args.name),
            MessageKind::CnRmiResponse,
        )
        .await;
    client.close().await;

    let reply = reply?;
    print_message(&reply, format);
    Ok(reply_code(&reply))
}
