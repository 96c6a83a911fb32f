use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lanc_proto::{COMMANDS, SENSORS};
use serde_json::json;

use crate::cmd::{ListArgs, TableKind};
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: ListArgs, format: OutputFormat) -> CliResult<i32> {
    let (header, rows): (Vec<&str>, Vec<Vec<String>>) = match args.table {
        TableKind::Sensors => (
            vec!["PDID", "TYPE", "NAME"],
            SENSORS
                .iter()
                .map(|info| {
                    vec![
                        info.pdid.to_string(),
                        info.kind.code().to_string(),
                        info.name.to_string(),
                    ]
                })
                .collect(),
        ),
        TableKind::Commands => (
            vec!["NAME", "MESSAGE"],
            COMMANDS
                .iter()
                .map(|(name, message)| vec![name.to_string(), message.to_string()])
                .collect(),
        ),
    };

    match format {
        OutputFormat::Json => {
            for row in rows {
                let object: serde_json::Map<String, serde_json::Value> = header
                    .iter()
                    .map(|key| key.to_lowercase())
                    .zip(row.into_iter().map(|value| json!(value)))
                    .collect();
                println!("{}", serde_json::Value::Object(object));
            }
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(header)
                .add_rows(rows);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in rows {
                println!("{}", row.join("  "));
            }
        }
    }
    Ok(SUCCESS)
}
