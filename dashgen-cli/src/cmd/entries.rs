use anyhow::Result;
use clap::{Arg, ArgAction, ArgMatches, Command};

use dashgen_core::{ModuleStyle, RemoteClient, modules};

use crate::config::DashgenConfig;

pub fn make_subcommand() -> Command {
    Command::new("entries")
        .about("Print the index entries one registry module would produce")
        .arg(
            Arg::new("module")
                .value_name("MODULE")
                .help("Registry package name")
                .required(true),
        )
        .arg(
            Arg::new("class")
                .long("class")
                .help("Treat the module as a class module")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("select-style")
                .long("select-style")
                .help("Treat the module as a select-style view")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print entries as JSON")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./dashgen.toml"),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let dashgen_config = DashgenConfig::load(args)?;
    let config = &dashgen_config.docset;

    let name = args
        .get_one::<String>("module")
        .map(String::as_str)
        .unwrap_or_default();
    let style = ModuleStyle {
        is_class: args.get_flag("class") || config.is_class_module(name),
        select_style: args.get_flag("select-style") || config.is_select_style(name),
    };

    let client = RemoteClient::from_env(&config.guides.user_agent)?;
    let entries = modules::fetch_module_entries(&client, config, name, style).await?;

    if args.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }
    for entry in &entries {
        println!("{}\t{}\t{}", entry.kind, entry.name, entry.path());
    }

    Ok(())
}
