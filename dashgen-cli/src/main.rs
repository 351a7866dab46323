mod cmd;
mod config;

use clap::{Arg, ArgAction, Command};
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_target(false)
        .init();
}

fn cli() -> Command {
    Command::new("dashgen")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Build Dash docsets from registry modules and hosted guides")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log debug output")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::entries::make_subcommand())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli().get_matches();
    init_tracing(matches.get_flag("verbose"));

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args).await,
        Some(("entries", args)) => cmd::entries::execute(args).await,
        _ => unreachable!("subcommand_required is set"),
    }
}
