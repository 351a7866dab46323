use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use std::path::Path;
use tracing::debug;

use crate::config::DashgenConfig;

pub fn add_build_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the docset, feed and contribution files"),
        )
        .arg(
            Arg::new("theme")
                .short('t')
                .long("theme")
                .value_name("DIR")
                .help("Directory with template overrides"),
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

pub fn make_subcommand() -> Command {
    add_build_args(Command::new("build")).about("Fetch all documentation and package the docset")
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    let dashgen_config = DashgenConfig::load(args)?;
    let build_config = dashgen_config.build_config();

    let output_dir = Path::new(&build_config.output);
    let theme_dir = Path::new(&build_config.theme);
    let theme_dir = if theme_dir.is_dir() {
        Some(theme_dir)
    } else {
        debug!("No theme directory at {}, using built-in templates", theme_dir.display());
        None
    };

    let report = dashgen_core::build_docset(dashgen_config.docset.clone(), output_dir, theme_dir).await?;

    println!(
        "Docset built in {}: {} pages, {} index entries ({} indexed)",
        output_dir.display(),
        report.pages,
        report.entries,
        report.indexed
    );
    if report.suspicious_links > 0 {
        println!("{} suspicious links left unrewritten", report.suspicious_links);
    }

    Ok(())
}
