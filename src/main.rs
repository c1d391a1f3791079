use anyhow::Result;
use clap::{crate_version, App, AppSettings, Arg, SubCommand};
use skald::build::build_site;
use skald::config::Config;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let matches = App::new("skald")
        .version(crate_version!())
        .about("A static blog generator")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .global(true)
                .help("Log per-page and per-series detail"),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the site")
                .arg(
                    Arg::with_name("project")
                        .long("project")
                        .takes_value(true)
                        .default_value(".")
                        .help("A directory inside the project (containing or below `skald.yaml`)"),
                )
                .arg(
                    Arg::with_name("output")
                        .long("output")
                        .takes_value(true)
                        .help("Overrides the project's output directory"),
                ),
        )
        .get_matches();

    // RUST_LOG wins over --verbose.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if matches.is_present("verbose") {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let ("build", Some(matches)) = matches.subcommand() {
        let project = Path::new(matches.value_of("project").unwrap_or("."));
        let config = Config::from_directory(
            &std::fs::canonicalize(project)?,
            matches.value_of("output").map(Path::new),
        )?;
        build_site(&config)?;
    }
    Ok(())
}
