use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::Directive;

use rdb_core::{DebugSession, DebuggerConfig};
use rdb_replay::cli::Cli;
use rdb_replay::{replay, TraceFile};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => DebuggerConfig::load(path)?,
        None => DebuggerConfig::default(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(
                config
                    .log_level
                    .parse::<Directive>()
                    .context("invalid log level")?,
            ),
        )
        .with_writer(std::io::stderr)
        .init();

    info!("Replaying {}", cli.trace.display());
    let trace = TraceFile::load(&cli.trace)?;
    let session = DebugSession::new(config)?;
    let report = replay(&session, &trace, cli.show_disabled)?;
    println!("{report}");
    Ok(())
}
