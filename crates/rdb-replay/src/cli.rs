use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(
    name = "rdb-replay",
    version,
    about = "Replay a recorded trace against a set of breakpoints."
)]
pub struct Cli {
    /// Trace file (JSON) holding breakpoints, events and resume commands.
    pub trace: PathBuf,
    /// Debugger configuration file.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Include disabled breakpoints in the final listing.
    #[arg(long)]
    pub show_disabled: bool,
}
