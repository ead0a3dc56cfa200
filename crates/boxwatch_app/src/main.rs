mod platform;

use std::path::PathBuf;

use boxwatch_core::Location;
use clap::Parser;

/// Terminal dashboard for a job-runner service.
#[derive(Debug, Parser)]
#[command(name = "boxwatch", version)]
struct Cli {
    /// Page to open first. Anything that is not a positive number opens page 1.
    #[arg(long)]
    page: Option<String>,

    /// Directory holding the settings file and `boxwatch.log`.
    #[arg(long, default_value = ".")]
    state_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let location = cli
        .page
        .as_deref()
        .map(|page| Location::parse(&format!("page={}", page.trim())))
        .unwrap_or_default();

    platform::run_app(platform::AppOptions {
        state_dir: cli.state_dir,
        location,
    })
}
