use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use ytviewer::{ConfigLoader, FixedHome, HomeDir};

#[derive(Parser, Debug)]
#[command(name = "ytviewer", version, about = "Terminal YouTube subscription viewer")]
struct Cli {
    /// Use this directory instead of the current user's home
    #[arg(long, global = true, value_name = "DIR")]
    home: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Print the effective configuration (default)
    Show,
    /// Print the config file location
    Path,
}

fn setup_logging(config_dir: &Path) {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let file_appender = tracing_appender::rolling::never(config_dir, "ytviewer.log");

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("ytviewer=debug"));

    fmt()
        .with_env_filter(filter)
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Show);

    match cli.home {
        Some(home) => run(&ConfigLoader::with_home(FixedHome(home)), command),
        None => run(&ConfigLoader::new(), command),
    }
}

fn run<H: HomeDir>(loader: &ConfigLoader<H>, command: Command) -> Result<()> {
    let config_dir = loader.config_dir()?;
    setup_logging(&config_dir);
    info!(?command, config_dir = %config_dir.display(), "ytviewer starting up");

    let output = match command {
        Command::Show => serde_json::to_string_pretty(&loader.load()?)?,
        Command::Path => loader.config_path()?.display().to_string(),
    };
    writeln!(std::io::stdout().lock(), "{output}")?;

    Ok(())
}
