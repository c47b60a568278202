use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = tasklist::cli::Cli::parse();
    let stdout = std::io::stdout();
    let handle = stdout.lock();
    tasklist::run_blocking(cli, handle)
}
