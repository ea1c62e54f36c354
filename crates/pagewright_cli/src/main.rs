use clap::Parser;
use pagewright_cli::commands::{self, Commands};
use pagewright_cli::options::GlobalOptions;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// Pagewright: inspect a page configuration tree
#[derive(Parser, Debug)]
#[command(name = "pagewright", version)]
#[command(about = "Resolve and validate Pagewright page configuration", long_about = None)]
struct Cli {
    #[command(flatten)]
    options: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_env("PAGEWRIGHT_LOG"))
        .init();

    let cli = Cli::parse();
    if let Err(e) = commands::execute(&cli.command, &cli.options).await {
        error!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}
