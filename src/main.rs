use clap::Parser;
use podview::cli::{run, Cli};
use std::process;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    debug!("Starting kubectl-podview v{}", podview::VERSION);

    if let Err(e) = run::run(&cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
