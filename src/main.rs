use anyhow::Result;
use clap::Parser;

use docmeta::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Capabilities { config } => docmeta::cli::capabilities::run(&config.resolve()),
        Commands::Extract {
            paths,
            media_type,
            pretty,
            config,
        } => docmeta::cli::extract::run(&paths, media_type.as_deref(), pretty, &config.resolve()).await,
    }
}
