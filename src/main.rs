use anyhow::Result;
use clap::Parser;
use ratesd::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = ratesd::run(cli.config_path.as_deref()).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Server failed");
    }
    result
}
