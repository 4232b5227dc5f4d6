use anyhow::Result;
use clap::{Parser, Subcommand};

mod jobs;

use jobs::JobsCmd;

#[derive(Parser)]
#[command(name = "gl")]
#[command(about = "GitLab Jobs API client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and control CI jobs
    Jobs(JobsCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so payloads on stdout stay pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Jobs(cmd) => cmd.execute().await,
    }
}
