#![warn(clippy::all, rust_2018_idioms)]

use clap::Parser as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = admin_dashboard::cli::Cli::parse();

    if let Err(e) = admin_dashboard::tracing::init(&args) {
        eprintln!("Failed to start tracing: {e}");
    }

    admin_dashboard::commands::run(args).await
}
