//! `dispatch`: run a task manifest to completion through the dispatcher.

mod config_load;
mod manifest;
mod run_cmd;

use clap::Parser;

#[derive(Parser)]
#[command(name = "dispatch", about = "Concurrent task dispatcher", version)]
struct Cli {
    /// Path to a TOML task manifest.
    manifest: String,

    /// Cancel and reclaim a task if it runs longer than this many seconds.
    #[arg(long)]
    straggler_deadline_secs: Option<u64>,

    /// Path to a dispatch.toml config file. Defaults to
    /// `$XDG_CONFIG_HOME/dispatch/dispatch.toml` (or the platform
    /// equivalent) if present.
    #[arg(long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let defaults = config_load::load(cli.config.as_deref()).await?;
    run_cmd::run(run_cmd::RunArgs {
        manifest_path: cli.manifest,
        straggler_deadline_secs: cli.straggler_deadline_secs,
        defaults,
    })
    .await
}
