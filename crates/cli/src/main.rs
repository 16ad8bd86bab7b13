use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use sitekit_core::configs::SiteConfig;
use sitekit_core::execution::runner::{BuildContext, TaskRunner};
use sitekit_core::site::build_graph;

mod commands;

/// Sitekit - a static-site asset build tool
#[derive(Parser)]
#[command(name = "sitekit")]
#[command(about = "Build, watch and serve static-site assets")]
#[command(version)]
struct Cli {
    /// Task to run (e.g. `dev`, `build`, `clean`)
    #[arg(default_value = "default")]
    task: String,

    /// Path to the project root (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// List registered tasks instead of running one
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = SiteConfig::load(&cli.workspace)
        .map_err(|e| anyhow::anyhow!("Failed to load site configuration: {}", e))?;
    let ctx = BuildContext::new(cli.workspace, config);
    let graph =
        build_graph(&ctx).map_err(|e| anyhow::anyhow!("Failed to build task graph: {}", e))?;
    let runner = TaskRunner::new(graph, ctx);

    if cli.list {
        return commands::list::execute(&runner);
    }
    commands::run::execute(&runner, &cli.task).await
}
