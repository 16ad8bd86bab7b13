use anyhow::Result;
use colored::*;
use sitekit_core::execution::runner::TaskRunner;
use sitekit_core::graph::Outcome;

pub async fn execute(runner: &TaskRunner, task: &str) -> Result<()> {
    println!("{} {}", "Running task".bold(), task.cyan());
    println!();

    let outcome = runner
        .run(task)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to run task: {}", e))?;

    if outcome == Outcome::Started {
        // Watcher/server are up; the run owns the process from here.
        println!();
        println!("{}", "Long-running tasks started. Press Ctrl-C to stop.".dimmed());
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }

    println!();
    println!(
        "{} {}",
        "✓".green().bold(),
        "All tasks completed successfully!".green().bold()
    );
    Ok(())
}
