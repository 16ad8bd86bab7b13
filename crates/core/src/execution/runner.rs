//! High-level task runner
//!
//! Interprets the task graph: leaves delegate to their action, sequences run
//! children in declared order and stop at the first failure, parallel groups
//! start all children concurrently and report after every started child has
//! finished. A failing sibling never cancels the others; the runner accepts
//! wasted work over partial results.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use colored::*;
use futures::future::{self, BoxFuture};
use tokio::sync::broadcast;

use crate::configs::SiteConfig;
use crate::graph::{Outcome, TaskGraph, TaskKind};
use crate::types::{SiteError, SiteResult};

/// Shared state of one build invocation: the project root, the loaded
/// configuration and the live-reload broadcast channel connecting the watch
/// and serve tasks.
pub struct BuildContext {
    pub root: PathBuf,
    pub config: SiteConfig,
    reload: broadcast::Sender<()>,
}

impl BuildContext {
    pub fn new(root: PathBuf, config: SiteConfig) -> Self {
        let (reload, _) = broadcast::channel(16);
        Self { root, config, reload }
    }

    pub fn reload_sender(&self) -> broadcast::Sender<()> {
        self.reload.clone()
    }
}

/// Executes tasks from an immutable graph.
///
/// Cheap to clone; long-running actions clone the runner into spawned tasks
/// to re-enter the graph (the watcher re-running pipeline tasks on change).
#[derive(Clone)]
pub struct TaskRunner {
    graph: Arc<TaskGraph>,
    ctx: Arc<BuildContext>,
}

impl TaskRunner {
    pub fn new(graph: TaskGraph, ctx: BuildContext) -> Self {
        Self {
            graph: Arc::new(graph),
            ctx: Arc::new(ctx),
        }
    }

    pub fn context(&self) -> &BuildContext {
        &self.ctx
    }

    pub fn graph(&self) -> &TaskGraph {
        &self.graph
    }

    /// Run a named task to its terminal signal.
    ///
    /// Returned boxed so composite evaluation can recurse and so callers can
    /// move the future into spawned tasks.
    pub fn run(&self, name: &str) -> BoxFuture<'static, SiteResult<Outcome>> {
        let runner = self.clone();
        let name = name.to_string();
        Box::pin(async move { runner.run_named(&name).await })
    }

    async fn run_named(&self, name: &str) -> SiteResult<Outcome> {
        let Some(task) = self.graph.get(name) else {
            return Err(SiteError::UnknownTask(name.to_string()));
        };

        println!("{} '{}'...", "Starting".dimmed(), name.cyan());
        let started = Instant::now();
        let result = self.run_kind(&task.kind).await;
        match &result {
            Ok(_) => println!(
                "{} '{}' {}",
                "Finished".dimmed(),
                name.cyan(),
                format!("after {}", fmt_duration(started.elapsed())).dimmed()
            ),
            Err(err) => println!(
                "{} '{}' after {}: {}",
                "Errored".red().bold(),
                name.cyan(),
                fmt_duration(started.elapsed()),
                err
            ),
        }
        result
    }

    async fn run_kind(&self, kind: &TaskKind) -> SiteResult<Outcome> {
        match kind {
            TaskKind::Leaf(action) => action.run(self).await,
            TaskKind::Sequence(children) => {
                let mut outcome = Outcome::Finished;
                for child in children {
                    outcome = outcome.merge(self.run(child).await?);
                }
                Ok(outcome)
            }
            TaskKind::Parallel(children) => {
                let results = future::join_all(children.iter().map(|child| self.run(child))).await;
                let mut outcome = Outcome::Finished;
                let mut failure = None;
                for result in results {
                    match result {
                        Ok(child_outcome) => outcome = outcome.merge(child_outcome),
                        Err(err) => {
                            if failure.is_none() {
                                failure = Some(err);
                            }
                        }
                    }
                }
                match failure {
                    Some(err) => Err(err),
                    None => Ok(outcome),
                }
            }
        }
    }
}

fn fmt_duration(elapsed: Duration) -> String {
    if elapsed.as_secs() >= 1 {
        format!("{:.2} s", elapsed.as_secs_f64())
    } else {
        format!("{} ms", elapsed.as_millis())
    }
}
