//! File watching
//!
//! Watches the project root recursively and maps changed paths to task lists
//! through glob rules. Matched tasks run in declared order through the
//! runner; a failing task is reported and watching continues. The watch task
//! itself completes once the watcher is registered.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use colored::*;
use globset::GlobSet;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::pipeline::copy::build_globset;
use crate::types::SiteResult;

/// Events arriving within this window after the first one are handled as a
/// single change (editors tend to produce bursts).
const DEBOUNCE: Duration = Duration::from_millis(250);

/// Maps a group of source globs to the tasks rerun when one of them changes.
pub struct WatchRule {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub tasks: Vec<String>,
}

struct CompiledRule {
    include: GlobSet,
    exclude: GlobSet,
    tasks: Vec<String>,
}

impl CompiledRule {
    fn matches(&self, rel: &Path) -> bool {
        self.include.is_match(rel) && !self.exclude.is_match(rel)
    }
}

pub struct Watch {
    rules: Arc<Vec<CompiledRule>>,
}

impl Watch {
    pub fn new(rules: Vec<WatchRule>) -> SiteResult<Self> {
        let rules = rules
            .into_iter()
            .map(|rule| {
                Ok(CompiledRule {
                    include: build_globset(&rule.include)?,
                    exclude: build_globset(&rule.exclude)?,
                    tasks: rule.tasks,
                })
            })
            .collect::<SiteResult<Vec<_>>>()?;
        Ok(Self {
            rules: Arc::new(rules),
        })
    }
}

#[async_trait]
impl Action for Watch {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = tokio::fs::canonicalize(&runner.context().root).await?;
        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |result: notify::Result<Event>| {
                if let Ok(event) = result {
                    match event.kind {
                        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) => {}
                        _ => return,
                    }
                    for path in event.paths {
                        let _ = tx.send(path);
                    }
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&root, RecursiveMode::Recursive)?;
        println!("{} {}", "Watching".green().bold(), root.display());

        let runner = runner.clone();
        let rules = Arc::clone(&self.rules);
        tokio::spawn(async move {
            // The watcher stops when dropped; it lives as long as this loop.
            let _watcher = watcher;
            while let Some(first) = rx.recv().await {
                let mut changed = vec![first];
                let deadline = tokio::time::sleep(DEBOUNCE);
                tokio::pin!(deadline);
                loop {
                    tokio::select! {
                        () = &mut deadline => break,
                        more = rx.recv() => match more {
                            Some(path) => changed.push(path),
                            None => break,
                        },
                    }
                }

                for rule in rules.iter() {
                    let hit = changed.iter().any(|path| {
                        path.strip_prefix(&root)
                            .map(|rel| rule.matches(rel))
                            .unwrap_or(false)
                    });
                    if !hit {
                        continue;
                    }
                    for task in &rule.tasks {
                        if let Err(err) = runner.run(task).await {
                            eprintln!("{} {}", "Watch task failed:".red().bold(), err);
                        }
                    }
                }
            }
        });

        Ok(Outcome::Started)
    }
}
