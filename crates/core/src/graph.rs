//! Task graph: named tasks with leaf, sequence and parallel kinds
//!
//! The graph is built once at startup and immutable afterwards. Composite
//! tasks may only reference children that are already registered, so the
//! graph is acyclic by construction.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::execution::runner::TaskRunner;
use crate::types::{SiteError, SiteResult};

/// Terminal signal of a task run.
///
/// `Started` covers the long-running watch/serve leaves: the operation is up
/// and will outlive the run, so the owning task counts as complete once it is
/// successfully started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Started,
}

impl Outcome {
    /// Combine child outcomes: a composite is `Started` if any child is.
    pub fn merge(self, other: Outcome) -> Outcome {
        if self == Outcome::Started || other == Outcome::Started {
            Outcome::Started
        } else {
            Outcome::Finished
        }
    }
}

/// A leaf task's operation.
///
/// The runner does not interpret the action's behavior, only its outcome.
/// Actions that need to re-enter the graph (the file watcher re-running
/// tasks on change) go through the runner they are handed.
#[async_trait]
pub trait Action: Send + Sync {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome>;
}

pub enum TaskKind {
    Leaf(Box<dyn Action>),
    Sequence(Vec<String>),
    Parallel(Vec<String>),
}

impl TaskKind {
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Leaf(_) => "leaf",
            TaskKind::Sequence(_) => "sequence",
            TaskKind::Parallel(_) => "parallel",
        }
    }

    pub fn children(&self) -> Option<&[String]> {
        match self {
            TaskKind::Leaf(_) => None,
            TaskKind::Sequence(children) | TaskKind::Parallel(children) => Some(children),
        }
    }
}

pub struct Task {
    pub name: String,
    pub kind: TaskKind,
}

/// The registry of named tasks.
#[derive(Default)]
pub struct TaskGraph {
    tasks: HashMap<String, Task>,
    /// Registration order, kept for listings.
    order: Vec<String>,
}

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a leaf task backed by `action`.
    pub fn leaf(&mut self, name: &str, action: impl Action + 'static) -> SiteResult<()> {
        self.register(name, TaskKind::Leaf(Box::new(action)))
    }

    /// Register a sequence task; children run in declared order.
    pub fn sequence(&mut self, name: &str, children: &[&str]) -> SiteResult<()> {
        let children = self.resolve_children(name, children)?;
        self.register(name, TaskKind::Sequence(children))
    }

    /// Register a parallel task; children run concurrently.
    pub fn parallel(&mut self, name: &str, children: &[&str]) -> SiteResult<()> {
        let children = self.resolve_children(name, children)?;
        self.register(name, TaskKind::Parallel(children))
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    /// Task names in registration order.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    fn register(&mut self, name: &str, kind: TaskKind) -> SiteResult<()> {
        if self.tasks.contains_key(name) {
            return Err(SiteError::DuplicateTask(name.to_string()));
        }
        self.tasks.insert(
            name.to_string(),
            Task {
                name: name.to_string(),
                kind,
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }

    /// Children of a composite must already be registered; this forbids
    /// forward references and therefore cycles.
    fn resolve_children(&self, name: &str, children: &[&str]) -> SiteResult<Vec<String>> {
        let mut resolved = Vec::with_capacity(children.len());
        for child in children {
            if !self.tasks.contains_key(*child) {
                return Err(SiteError::UnknownChild {
                    task: name.to_string(),
                    child: (*child).to_string(),
                });
            }
            resolved.push((*child).to_string());
        }
        Ok(resolved)
    }
}
