//! Glob-based file copying
//!
//! A copy job is a list of copy specs executed concurrently. Each spec walks
//! one source root, matches root-relative paths against include/exclude
//! globs, and either flattens matches into the destination or preserves
//! their layout.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future;
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::types::SiteResult;

/// Directories never descended into while walking a source root.
const SKIP_DIRS: &[&str] = &[".git", "node_modules", "target"];

/// One source-to-destination copy, paths relative to the project root.
pub struct CopySpec {
    /// Walk root. A root that does not exist yields an empty match set.
    pub root: PathBuf,
    /// Globs matched against paths relative to `root`. `*` does not cross
    /// path separators; `**` does.
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub dest: PathBuf,
    /// Copy matches by file name only instead of preserving their layout
    /// relative to `root`.
    pub flatten: bool,
}

struct CompiledSpec {
    root: PathBuf,
    include: GlobSet,
    exclude: GlobSet,
    dest: PathBuf,
    flatten: bool,
}

pub struct CopyFiles {
    specs: Vec<CompiledSpec>,
}

impl CopyFiles {
    pub fn new(specs: Vec<CopySpec>) -> SiteResult<Self> {
        let specs = specs
            .into_iter()
            .map(|spec| {
                Ok(CompiledSpec {
                    include: build_globset(&spec.include)?,
                    exclude: build_globset(&spec.exclude)?,
                    root: spec.root,
                    dest: spec.dest,
                    flatten: spec.flatten,
                })
            })
            .collect::<SiteResult<Vec<_>>>()?;
        Ok(Self { specs })
    }
}

#[async_trait]
impl Action for CopyFiles {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = &runner.context().root;
        future::try_join_all(self.specs.iter().map(|spec| spec.copy(root))).await?;
        Ok(Outcome::Finished)
    }
}

impl CompiledSpec {
    async fn copy(&self, project_root: &Path) -> SiteResult<()> {
        let source_root = project_root.join(&self.root);
        if !source_root.exists() {
            return Ok(());
        }
        let dest_root = project_root.join(&self.dest);

        for rel in walk_matches(&source_root, &self.include, &self.exclude)? {
            let target = if self.flatten {
                let Some(name) = rel.file_name() else { continue };
                dest_root.join(name)
            } else {
                dest_root.join(&rel)
            };
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(source_root.join(&rel), &target).await?;
        }
        Ok(())
    }
}

pub(crate) fn build_globset(patterns: &[String]) -> SiteResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    Ok(builder.build()?)
}

/// Breadth-first walk of `root`, returning root-relative paths of files that
/// match `include` and not `exclude`, sorted for deterministic copy order.
pub(crate) fn walk_matches(
    root: &Path,
    include: &GlobSet,
    exclude: &GlobSet,
) -> SiteResult<Vec<PathBuf>> {
    let mut matches = Vec::new();
    let mut queue = VecDeque::new();
    queue.push_back(root.to_path_buf());

    while let Some(current) = queue.pop_front() {
        let Ok(entries) = std::fs::read_dir(&current) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();

            if path.is_dir() {
                let skip = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| SKIP_DIRS.contains(&name));
                if !skip && !exclude.is_match(&rel) {
                    queue.push_back(path);
                }
            } else if include.is_match(&rel) && !exclude.is_match(&rel) {
                matches.push(rel);
            }
        }
    }

    matches.sort();
    Ok(matches)
}
