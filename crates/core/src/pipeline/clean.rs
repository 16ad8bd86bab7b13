use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::types::SiteResult;

/// Deletes previous build output. Paths that do not exist are skipped.
pub struct Clean {
    paths: Vec<PathBuf>,
}

impl Clean {
    /// `paths` are relative to the project root; files and directory trees
    /// are both accepted.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

#[async_trait]
impl Action for Clean {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        for path in &self.paths {
            let path = runner.context().root.join(path);
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(&path).await?,
                Ok(_) => tokio::fs::remove_file(&path).await?,
                Err(err) if err.kind() == ErrorKind::NotFound => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Ok(Outcome::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::SiteConfig;
    use crate::execution::runner::BuildContext;
    use crate::graph::TaskGraph;

    fn runner_at(root: &std::path::Path, action: impl Action + 'static) -> TaskRunner {
        let mut graph = TaskGraph::new();
        graph.leaf("clean", action).unwrap();
        TaskRunner::new(
            graph,
            BuildContext::new(root.to_path_buf(), SiteConfig::default()),
        )
    }

    #[tokio::test]
    async fn removes_files_and_directory_trees() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("dist/assets")).unwrap();
        std::fs::write(dir.path().join("dist/assets/app.css"), "body {}").unwrap();
        std::fs::write(dir.path().join("stale.css"), "body {}").unwrap();

        let clean = Clean::new(vec![PathBuf::from("dist"), PathBuf::from("stale.css")]);
        let runner = runner_at(dir.path(), clean);
        runner.run("clean").await.unwrap();

        assert!(!dir.path().join("dist").exists());
        assert!(!dir.path().join("stale.css").exists());
    }

    #[tokio::test]
    async fn missing_paths_are_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let clean = Clean::new(vec![PathBuf::from("dev"), PathBuf::from("dist")]);
        let runner = runner_at(dir.path(), clean);
        runner.run("clean").await.unwrap();
    }
}
