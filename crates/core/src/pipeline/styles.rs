//! Style-sheet compilation and minification
//!
//! Both steps delegate to external collaborators: the configured style
//! compiler turns the entry sheet into expanded CSS, the bundler's CSS mode
//! produces the minified production sheet.

use std::path::PathBuf;

use async_trait::async_trait;
use colored::*;

use crate::configs::ToolSpec;
use crate::execution::process::run_tool;
use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::types::SiteResult;

/// Compile one entry style sheet. Paths are relative to the project root.
pub struct StyleCompile {
    tool: ToolSpec,
    entry: PathBuf,
    out: PathBuf,
    source_map: bool,
    /// Report compiler failures to the console instead of failing the task,
    /// so a broken style sheet does not tear down the watch/serve loop.
    lenient: bool,
}

impl StyleCompile {
    pub fn new(tool: ToolSpec, entry: PathBuf, out: PathBuf, source_map: bool, lenient: bool) -> Self {
        Self {
            tool,
            entry,
            out,
            source_map,
            lenient,
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "--style=expanded".to_string(),
            if self.source_map {
                "--source-map".to_string()
            } else {
                "--no-source-map".to_string()
            },
            self.entry.display().to_string(),
            self.out.display().to_string(),
        ]
    }
}

#[async_trait]
impl Action for StyleCompile {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = &runner.context().root;
        if let Some(parent) = root.join(&self.out).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        match run_tool(&self.tool, &self.args(), root).await {
            Ok(()) => Ok(Outcome::Finished),
            Err(err) if self.lenient => {
                eprintln!("{} {}", "Style compiler error:".red().bold(), err);
                Ok(Outcome::Finished)
            }
            Err(err) => Err(err),
        }
    }
}

/// Minify a compiled style sheet into the production tree.
pub struct CssMinify {
    tool: ToolSpec,
    src: PathBuf,
    out: PathBuf,
}

impl CssMinify {
    pub fn new(tool: ToolSpec, src: PathBuf, out: PathBuf) -> Self {
        Self { tool, src, out }
    }

    fn args(&self) -> Vec<String> {
        vec![
            self.src.display().to_string(),
            "--minify".to_string(),
            format!("--outfile={}", self.out.display()),
        ]
    }
}

#[async_trait]
impl Action for CssMinify {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = &runner.context().root;
        if let Some(parent) = root.join(&self.out).parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        run_tool(&self.tool, &self.args(), root).await?;
        Ok(Outcome::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::SiteConfig;
    use crate::execution::runner::BuildContext;
    use crate::graph::TaskGraph;

    #[test]
    fn compile_args_toggle_source_maps() {
        let with_maps = StyleCompile::new(
            ToolSpec::new("sass"),
            PathBuf::from("assets/scss/app.scss"),
            PathBuf::from("assets/css/app.css"),
            true,
            true,
        );
        assert_eq!(
            with_maps.args(),
            vec![
                "--style=expanded",
                "--source-map",
                "assets/scss/app.scss",
                "assets/css/app.css",
            ]
        );

        let without_maps = StyleCompile::new(
            ToolSpec::new("sass"),
            PathBuf::from("assets/scss/bootstrap/bootstrap-grid.scss"),
            PathBuf::from("assets/css/bootstrap-grid.css"),
            false,
            false,
        );
        assert!(without_maps.args().contains(&"--no-source-map".to_string()));
    }

    #[test]
    fn minify_args_target_the_production_sheet() {
        let minify = CssMinify::new(
            ToolSpec::new("esbuild"),
            PathBuf::from("assets/css/app.css"),
            PathBuf::from("dist/assets/css/app.min.css"),
        );
        assert_eq!(
            minify.args(),
            vec![
                "assets/css/app.css",
                "--minify",
                "--outfile=dist/assets/css/app.min.css",
            ]
        );
    }

    #[tokio::test]
    async fn lenient_compile_swallows_collaborator_failure() {
        let dir = tempfile::tempdir().unwrap();
        // A "compiler" that always fails.
        let tool = ToolSpec {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 1".to_string()],
        };
        let lenient = StyleCompile::new(
            tool.clone(),
            PathBuf::from("app.scss"),
            PathBuf::from("out/app.css"),
            false,
            true,
        );
        let strict = StyleCompile::new(
            tool,
            PathBuf::from("app.scss"),
            PathBuf::from("out/app.css"),
            false,
            false,
        );

        let mut graph = TaskGraph::new();
        graph.leaf("lenient", lenient).unwrap();
        graph.leaf("strict", strict).unwrap();
        let runner = TaskRunner::new(
            graph,
            BuildContext::new(dir.path().to_path_buf(), SiteConfig::default()),
        );

        assert_eq!(runner.run("lenient").await.unwrap(), Outcome::Finished);
        runner.run("strict").await.unwrap_err();
    }
}
