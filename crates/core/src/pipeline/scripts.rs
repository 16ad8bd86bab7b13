//! JS bundling via the configured bundler collaborator
//!
//! One entry module is bundled and transpiled per variant: the dev bundle
//! keeps a source map, the production bundle is minified without one.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::configs::ToolSpec;
use crate::execution::process::run_tool;
use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::types::SiteResult;

const TRANSPILE_TARGET: &str = "es2015";

pub struct JsBundle {
    tool: ToolSpec,
    entry: PathBuf,
    out: PathBuf,
    minify: bool,
    source_map: bool,
}

impl JsBundle {
    pub fn new(tool: ToolSpec, entry: PathBuf, out: PathBuf, minify: bool, source_map: bool) -> Self {
        Self {
            tool,
            entry,
            out,
            minify,
            source_map,
        }
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec![
            self.entry.display().to_string(),
            "--bundle".to_string(),
            format!("--target={TRANSPILE_TARGET}"),
            format!("--outfile={}", self.out.display()),
        ];
        if self.minify {
            args.push("--minify".to_string());
        }
        if self.source_map {
            args.push("--sourcemap".to_string());
        }
        args
    }
}

#[async_trait]
impl Action for JsBundle {
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

    #[test]
    fn dev_bundle_keeps_a_source_map() {
        let bundle = JsBundle::new(
            ToolSpec::new("esbuild"),
            PathBuf::from("assets/js/index.js"),
            PathBuf::from("dev/assets/js/app.min.js"),
            false,
            true,
        );
        assert_eq!(
            bundle.args(),
            vec![
                "assets/js/index.js",
                "--bundle",
                "--target=es2015",
                "--outfile=dev/assets/js/app.min.js",
                "--sourcemap",
            ]
        );
    }

    #[test]
    fn production_bundle_is_minified_without_a_source_map() {
        let bundle = JsBundle::new(
            ToolSpec::new("esbuild"),
            PathBuf::from("assets/js/index.js"),
            PathBuf::from("dist/assets/js/app.min.js"),
            true,
            false,
        );
        let args = bundle.args();
        assert!(args.contains(&"--minify".to_string()));
        assert!(!args.contains(&"--sourcemap".to_string()));
    }
}
