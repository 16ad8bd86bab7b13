//! HTML preprocessing
//!
//! Three transforms, applied in order by [`HtmlPipeline`]:
//!
//! 1. build-block replacement: `<!-- build:KEY --> ... <!-- endbuild -->`
//!    becomes a script/link tag pointing at the production asset,
//! 2. include expansion: `@@include('relative/path.html')`, resolved against
//!    the including file and indented to the directive's column,
//! 3. whitespace collapsing for the production variant.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use async_trait::async_trait;
use globset::GlobSet;
use regex::Regex;

use crate::execution::runner::TaskRunner;
use crate::graph::{Action, Outcome};
use crate::pipeline::copy::{build_globset, walk_matches};
use crate::types::{SiteError, SiteResult};

const MAX_INCLUDE_DEPTH: usize = 10;

fn include_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"@@include\(\s*'([^']+)'\s*\)").expect("static pattern")
    })
}

fn build_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<!--\s*build:(\w+)\s*-->.*?<!--\s*endbuild\s*-->").expect("static pattern")
    })
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\s+").expect("static pattern")
    })
}

fn between_tags_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r">\s+<").expect("static pattern")
    })
}

/// Expand `@@include('path')` directives, resolving paths against `dir`.
pub fn expand_includes(source: &str, dir: &Path) -> SiteResult<String> {
    expand_includes_at(source, dir, 0)
}

fn expand_includes_at(source: &str, dir: &Path, depth: usize) -> SiteResult<String> {
    if depth > MAX_INCLUDE_DEPTH {
        return Err(SiteError::Pipeline(format!(
            "include depth exceeds {MAX_INCLUDE_DEPTH} under {} (circular include?)",
            dir.display()
        )));
    }

    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        let Some(caps) = include_re().captures(line) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };
        let (Some(whole), Some(rel)) = (caps.get(0), caps.get(1)) else {
            out.push_str(line);
            out.push('\n');
            continue;
        };

        let path = dir.join(rel.as_str());
        let included = std::fs::read_to_string(&path).map_err(|err| {
            SiteError::Pipeline(format!("cannot include '{}': {err}", path.display()))
        })?;
        let parent = path.parent().unwrap_or(dir);
        let expanded = expand_includes_at(&included, parent, depth + 1)?;

        let indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
        out.push_str(&line[..whole.start()]);
        for (i, inc_line) in expanded.lines().enumerate() {
            if i > 0 {
                out.push('\n');
                out.push_str(&indent);
            }
            out.push_str(inc_line);
        }
        out.push_str(&line[whole.end()..]);
        out.push('\n');
    }
    Ok(out)
}

/// Replace `<!-- build:KEY -->...<!-- endbuild -->` blocks with a reference
/// to the asset mapped under KEY. Blocks with no mapping are dropped.
pub fn replace_build_blocks(source: &str, replacements: &HashMap<String, String>) -> String {
    build_block_re()
        .replace_all(source, |caps: &regex::Captures<'_>| {
            let key = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            match replacements.get(key) {
                Some(asset) => asset_tag(asset),
                None => String::new(),
            }
        })
        .into_owned()
}

fn asset_tag(asset: &str) -> String {
    if asset.ends_with(".css") {
        format!(r#"<link rel="stylesheet" href="{asset}">"#)
    } else {
        format!(r#"<script src="{asset}"></script>"#)
    }
}

/// Collapse whitespace runs and inter-tag whitespace.
pub fn collapse_whitespace(source: &str) -> String {
    let collapsed = whitespace_re().replace_all(source, " ");
    let collapsed = between_tags_re().replace_all(&collapsed, "><");
    collapsed.trim().to_string()
}

/// Processes page files into an output tree.
pub struct HtmlPipeline {
    include: GlobSet,
    dest: PathBuf,
    replacements: Option<HashMap<String, String>>,
    minify: bool,
}

impl HtmlPipeline {
    pub fn new(
        globs: &[String],
        dest: PathBuf,
        replacements: Option<HashMap<String, String>>,
        minify: bool,
    ) -> SiteResult<Self> {
        Ok(Self {
            include: build_globset(globs)?,
            dest,
            replacements,
            minify,
        })
    }
}

#[async_trait]
impl Action for HtmlPipeline {
    async fn run(&self, runner: &TaskRunner) -> SiteResult<Outcome> {
        let root = runner.context().root.clone();
        let dest_root = root.join(&self.dest);

        for rel in walk_matches(&root, &self.include, &GlobSet::empty())? {
            let source_path = root.join(&rel);
            let mut content = tokio::fs::read_to_string(&source_path).await?;

            if let Some(replacements) = &self.replacements {
                content = replace_build_blocks(&content, replacements);
            }
            let dir = source_path.parent().unwrap_or(&root);
            content = expand_includes(&content, dir)?;
            if self.minify {
                content = collapse_whitespace(&content);
            }

            let target = dest_root.join(&rel);
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&target, content).await?;
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

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn expands_includes_with_indentation() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "partials/header.html",
            "<header>\n  <h1>Site</h1>\n</header>",
        );
        let source = "<body>\n  @@include('partials/header.html')\n</body>\n";

        let out = expand_includes(source, dir.path()).unwrap();
        assert_eq!(out, "<body>\n  <header>\n    <h1>Site</h1>\n  </header>\n</body>\n");
    }

    #[test]
    fn includes_resolve_relative_to_the_including_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "partials/nav.html", "<nav></nav>");
        write(
            dir.path(),
            "partials/header.html",
            "@@include('nav.html')",
        );
        let source = "@@include('partials/header.html')\n";

        let out = expand_includes(source, dir.path()).unwrap();
        assert_eq!(out, "<nav></nav>\n");
    }

    #[test]
    fn missing_include_is_a_pipeline_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = expand_includes("@@include('absent.html')", dir.path()).unwrap_err();
        assert!(matches!(err, SiteError::Pipeline(_)));
        assert!(err.to_string().contains("absent.html"));
    }

    #[test]
    fn circular_includes_hit_the_depth_guard() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "loop.html", "@@include('loop.html')");
        let err = expand_includes("@@include('loop.html')", dir.path()).unwrap_err();
        assert!(err.to_string().contains("circular"));
    }

    #[test]
    fn replaces_known_build_blocks() {
        let mut replacements = HashMap::new();
        replacements.insert("js".to_string(), "assets/js/app.min.js".to_string());
        replacements.insert("css".to_string(), "assets/css/app.min.css".to_string());
        let source = "<!-- build:css -->\n<link href=\"assets/css/app.css\">\n<!-- endbuild -->\n<!-- build:js -->\n<script src=\"assets/js/app.js\"></script>\n<!-- endbuild -->";

        let out = replace_build_blocks(source, &replacements);
        assert!(out.contains(r#"<link rel="stylesheet" href="assets/css/app.min.css">"#));
        assert!(out.contains(r#"<script src="assets/js/app.min.js"></script>"#));
        assert!(!out.contains("app.css\""));
    }

    #[test]
    fn unmapped_build_blocks_are_dropped() {
        let out = replace_build_blocks(
            "keep<!-- build:remove -->\ngone\n<!-- endbuild -->me",
            &HashMap::new(),
        );
        assert_eq!(out, "keepme");
    }

    #[test]
    fn collapses_whitespace_between_tags() {
        let out = collapse_whitespace("<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n");
        assert_eq!(out, "<ul><li>one</li><li>two</li></ul>");
    }

    #[tokio::test]
    async fn pipeline_processes_pages_into_the_output_tree() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "partials/header.html", "<header></header>");
        write(
            dir.path(),
            "index.html",
            "<!-- build:js -->\n<script src=\"assets/js/app.js\"></script>\n<!-- endbuild -->\n@@include('partials/header.html')\n",
        );

        let mut replacements = HashMap::new();
        replacements.insert("js".to_string(), "assets/js/app.min.js".to_string());
        let action = HtmlPipeline::new(
            &["*.html".to_string()],
            PathBuf::from("dist"),
            Some(replacements),
            true,
        )
        .unwrap();

        let mut graph = TaskGraph::new();
        graph.leaf("html:build", action).unwrap();
        let runner = TaskRunner::new(
            graph,
            BuildContext::new(dir.path().to_path_buf(), SiteConfig::default()),
        );
        runner.run("html:build").await.unwrap();

        let out = std::fs::read_to_string(dir.path().join("dist/index.html")).unwrap();
        assert_eq!(
            out,
            r#"<script src="assets/js/app.min.js"></script><header></header>"#
        );
        // Partials are fragments, not pages.
        assert!(!dir.path().join("dist/partials").exists());
    }
}
