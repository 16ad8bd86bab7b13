//! The build definition
//!
//! Registers every named task of the site pipeline: housekeeping, vendor
//! staging, style/script compilation for the two output variants, HTML
//! processing, and the watch/serve pair that keeps a dev session alive.
//! Composite tasks are registered after their children, bottom-up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::configs::SourceConfig;
use crate::execution::runner::BuildContext;
use crate::graph::TaskGraph;
use crate::pipeline::{
    Clean, CopyFiles, CopySpec, CssMinify, HtmlPipeline, JsBundle, Reload, Serve, StyleCompile,
    Watch, WatchRule,
};
use crate::types::SiteResult;

/// Both variants emit the bundle under this name; the dev variant only
/// differs in minification and source maps.
const BUNDLE_NAME: &str = "app.min.js";

/// Build the full task graph for one site.
pub fn build_graph(ctx: &BuildContext) -> SiteResult<TaskGraph> {
    let config = &ctx.config;
    let source = &config.source;
    let output = &config.output;

    let compiled_css = source.compiled_css();
    let css_name = compiled_css
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app.css".to_string());
    let css_stem = compiled_css
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "app".to_string());
    let min_css_name = format!("{css_stem}.min.css");

    let mut graph = TaskGraph::new();

    graph.leaf(
        "clean",
        Clean::new(vec![
            output.dev_dir.clone(),
            output.dist_dir.clone(),
            compiled_css.clone(),
        ]),
    )?;

    // Vendor trees into the source tree.
    graph.leaf(
        "vendor:js",
        CopyFiles::new(vec![
            CopySpec {
                root: source.vendor_dir.join("bootstrap/dist/js"),
                include: vec!["*".to_string()],
                exclude: vec![],
                dest: source.vendor_js_dir.clone(),
                flatten: true,
            },
            CopySpec {
                root: source.vendor_dir.join("jquery/dist"),
                include: vec!["*".to_string()],
                exclude: vec!["core.js".to_string()],
                dest: source.vendor_js_dir.clone(),
                flatten: true,
            },
            CopySpec {
                root: source.vendor_dir.join("popper.js/dist/umd"),
                include: vec!["popper.*".to_string()],
                exclude: vec![],
                dest: source.vendor_js_dir.clone(),
                flatten: true,
            },
        ])?,
    )?;
    graph.leaf(
        "vendor:fonts",
        CopyFiles::new(vec![CopySpec {
            root: source.vendor_dir.join("font-awesome"),
            include: vec!["**".to_string()],
            exclude: vec![
                "less".to_string(),
                "less/**".to_string(),
                "scss".to_string(),
                "scss/**".to_string(),
                ".*".to_string(),
                "*.txt".to_string(),
                "*.json".to_string(),
                "*.md".to_string(),
            ],
            dest: source.fonts_dir.clone(),
            flatten: false,
        }])?,
    )?;
    graph.parallel("vendor", &["vendor:fonts", "vendor:js"])?;

    // Styles.
    graph.leaf(
        "bootstrap:scss",
        CopyFiles::new(vec![CopySpec {
            root: source.vendor_dir.join("bootstrap/scss"),
            include: vec!["**".to_string()],
            exclude: vec![],
            dest: source.scss_dir.join("bootstrap"),
            flatten: false,
        }])?,
    )?;
    graph.leaf(
        "scss:compile",
        StyleCompile::new(
            config.tools.style.clone(),
            source.style_entry.clone(),
            compiled_css.clone(),
            true,
            true,
        ),
    )?;
    graph.sequence("scss", &["bootstrap:scss", "scss:compile"])?;
    graph.leaf(
        "scss:grid",
        StyleCompile::new(
            config.tools.style.clone(),
            source.grid_entry.clone(),
            source.css_dir.join("bootstrap-grid.css"),
            false,
            false,
        ),
    )?;

    // Dev variant.
    graph.leaf(
        "css:dev:stage",
        CopyFiles::new(vec![CopySpec {
            root: source.css_dir.clone(),
            include: vec![css_name],
            exclude: vec![],
            dest: output.dev_dir.join(&source.css_dir),
            flatten: true,
        }])?,
    )?;
    graph.sequence("css:dev", &["scss", "css:dev:stage"])?;
    graph.leaf(
        "js:dev",
        JsBundle::new(
            config.tools.bundler.clone(),
            source.js_entry.clone(),
            output.dev_dir.join(&source.js_dir).join(BUNDLE_NAME),
            false,
            true,
        ),
    )?;
    graph.leaf(
        "html:dev",
        HtmlPipeline::new(&source.html_globs, output.dev_dir.clone(), None, false)?,
    )?;
    graph.leaf(
        "vendor:dev",
        CopyFiles::new(vendor_stage_specs(source, &output.dev_dir))?,
    )?;

    // Production variant.
    graph.leaf(
        "css:build:minify",
        CssMinify::new(
            config.tools.bundler.clone(),
            compiled_css,
            output.dist_dir.join(&source.css_dir).join(&min_css_name),
        ),
    )?;
    graph.sequence("css:build", &["scss", "css:build:minify"])?;
    graph.leaf(
        "js:build",
        JsBundle::new(
            config.tools.bundler.clone(),
            source.js_entry.clone(),
            output.dist_dir.join(&source.js_dir).join(BUNDLE_NAME),
            true,
            false,
        ),
    )?;
    graph.leaf(
        "vendor:build",
        CopyFiles::new(vendor_stage_specs(source, &output.dist_dir))?,
    )?;
    let mut replacements = HashMap::new();
    replacements.insert(
        "js".to_string(),
        source.js_dir.join(BUNDLE_NAME).display().to_string(),
    );
    replacements.insert(
        "css".to_string(),
        source.css_dir.join(&min_css_name).display().to_string(),
    );
    graph.leaf(
        "html:build",
        HtmlPipeline::new(
            &source.html_globs,
            output.dist_dir.clone(),
            Some(replacements),
            true,
        )?,
    )?;

    // Raw page/image copies into the output trees.
    graph.leaf("assets:dev", CopyFiles::new(asset_specs(source, &output.dev_dir))?)?;
    graph.leaf("assets:build", CopyFiles::new(asset_specs(source, &output.dist_dir))?)?;

    // Top-level pipelines.
    graph.parallel("dev:compile", &["css:dev", "js:dev", "vendor"])?;
    graph.sequence("dev:build", &["dev:compile", "vendor:dev", "assets:dev"])?;
    graph.parallel("prod:compile", &["css:build", "js:build", "vendor"])?;
    graph.sequence("prod:build", &["prod:compile", "vendor:build", "assets:build"])?;

    // Watch and serve.
    graph.leaf("browsersync", Serve::new(output.dev_dir.clone(), config.server.port))?;
    graph.leaf("browsersyncReload", Reload)?;
    graph.leaf(
        "watch",
        Watch::new(vec![
            WatchRule {
                include: vec![format!("{}/**/*.scss", source.scss_dir.display())],
                exclude: vec![format!("{}/bootstrap/**", source.scss_dir.display())],
                tasks: vec!["css:dev".to_string(), "browsersyncReload".to_string()],
            },
            WatchRule {
                include: vec![format!("{}/**/*.js", source.js_dir.display())],
                exclude: vec![format!("{}/**", source.vendor_js_dir.display())],
                tasks: vec!["js:dev".to_string(), "browsersyncReload".to_string()],
            },
            WatchRule {
                include: [source.html_globs.clone(), source.partial_globs.clone()].concat(),
                exclude: vec![],
                tasks: vec!["html:dev".to_string(), "browsersyncReload".to_string()],
            },
        ])?,
    )?;
    graph.parallel("dev:serve", &["browsersync", "watch"])?;

    graph.sequence("dev", &["clean", "dev:build", "html:dev", "dev:serve"])?;
    graph.sequence("default", &["clean", "prod:build", "html:build"])?;
    graph.sequence("build", &["clean", "prod:build", "html:build"])?;

    Ok(graph)
}

/// Stage the runtime vendor files into one output tree.
fn vendor_stage_specs(source: &SourceConfig, out_dir: &Path) -> Vec<CopySpec> {
    vec![
        CopySpec {
            root: source.vendor_js_dir.clone(),
            include: source.runtime_vendor_js.clone(),
            exclude: vec![],
            dest: out_dir.join(&source.vendor_js_dir),
            flatten: true,
        },
        CopySpec {
            root: source.fonts_dir.clone(),
            include: vec!["**".to_string()],
            exclude: vec![],
            dest: out_dir.join(&source.fonts_dir),
            flatten: false,
        },
    ]
}

fn asset_specs(source: &SourceConfig, out_dir: &Path) -> Vec<CopySpec> {
    let mut include = source.html_globs.clone();
    include.push(source.img_glob.clone());
    vec![CopySpec {
        root: PathBuf::new(),
        include,
        exclude: vec![],
        dest: out_dir.to_path_buf(),
        flatten: false,
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configs::SiteConfig;

    fn graph() -> TaskGraph {
        let ctx = BuildContext::new(PathBuf::from("."), SiteConfig::default());
        build_graph(&ctx).unwrap()
    }

    #[test]
    fn registers_the_full_command_surface() {
        let graph = graph();
        for name in [
            "clean",
            "vendor:js",
            "vendor:fonts",
            "vendor",
            "bootstrap:scss",
            "scss",
            "scss:grid",
            "css:dev",
            "js:dev",
            "html:dev",
            "vendor:dev",
            "css:build",
            "js:build",
            "html:build",
            "vendor:build",
            "watch",
            "browsersync",
            "browsersyncReload",
            "dev:build",
            "prod:build",
            "dev",
            "default",
            "build",
        ] {
            assert!(graph.contains(name), "missing task '{name}'");
        }
    }

    #[test]
    fn top_level_pipelines_clean_first_and_postprocess_last() {
        let graph = graph();
        let default = graph.get("default").unwrap();
        assert_eq!(
            default.kind.children(),
            Some(&["clean".to_string(), "prod:build".to_string(), "html:build".to_string()][..])
        );
        let build = graph.get("build").unwrap();
        assert_eq!(build.kind.children(), default.kind.children());

        let dev = graph.get("dev").unwrap();
        assert_eq!(
            dev.kind.children(),
            Some(
                &[
                    "clean".to_string(),
                    "dev:build".to_string(),
                    "html:dev".to_string(),
                    "dev:serve".to_string(),
                ][..]
            )
        );
    }

    #[test]
    fn compile_groups_are_parallel_and_staged_before_copies() {
        let graph = graph();
        let compile = graph.get("prod:compile").unwrap();
        assert_eq!(compile.kind.label(), "parallel");
        assert_eq!(
            compile.kind.children(),
            Some(&["css:build".to_string(), "js:build".to_string(), "vendor".to_string()][..])
        );

        let prod = graph.get("prod:build").unwrap();
        assert_eq!(prod.kind.label(), "sequence");
        assert_eq!(
            prod.kind.children(),
            Some(
                &[
                    "prod:compile".to_string(),
                    "vendor:build".to_string(),
                    "assets:build".to_string(),
                ][..]
            )
        );
    }

    #[test]
    fn style_pipeline_copies_the_framework_before_compiling() {
        let graph = graph();
        let scss = graph.get("scss").unwrap();
        assert_eq!(scss.kind.label(), "sequence");
        assert_eq!(
            scss.kind.children(),
            Some(&["bootstrap:scss".to_string(), "scss:compile".to_string()][..])
        );
    }

    #[test]
    fn dev_serve_runs_server_and_watcher_side_by_side() {
        let graph = graph();
        let serve = graph.get("dev:serve").unwrap();
        assert_eq!(serve.kind.label(), "parallel");
        assert_eq!(
            serve.kind.children(),
            Some(&["browsersync".to_string(), "watch".to_string()][..])
        );
    }
}
