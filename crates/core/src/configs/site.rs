use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::configs::tools::{ServerConfig, ToolsConfig};
use crate::types::SiteResult;

/// Name of the optional per-site configuration file at the project root.
pub const CONFIG_FILE: &str = "site.yml";

/// Source trees of the site. All paths are relative to the project root.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SourceConfig {
    /// Page globs, processed into the output trees.
    pub html_globs: Vec<String>,
    /// Include fragments, watched but never emitted as standalone pages.
    pub partial_globs: Vec<String>,
    pub scss_dir: PathBuf,
    /// Entry style sheet compiled into [`SourceConfig::css_dir`].
    pub style_entry: PathBuf,
    /// Standalone grid style sheet from the copied framework tree.
    pub grid_entry: PathBuf,
    /// Destination of compiled (not yet staged) style sheets.
    pub css_dir: PathBuf,
    pub js_dir: PathBuf,
    /// Entry module handed to the bundler.
    pub js_entry: PathBuf,
    pub img_glob: String,
    /// Root of the installed third-party library trees.
    pub vendor_dir: PathBuf,
    /// Destination of vendored JS distributions inside the source tree.
    pub vendor_js_dir: PathBuf,
    /// Destination of the vendored icon-font package.
    pub fonts_dir: PathBuf,
    /// Vendor JS files staged into the output trees at build time.
    pub runtime_vendor_js: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            html_globs: vec!["*.html".to_string()],
            partial_globs: vec!["partials/*.html".to_string()],
            scss_dir: PathBuf::from("assets/scss"),
            style_entry: PathBuf::from("assets/scss/app.scss"),
            grid_entry: PathBuf::from("assets/scss/bootstrap/bootstrap-grid.scss"),
            css_dir: PathBuf::from("assets/css"),
            js_dir: PathBuf::from("assets/js"),
            js_entry: PathBuf::from("assets/js/index.js"),
            img_glob: "assets/img/**".to_string(),
            vendor_dir: PathBuf::from("node_modules"),
            vendor_js_dir: PathBuf::from("assets/js/vendor"),
            fonts_dir: PathBuf::from("assets/fonts/font-awesome"),
            runtime_vendor_js: vec![
                "bootstrap.min.js".to_string(),
                "jquery.slim.min.js".to_string(),
                "popper.min.js".to_string(),
            ],
        }
    }
}

impl SourceConfig {
    /// Path of the compiled entry style sheet, e.g. `assets/css/app.css`.
    pub fn compiled_css(&self) -> PathBuf {
        let stem = self
            .style_entry
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "app".to_string());
        self.css_dir.join(format!("{stem}.css"))
    }
}

/// Output trees of the two build variants.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct OutputConfig {
    /// Staging tree for local preview: unminified, with source maps.
    pub dev_dir: PathBuf,
    /// Production tree: minified, no script source maps.
    pub dist_dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dev_dir: PathBuf::from("dev"),
            dist_dir: PathBuf::from("dist"),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SiteConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub tools: ToolsConfig,
    pub server: ServerConfig,
}

impl SiteConfig {
    /// Load the site configuration from `site.yml` under `root`, falling back
    /// to the built-in defaults when no file is present.
    pub fn load(root: &Path) -> SiteResult<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        parse_site_config(&content)
    }
}

pub fn parse_site_config(yaml_str: &str) -> SiteResult<SiteConfig> {
    let config: SiteConfig = serde_yaml::from_str(yaml_str)?;
    Ok(config)
}
