use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// An external command-line collaborator (style compiler, bundler).
///
/// The program is invoked as-is with `args` first, followed by whatever
/// arguments the invoking pipeline step adds for a particular run.
#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ToolsConfig {
    /// Style-sheet compiler. Expected to accept `input output` positionals
    /// plus `--style` and source-map flags, as the dart-sass CLI does.
    pub style: ToolSpec,
    /// JS bundler/transpiler, also used for CSS minification.
    pub bundler: ToolSpec,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            style: ToolSpec::new("sass"),
            bundler: ToolSpec::new("esbuild"),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, JsonSchema, Clone)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ServerConfig {
    /// Port the live-reload dev server listens on.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}
