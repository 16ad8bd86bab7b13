pub mod site;
pub mod tools;

pub use site::{parse_site_config, OutputConfig, SiteConfig, SourceConfig};
pub use tools::{ServerConfig, ToolSpec, ToolsConfig};
