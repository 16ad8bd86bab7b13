//! Leaf pipeline steps
//!
//! Each step is an [`Action`](crate::graph::Action) a leaf task delegates to:
//! file-system housekeeping and copies are performed natively, compilation and
//! minification spawn the configured external collaborators, and the watch and
//! serve steps start long-running operations.

pub mod clean;
pub mod copy;
pub mod html;
pub mod scripts;
pub mod serve;
pub mod styles;
pub mod watch;

pub use clean::Clean;
pub use copy::{CopyFiles, CopySpec};
pub use html::HtmlPipeline;
pub use scripts::JsBundle;
pub use serve::{Reload, Serve};
pub use styles::{CssMinify, StyleCompile};
pub use watch::{Watch, WatchRule};
