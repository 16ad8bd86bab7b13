//! Sitekit Core Library
//!
//! This is the core library for the sitekit static-site build tool. It provides
//! the task graph, the task runner, and the asset pipeline steps that the CLI
//! wires together into the `dev` and production build pipelines.
//!
//! ## Architecture
//!
//! The core library is organized into several modules:
//!
//! - [`graph`] - Task graph: named leaf/sequence/parallel tasks
//! - [`execution`] - Task runner and external tool invocation
//! - [`pipeline`] - Leaf pipeline steps (clean, copy, styles, scripts, html, watch, serve)
//! - [`site`] - The build definition: registers every named task of the site pipeline
//! - [`configs`] - Configuration parsing for paths, tools and the dev server
//! - [`types`] - Common error types and type aliases
//!
//! ## Usage
//!
//! The CLI builds a [`graph::TaskGraph`] from a [`configs::SiteConfig`] via
//! [`site::build_graph`] and executes named tasks through an
//! [`execution::runner::TaskRunner`]:
//!
//! ```rust,no_run
//! use std::path::PathBuf;
//! use sitekit_core::configs::SiteConfig;
//! use sitekit_core::execution::runner::{BuildContext, TaskRunner};
//! use sitekit_core::site::build_graph;
//!
//! # async fn example() -> sitekit_core::types::SiteResult<()> {
//! let ctx = BuildContext::new(PathBuf::from("."), SiteConfig::default());
//! let graph = build_graph(&ctx)?;
//! let runner = TaskRunner::new(graph, ctx);
//! runner.run("default").await?;
//! # Ok(())
//! # }
//! ```

pub mod configs;
pub mod execution;
pub mod graph;
pub mod pipeline;
pub mod site;
pub mod types;

// Re-export the main types for easier usage
pub use graph::{Outcome, TaskGraph, TaskKind};
pub use types::{SiteError, SiteResult};
