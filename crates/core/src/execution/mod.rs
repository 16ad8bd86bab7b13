//! Task execution module
//!
//! This module holds the task runner that interprets the graph's
//! sequence/parallel semantics and the process helper that invokes external
//! collaborator tools.

pub mod process;
pub mod runner;

pub use process::run_tool;
pub use runner::{BuildContext, TaskRunner};
