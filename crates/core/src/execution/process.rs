//! External collaborator invocation
//!
//! Every compile/bundle/minify step delegates to a separate command-line
//! tool. The tool is spawned once per task run, its output captured, and a
//! nonzero exit reported as a collaborator failure with the stderr tail.
//! There are no retries and no timeouts.

use std::path::Path;
use std::process::Stdio;

use crate::configs::ToolSpec;
use crate::types::{SiteError, SiteResult};

/// Run an external tool to completion in `cwd`.
///
/// `args` are appended after the tool's configured base arguments.
pub async fn run_tool(tool: &ToolSpec, args: &[String], cwd: &Path) -> SiteResult<()> {
    let mut command = tokio::process::Command::new(&tool.program);
    command
        .args(&tool.args)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let output = command.output().await.map_err(|error| SiteError::Collaborator {
        tool: tool.program.clone(),
        detail: format!("failed to launch: {error}"),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = match output.status.code() {
            Some(code) => format!("exited with status {code}: {}", stderr.trim()),
            None => format!("terminated by signal: {}", stderr.trim()),
        };
        return Err(SiteError::Collaborator {
            tool: tool.program.clone(),
            detail,
        });
    }

    Ok(())
}
