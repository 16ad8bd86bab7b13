use anyhow::Result;
use colored::*;
use sitekit_core::execution::runner::TaskRunner;

pub fn execute(runner: &TaskRunner) -> Result<()> {
    println!("{}", "Tasks".bold().underline());

    for name in runner.graph().task_names() {
        let Some(task) = runner.graph().get(name) else {
            continue;
        };
        match task.kind.children() {
            Some(children) => println!(
                "{} {} {}",
                name.blue().bold(),
                format!("[{}]", task.kind.label()).dimmed(),
                children.join(", ").dimmed()
            ),
            None => println!("{}", name.blue().bold()),
        }
    }

    Ok(())
}
