//! Audit command - show an entity's audit trail.

use colored::Colorize;

use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, id: String, limit: Option<usize>, json_output: bool) -> CommandResult {
    let workspace = Workspace::open(global)?;
    let events = runtime()?.block_on(workspace.steward.audit_for(&workspace.ctx, &id, limit))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    if events.is_empty() {
        println!("{} {}", "No audit events for".yellow(), id);
        return Ok(());
    }

    println!("{} {}", "Audit trail for".cyan().bold(), id.white().bold());
    println!();
    for event in &events {
        println!(
            "  {}  {:<14} {} ({})",
            event.at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            event.action.as_str().white().bold(),
            event.actor,
            event.role
        );
        if global.verbose && !event.details.is_null() {
            println!("      {}", event.details);
        }
    }

    Ok(())
}
