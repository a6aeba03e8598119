//! Uploads command - show past import batches.

use colored::Colorize;
use steward::entity::UploadStatus;

use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, limit: Option<usize>, json_output: bool) -> CommandResult {
    let workspace = Workspace::open(global)?;
    let sessions = runtime()?.block_on(workspace.steward.upload_history(&workspace.ctx, limit))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&sessions)?);
        return Ok(());
    }

    if sessions.is_empty() {
        println!("{}", "No uploads recorded.".yellow());
        return Ok(());
    }

    for session in &sessions {
        let status = match session.status {
            UploadStatus::Completed => "completed".green(),
            UploadStatus::Failed => "failed".red().bold(),
        };
        println!(
            "  {}  {:<24} {:<10} {} processed, {} rejected  ({})",
            session.started_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            session.source,
            status,
            session.processed,
            session.errors,
            session.user
        );
        if global.verbose {
            for line in &session.log {
                println!("      {}", line.dimmed());
            }
        }
    }

    Ok(())
}
