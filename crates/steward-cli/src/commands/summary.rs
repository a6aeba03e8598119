//! Summary command - entity counts by status and score band.

use colored::Colorize;
use steward::SummaryFilter;

use super::list::status_colored;
use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, filter: SummaryFilter, json_output: bool) -> CommandResult {
    let workspace = Workspace::open(global)?;
    let report = runtime()?.block_on(workspace.steward.summary(&workspace.ctx, &filter))?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{} {} entities", "Summary of".cyan().bold(), report.total);
    if report.total == 0 {
        return Ok(());
    }

    println!();
    println!("{:<18} {:>6} {:>10}", "STATUS".bold(), "COUNT".bold(), "AVG SCORE".bold());
    for row in &report.by_status {
        println!(
            "{:<18} {:>6} {:>10.2}",
            status_colored(row.status),
            row.count,
            row.average_score
        );
    }

    println!();
    println!("{:<18} {:>6}", "SCORE".bold(), "COUNT".bold());
    for band in &report.by_score_range {
        println!(
            "{:<18} {:>6}",
            format!("{:.2} - {:.2}", band.lower, band.upper.min(1.0)),
            band.count
        );
        if global.verbose {
            println!("      {}", band.entity_ids.join(", ").dimmed());
        }
    }

    Ok(())
}
