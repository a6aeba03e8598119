//! Validate command - score an entity against the rule catalog.

use colored::Colorize;
use steward::validation::RuleStatus;
use steward::Severity;

use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, id: String, json_output: bool) -> CommandResult {
    let workspace = Workspace::open(global)?;

    let result = runtime()?.block_on(async {
        let result = workspace.steward.validate(&workspace.ctx, &id).await?;
        workspace.save().await?;
        Ok::<_, steward::StewardError>(result)
    })?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{} {}", "Validation of".cyan().bold(), result.id.white().bold());
    println!();
    for rule in &result.rule_results {
        let mark = match (rule.status, rule.severity) {
            (RuleStatus::Pass, _) => "PASS".green(),
            (RuleStatus::Fail, Severity::Error) => "FAIL".red().bold(),
            (RuleStatus::Fail, Severity::Warning) => "WARN".yellow().bold(),
            (RuleStatus::Fail, Severity::Info) => "INFO".blue(),
        };
        println!("  {} {:<28} {}", mark, rule.rule_name, rule.detail.dimmed());
    }
    println!();

    let summary = &result.summary;
    let score = format!("{:.2}", result.score);
    let score = if result.score >= 0.8 {
        score.green().bold()
    } else if result.score >= 0.5 {
        score.yellow().bold()
    } else {
        score.red().bold()
    };
    println!(
        "Score: {}  ({} passed, {} errors, {} warnings of {})",
        score, summary.passed, summary.errors, summary.warnings, summary.total
    );
    if global.verbose {
        println!("Run: {}", result.run_id);
    }

    Ok(())
}
