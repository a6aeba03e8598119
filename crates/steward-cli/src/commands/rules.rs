//! Rules command - list the validation catalog.

use colored::Colorize;
use steward::Severity;
use steward::validation::RuleCatalog;

use super::{CommandResult, load_config};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs) -> CommandResult {
    let config = load_config(global)?;
    let catalog = RuleCatalog::standard(&config.rules);

    println!("{}", "Validation rules (evaluation order):".cyan().bold());
    println!();
    for (n, rule) in catalog.describe().iter().enumerate() {
        let severity = match rule.severity {
            Severity::Error => rule.severity.label().red(),
            Severity::Warning => rule.severity.label().yellow(),
            Severity::Info => rule.severity.label().blue(),
        };
        println!("{:>2}. {} [{}] {}", n + 1, rule.id.white().bold(), severity, rule.name);
        if global.verbose {
            println!("    {}", rule.description.dimmed());
        }
    }

    Ok(())
}
