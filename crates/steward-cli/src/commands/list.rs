//! List command - scan entities.

use colored::Colorize;
use steward::EntityStatus;
use steward::store::EntityFilter;

use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, status: Option<EntityStatus>, limit: usize) -> CommandResult {
    let workspace = Workspace::open(global)?;
    let mut filter = EntityFilter::new().with_limit(limit);
    filter.status = status;

    let entities = runtime()?.block_on(workspace.steward.list(&workspace.ctx, &filter))?;

    if entities.is_empty() {
        println!("{}", "No entities found.".yellow());
        return Ok(());
    }

    println!(
        "{:<16} {:<32} {:<18} {:>6}  {}",
        "ID".bold(),
        "NAME".bold(),
        "CREDENTIAL".bold(),
        "SCORE".bold(),
        "STATUS".bold()
    );
    for entity in &entities {
        println!(
            "{:<16} {:<32} {:<18} {:>6.2}  {}",
            entity.id,
            entity.name,
            entity.primary_credential(),
            entity.quality_score,
            status_colored(entity.status)
        );
    }

    Ok(())
}

pub fn status_colored(status: EntityStatus) -> colored::ColoredString {
    match status {
        EntityStatus::Validated => status.as_str().green(),
        EntityStatus::Rejected => status.as_str().red(),
        EntityStatus::NeedsCorrection | EntityStatus::Duplicate => status.as_str().yellow(),
        EntityStatus::ToReview => status.as_str().normal(),
    }
}
