//! Decide command - record a stewardship decision.

use colored::Colorize;
use steward::decision::Section;
use steward::DecisionInput;

use super::list::status_colored;
use super::{CommandResult, Workspace, runtime};
use crate::cli::{GlobalArgs, group_selection};

pub fn run(
    global: &GlobalArgs,
    id: String,
    decision_type: String,
    link: Option<String>,
    comment: Option<String>,
    select: Vec<(Section, usize)>,
) -> CommandResult {
    let workspace = Workspace::open(global)?;

    let mut input = DecisionInput::new(decision_type);
    input.linked_entity_id = link;
    input.comments = comment;
    if !select.is_empty() {
        input.selected_items = Some(group_selection(&select));
    }

    let decision = runtime()?.block_on(async {
        let decision = workspace
            .steward
            .record_decision(&workspace.ctx, &id, input)
            .await?;
        workspace.save().await?;
        Ok::<_, steward::StewardError>(decision)
    })?;

    println!(
        "{} {} on {} -> {}",
        "Recorded".green().bold(),
        decision.decision_type.to_string().white().bold(),
        decision.entity_id,
        status_colored(decision.applied_status())
    );
    if let Some(linked) = &decision.linked_entity_id {
        println!("  Linked to: {}", linked);
    }
    if let Some(details) = decision.selection.as_ref().and_then(|s| s.details()) {
        for item in details.values().flatten() {
            println!("  - {}", item.label);
        }
    }
    if global.verbose {
        println!("  Decision: {}", decision.id);
    }

    Ok(())
}
