//! Import command - upsert entities from a JSON array file.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use colored::Colorize;
use serde_json::Value;

use super::{CommandResult, Workspace, runtime};
use crate::cli::GlobalArgs;

pub fn run(global: &GlobalArgs, file: PathBuf) -> CommandResult {
    let reader = File::open(&file)
        .map_err(|e| format!("Cannot open {}: {}", file.display(), e))?;
    let records: Vec<Value> = serde_json::from_reader(BufReader::new(reader))
        .map_err(|e| format!("{} is not a JSON array of records: {}", file.display(), e))?;

    let workspace = Workspace::open(global)?;

    runtime()?.block_on(async {
        let source = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        let summary = workspace
            .steward
            .ingest(&workspace.ctx, &source, records)
            .await?;
        workspace.save().await?;

        println!(
            "{} {} record(s) into {}",
            "Imported".green().bold(),
            summary.processed,
            workspace.store_path.display()
        );
        if summary.errors > 0 {
            println!(
                "{} {} record(s) rejected:",
                "Warning:".yellow(),
                summary.errors
            );
            for line in &summary.log {
                println!("  - {}", line);
            }
        }
        Ok::<(), Box<dyn std::error::Error>>(())
    })
}
