//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use steward::decision::{Section, SectionIndices};
use steward::{EntityStatus, Role};

/// Steward: record-quality scoring and stewardship decisions for HCP data
#[derive(Parser)]
#[command(name = "steward")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Options shared by every command.
#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Store snapshot file (default: $STEWARD_STORE or steward-store.json)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Library configuration file (default: $STEWARD_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Username recorded in the audit trail
    #[arg(long, global = true, default_value = "cli")]
    pub actor: String,

    /// Role of the acting user (admin, steward, viewer)
    #[arg(long, global = true, default_value = "admin")]
    pub role: Role,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the HTTP API
    Serve {
        /// Address to bind (default: $STEWARD_HOST or 127.0.0.1)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (default: $STEWARD_PORT or 3141)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Import entities from a JSON array file
    Import {
        /// Path to the entities file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// List entities, most recently updated first
    List {
        /// Only entities in this status (to-review, validated, rejected, needs-correction, duplicate)
        #[arg(short, long)]
        status: Option<EntityStatus>,

        /// Maximum entities shown
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },

    /// Run the rule catalog against an entity
    Validate {
        /// Entity identifier
        #[arg(value_name = "ID")]
        id: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record a stewardship decision on an entity
    Decide {
        /// Entity identifier
        #[arg(value_name = "ID")]
        id: String,

        /// Decision type (validate, reject, correct, duplicate, unrelated)
        #[arg(short = 't', long = "type")]
        decision_type: String,

        /// Entity this one duplicates or is unrelated to
        #[arg(long)]
        link: Option<String>,

        /// Free-text comment
        #[arg(short, long)]
        comment: Option<String>,

        /// Selected item as SECTION:POSITION, e.g. phones:2 (repeatable)
        #[arg(short, long = "select", value_parser = parse_selection)]
        select: Vec<(Section, usize)>,
    },

    /// Show the audit trail of an entity
    Audit {
        /// Entity identifier
        #[arg(value_name = "ID")]
        id: String,

        /// Maximum events shown
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the validation rules in evaluation order
    Rules,

    /// Summarize entities by status and score band
    Summary {
        /// Only entities in this status
        #[arg(short, long)]
        status: Option<EntityStatus>,

        /// Lowest quality score included
        #[arg(long)]
        min_score: Option<f64>,

        /// Highest quality score included
        #[arg(long)]
        max_score: Option<f64>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show past import batches, newest first
    Uploads {
        /// Maximum sessions shown
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse `SECTION:POSITION`.
fn parse_selection(s: &str) -> Result<(Section, usize), String> {
    let (section, position) = s
        .split_once(':')
        .ok_or_else(|| format!("expected SECTION:POSITION, got '{}'", s))?;

    let section: Section = serde_json::from_value(serde_json::Value::String(
        section.trim().to_lowercase(),
    ))
    .map_err(|_| {
        format!(
            "unknown section '{}'. Use credentials, addresses, phones, emails, affiliations or sources.",
            section
        )
    })?;
    let position: usize = position
        .trim()
        .parse()
        .map_err(|_| format!("position must be a positive integer, got '{}'", position))?;

    Ok((section, position))
}

/// Group repeated `--select` values by section, keeping their order.
pub fn group_selection(select: &[(Section, usize)]) -> SectionIndices {
    let mut grouped = SectionIndices::new();
    for (section, position) in select {
        grouped.entry(*section).or_default().push(*position);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_selection() {
        assert_eq!(parse_selection("phones:2").unwrap(), (Section::Phones, 2));
        assert_eq!(parse_selection("Emails: 1").unwrap(), (Section::Emails, 1));
        assert!(parse_selection("phones").is_err());
        assert!(parse_selection("fax:1").is_err());
        assert!(parse_selection("phones:x").is_err());
    }

    #[test]
    fn test_group_selection() {
        let grouped = group_selection(&[
            (Section::Phones, 2),
            (Section::Emails, 1),
            (Section::Phones, 3),
        ]);
        assert_eq!(grouped[&Section::Phones], vec![2, 3]);
        assert_eq!(grouped[&Section::Emails], vec![1]);
    }

    #[test]
    fn test_cli_parses_decide() {
        let cli = Cli::try_parse_from([
            "steward", "decide", "HCP-1", "--type", "reject", "--select", "phones:2", "--role",
            "steward",
        ])
        .unwrap();

        assert_eq!(cli.global.role, Role::Steward);
        match cli.command {
            Commands::Decide {
                id,
                decision_type,
                select,
                ..
            } => {
                assert_eq!(id, "HCP-1");
                assert_eq!(decision_type, "reject");
                assert_eq!(select, vec![(Section::Phones, 2)]);
            }
            _ => panic!("expected decide"),
        }
    }

    #[test]
    fn test_cli_parses_summary_bounds() {
        let cli = Cli::try_parse_from([
            "steward", "summary", "--status", "validated", "--min-score", "0.5",
        ])
        .unwrap();

        match cli.command {
            Commands::Summary {
                status,
                min_score,
                max_score,
                json,
            } => {
                assert_eq!(status, Some(EntityStatus::Validated));
                assert_eq!(min_score, Some(0.5));
                assert_eq!(max_score, None);
                assert!(!json);
            }
            _ => panic!("expected summary"),
        }
    }
}
