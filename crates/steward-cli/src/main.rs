//! Steward CLI - HCP record stewardship from the command line and over HTTP.

mod cli;
mod commands;
mod config;
mod server;

use clap::Parser;
use cli::{Cli, Commands};
use steward::SummaryFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    let global = &cli.global;
    let result = match cli.command {
        Commands::Serve { host, port } => commands::serve::run(global, host, port),

        Commands::Import { file } => commands::import::run(global, file),

        Commands::List { status, limit } => commands::list::run(global, status, limit),

        Commands::Validate { id, json } => commands::validate::run(global, id, json),

        Commands::Decide {
            id,
            decision_type,
            link,
            comment,
            select,
        } => commands::decide::run(global, id, decision_type, link, comment, select),

        Commands::Audit { id, limit, json } => commands::audit::run(global, id, limit, json),

        Commands::Rules => commands::rules::run(global),

        Commands::Summary {
            status,
            min_score,
            max_score,
            json,
        } => commands::summary::run(
            global,
            SummaryFilter {
                status,
                min_score,
                max_score,
            },
            json,
        ),

        Commands::Uploads { limit, json } => commands::uploads::run(global, limit, json),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "steward=debug,steward_cli=debug,tower_http=debug"
    } else {
        "steward=info,steward_cli=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
