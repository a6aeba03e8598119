//! Serve command - run the HTTP API.

use std::sync::Arc;

use colored::Colorize;
use steward::store::MemoryStore;

use super::{CommandResult, runtime};
use crate::cli::GlobalArgs;
use crate::config::ServerConfig;
use crate::server::{app, state::AppState};

pub fn run(global: &GlobalArgs, host: Option<String>, port: Option<u16>) -> CommandResult {
    let mut server = ServerConfig::from_env()?;
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
    if let Some(store) = &global.store {
        server.store_path = store.clone();
    }
    if global.config.is_some() {
        server.config_path = global.config.clone();
    }

    let config = match &server.config_path {
        Some(path) => steward::StewardConfig::load(path)?,
        None => steward::StewardConfig::default(),
    };
    let store = Arc::new(MemoryStore::open(&server.store_path)?);
    let state = AppState::new(Arc::clone(&store), config).with_snapshot(server.store_path.clone());

    let url = format!("http://{}:{}", server.host, server.port);
    println!();
    println!(
        "{} {}",
        "Starting stewardship API at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  Store: {}", server.store_path.display());
    if let Some(path) = &server.config_path {
        println!("  Config: {}", path.display());
    }
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    runtime()?.block_on(async {
        let shutdown_state = state.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            shutdown_state.persist().await;
            std::process::exit(0);
        });

        app::run_server(state, &server.host, server.port).await
    })
}
