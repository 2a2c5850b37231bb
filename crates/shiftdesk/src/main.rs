// SPDX-FileCopyrightText: 2026 Shiftdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shiftdesk - a shift-cancellation chat assistant.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shiftdesk_config::{ConfigError, ShiftdeskConfig};

/// Shiftdesk - a shift-cancellation chat assistant.
#[derive(Parser, Debug)]
#[command(name = "shiftdesk", version, about, long_about = None)]
struct Cli {
    /// Load this config file instead of searching the default locations.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server (default).
    Serve,
    /// Inspect the effective configuration.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Load and validate the configuration, reporting every problem.
    Check,
    /// Print the effective configuration as TOML, secrets redacted.
    Show,
}

fn load_config(path: Option<&PathBuf>) -> Result<ShiftdeskConfig, Vec<ConfigError>> {
    match path {
        Some(path) => shiftdesk_config::load_and_validate_path(path),
        None => shiftdesk_config::load_and_validate(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(errors) => {
            shiftdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        None | Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config {
            action: ConfigAction::Check,
        }) => {
            println!(
                "shiftdesk: config OK (listen {}:{}, variant {}, history {})",
                config.server.host,
                config.server.port,
                config.chat.variant,
                config.conversation.history
            );
        }
        Some(Commands::Config {
            action: ConfigAction::Show,
        }) => match toml::to_string_pretty(&config.redacted()) {
            Ok(rendered) => print!("{rendered}"),
            Err(e) => {
                eprintln!("error: failed to render config: {e}");
                std::process::exit(1);
            }
        },
    }
}
