// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reclaim - abandoned cart recovery engine.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commerce;
mod output;
mod serve;
mod settings;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reclaim_config::ReclaimConfig;
use reclaim_core::ReclaimError;

use crate::app::App;

/// Reclaim - abandoned cart recovery engine.
#[derive(Parser, Debug)]
#[command(name = "reclaim", version, about, long_about = None)]
struct Cli {
    /// Config file to use instead of the standard search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the recovery scheduler until interrupted.
    Serve,
    /// Run a single recovery tick and print what happened.
    Tick,
    /// Print recovery analytics for a date range.
    Report {
        /// First day of the range (YYYY-MM-DD).
        #[arg(long)]
        from: String,
        /// Last day of the range, inclusive (YYYY-MM-DD).
        #[arg(long)]
        to: String,
        /// Number of most-abandoned products to list.
        #[arg(long)]
        limit: Option<usize>,
        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Redeem a recovery token.
    Redeem {
        token: String,
    },
    /// Load and validate configuration, then exit.
    CheckConfig,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match settings::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(errors) => {
            reclaim_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    if let Commands::CheckConfig = cli.command {
        println!(
            "config OK (service.name={}, recovery.enabled={}, database={})",
            config.service.name, config.recovery.enabled, config.storage.database_path
        );
        return;
    }

    serve::init_tracing(&config.service.log_level);

    if let Err(e) = run(cli.command, cli.config, config).await {
        eprintln!("reclaim: {e}");
        std::process::exit(1);
    }
}

async fn run(
    command: Commands,
    config_path: Option<PathBuf>,
    config: ReclaimConfig,
) -> Result<(), ReclaimError> {
    match command {
        Commands::Serve => serve::run_serve(config, config_path).await,
        Commands::Tick => {
            let report = serve::run_tick(config).await?;
            print!("{}", output::tick_summary(&report));
            Ok(())
        }
        Commands::Report {
            from,
            to,
            limit,
            json,
        } => {
            let app = App::open(config).await?;
            let report = app.analytics().report(&from, &to, limit).await;
            app.close().await?;
            let report = report?;
            if json {
                let rendered = serde_json::to_string_pretty(&report)
                    .map_err(|e| ReclaimError::Internal(format!("report serialization: {e}")))?;
                println!("{rendered}");
            } else {
                print!("{}", output::analytics_summary(&report));
            }
            Ok(())
        }
        Commands::Redeem { token } => {
            let app = App::open(config).await?;
            let redemption = app.redeemer().redeem(&token).await;
            app.close().await?;
            print!("{}", output::redemption_summary(&redemption?));
            Ok(())
        }
        Commands::CheckConfig => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports epoch advance; the system allocator would fail.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_report_arguments() {
        let cli = Cli::try_parse_from([
            "reclaim", "report", "--from", "2026-03-01", "--to", "2026-03-31", "--limit", "5",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                from,
                to,
                limit,
                json,
            } => {
                assert_eq!(from, "2026-03-01");
                assert_eq!(to, "2026-03-31");
                assert_eq!(limit, Some(5));
                assert!(json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_accepts_global_config_flag() {
        let cli = Cli::try_parse_from(["reclaim", "tick", "--config", "/tmp/r.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/r.toml")));
        assert!(matches!(cli.command, Commands::Tick));
    }

    #[test]
    fn cli_verifies() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
