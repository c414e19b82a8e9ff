// SPDX-FileCopyrightText: 2026 Reclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `reclaim serve` and `reclaim tick`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reclaim_config::ReclaimConfig;
use reclaim_core::ReclaimError;
use reclaim_engine::shutdown::install_signal_handler;
use reclaim_engine::{StaticSettings, TickReport};
use tracing::info;

use crate::app::App;
use crate::settings::FileSettings;

/// Run the scheduler until SIGINT/SIGTERM. The tick in flight when the
/// signal arrives completes before the store is closed.
pub async fn run_serve(
    config: ReclaimConfig,
    config_path: Option<PathBuf>,
) -> Result<(), ReclaimError> {
    reclaim_engine::metrics::register_metrics();

    let app = App::open(config).await?;
    app.log_health().await;

    let settings = Arc::new(FileSettings::new(
        config_path,
        app.config.recovery.clone(),
    ));
    let scheduler = app.scheduler(settings);
    let cancel = install_signal_handler();

    info!(
        name = %app.config.service.name,
        interval_secs = app.config.scheduler.interval_secs,
        "reclaim serving"
    );
    scheduler
        .run(
            Duration::from_secs(app.config.scheduler.interval_secs),
            cancel,
        )
        .await;

    app.close().await?;
    info!("reclaim stopped");
    Ok(())
}

/// Run exactly one tick with the loaded settings.
pub async fn run_tick(config: ReclaimConfig) -> Result<TickReport, ReclaimError> {
    let app = App::open(config).await?;
    let settings = Arc::new(StaticSettings::new(app.config.recovery.clone()));
    let report = app.scheduler(settings).tick().await;
    app.close().await?;
    report
}

/// Initializes the tracing subscriber. Logs go to stderr so command output
/// on stdout stays machine-readable.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("reclaim={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
