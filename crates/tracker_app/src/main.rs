mod cli;
mod config;
mod session;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use log::LevelFilter;
use tracker_core::Lifecycle;
use tracker_engine::{JobTracker, RestBackend};
use tracker_logging::{tracker_debug, tracker_info};

use crate::cli::{CliArgs, Command};
use crate::config::{TrackerConfig, DEFAULT_CONFIG_FILE};
use crate::session::RunRequest;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = CliArgs::parse();

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
    let loaded = TrackerConfig::load(&config_path).context("failed to load configuration")?;
    let from_file = loaded.is_some();
    let mut config = loaded.unwrap_or_default();
    config.apply_overrides(&args);

    let level = if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    tracker_logging::initialize(config.log.into(), level, &config.log_file);
    if from_file {
        tracker_info!("Loaded configuration from {}", config_path.display());
    } else {
        tracker_debug!(
            "Config file {} not found, using defaults",
            config_path.display()
        );
    }

    let backend =
        RestBackend::new(config.backend_settings()).context("invalid backend settings")?;
    tracker_info!("Using backend {}", backend.settings().base_url);
    let tracker = JobTracker::new(Arc::new(backend), config.tracker_settings());

    match args.command {
        Command::Run(run) => {
            let request = RunRequest {
                kind: run.kind.into(),
                params: run.params(),
                resume_attempts: run.resume_attempts,
            };
            let state = session::run(&tracker, request, tracker.settings().poll_interval).await?;
            print!("{}", session::summary(&state));

            Ok(if state.lifecycle == Lifecycle::Completed {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
    }
}
