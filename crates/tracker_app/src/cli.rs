use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracker_core::{JobKind, RangeParams};
use tracker_logging::LogDestination;

/// Start backend batch jobs and track them to completion.
#[derive(Parser, Debug)]
#[command(name = "job-tracker", version, about = "Start and track backend batch jobs")]
pub struct CliArgs {
    /// Path to a RON config file (default: ./job-tracker.ron)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Backend base URL (overrides config file)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Bearer token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// Status poll interval in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Where log output goes
    #[arg(long, value_enum)]
    pub log: Option<LogTarget>,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a job and wait until it completes or fails
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[arg(long, value_enum)]
    pub kind: KindArg,

    /// First id of the range (details jobs)
    #[arg(long, requires = "end")]
    pub start: Option<i64>,

    /// Last id of the range, inclusive (details jobs)
    #[arg(long, requires = "start")]
    pub end: Option<i64>,

    /// How many times a failed job is restarted from its checkpoint
    #[arg(long, default_value_t = 0)]
    pub resume_attempts: u32,
}

impl RunArgs {
    pub fn params(&self) -> Option<RangeParams> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(RangeParams::new(start, end)),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Metadata,
    Details,
    Language,
}

impl From<KindArg> for JobKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Metadata => JobKind::Metadata,
            KindArg::Details => JobKind::Details,
            KindArg::Language => JobKind::Language,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogTarget {
    #[default]
    Terminal,
    File,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::File => LogDestination::File,
            LogTarget::Both => LogDestination::Both,
        }
    }
}
