//! danmaku - Entry Point

use clap::Parser;
use danmaku::config::loader::period_from_secs;
use danmaku::model::AppError;
use danmaku::view::{ColorConfig, RunSettings};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// danmaku - scrolling live-chat comment overlay for the terminal
#[derive(Parser, Debug)]
#[command(name = "danmaku")]
#[command(version)]
#[command(about = "Terminal overlay that lays out live-chat comments in two alternating lanes")]
pub struct Args {
    /// Path to a recorded transport file (reads from stdin if not provided)
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Rows added below every comment
    #[arg(short, long)]
    pub margin: Option<u16>,

    /// Batch period in seconds assumed until one is observed
    #[arg(long, value_parser = parse_period)]
    pub fetch_period: Option<Duration>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,
}

fn parse_period(raw: &str) -> Result<Duration, String> {
    let secs: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    period_from_secs(secs).ok_or_else(|| "must be a positive number of seconds".to_string())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = danmaku::config::load_config_with_precedence(args.config.clone())?;
        let merged = danmaku::config::merge_config(config_file);
        let with_env = danmaku::config::apply_env_overrides(merged);
        danmaku::config::apply_cli_overrides(with_env, args.margin, args.fetch_period)
    };

    danmaku::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let input_source =
        danmaku::source::detect_input_source(args.file.clone()).map_err(AppError::from)?;

    let settings = RunSettings::from_config(&config, ColorConfig::from_env_and_args(args.no_color));
    danmaku::view::run_with_source(input_source, settings)?;

    Ok(())
}
