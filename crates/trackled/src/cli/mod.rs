//! CLI subcommands: real-time run, scenario replay, config display.

mod config_cmd;
mod run;
mod simulate;

use std::path::{Path, PathBuf};

use clap::Subcommand;
use serde::Serialize;

pub(super) use crate::RUNNING;
pub(super) use trackled_lib::config::Config;
pub(super) use trackled_lib::error::Result;
pub(super) use trackled_lib::hardware::{self, Led};
pub(super) use trackled_lib::led::{self, LedController, LedMode};
pub(super) use trackled_lib::scenario::{LedEvent, Scenario};

const PADDING: usize = 2;

/// Compute alignment width for a command's key-value output.
/// Ensures at least PADDING spaces after the longest key in either level,
/// with top-level and indent values aligned to the same column.
pub(super) fn kv_width(top: &[&str], indent: &[&str]) -> usize {
    let top_max = top.iter().map(|k| k.len()).max().unwrap_or(0);
    let indent_max = indent.iter().map(|k| k.len()).max().unwrap_or(0);
    let top_need = if top.is_empty() { 0 } else { top_max + PADDING };
    // Indent keys lose 2 chars of inner width to the "  " prefix
    let indent_need = if indent.is_empty() {
        0
    } else {
        indent_max + PADDING + 2
    };
    top_need.max(indent_need)
}

pub(super) fn format_kv(key: &str, value: impl std::fmt::Display, w: usize) -> String {
    format!("{key:<width$}{value}", width = w)
}

pub(super) fn kv(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("{}", format_kv(key, value, w));
}

pub(super) fn kv_indent(key: &str, value: impl std::fmt::Display, w: usize) {
    println!("  {key:<width$}{value}", width = w - 2);
}

/// "on" / "off" label for an LED level.
pub(super) fn level(on: bool) -> &'static str {
    if on { "on" } else { "off" }
}

/// Print any serializable value as pretty JSON, logging serialization errors.
pub(super) fn print_json(value: &impl Serialize) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("serializing output: {e}"),
    }
}

/// Load config from `custom_path` or the platform default, logging parse warnings.
pub(super) fn load_config(custom_path: Option<&Path>) -> Config {
    match custom_path {
        Some(path) => {
            let (config, warnings) = Config::load_from(path);
            for w in &warnings {
                log::warn!("{w}");
            }
            config
        }
        None => Config::load(),
    }
}

// ── JSON output structs ──

#[derive(Serialize)]
pub(super) struct ConfigOutput {
    pub config_file: Option<String>,
    pub config_file_exists: bool,
    pub settings: Config,
    pub device_type: String,
    pub power_led: bool,
    pub errors: Vec<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the LED controller in real time (Ctrl+C to stop)
    Run {
        /// Report the device as sleeping
        #[arg(long)]
        sleep: bool,
        /// Report the charger as connected
        #[arg(long)]
        charging: bool,
        /// Report the battery as full
        #[arg(long)]
        full: bool,
        /// Raise the low-voltage alarm
        #[arg(long)]
        low_voltage: bool,
        /// GSM LED mode: on, off or flash (default: from config)
        #[arg(long)]
        gsm_mode: Option<LedMode>,
        /// GPS LED mode: on, off or flash (default: from config)
        #[arg(long)]
        gps_mode: Option<LedMode>,
        /// Tracker model, e.g. GS06 (default: from config)
        #[arg(long)]
        device_type: Option<String>,
        /// Stop after this many seconds
        #[arg(long, value_name = "SECS")]
        duration: Option<u64>,
    },

    /// Replay a scenario file in virtual time (no hardware required)
    Simulate {
        /// Path to scenario TOML file
        scenario_file: PathBuf,
        /// Only print the summary, not every LED transition
        #[arg(long)]
        quiet: bool,
    },

    /// Show current configuration and file paths
    Config,
}

pub fn run(cmd: Command, json: bool, config_path: Option<&Path>) -> Result<()> {
    match cmd {
        Command::Run {
            sleep,
            charging,
            full,
            low_voltage,
            gsm_mode,
            gps_mode,
            device_type,
            duration,
        } => run::cmd_run(
            run::RunOptions {
                signals: run::FixedSignals {
                    sleep,
                    charging,
                    full,
                    low_voltage,
                },
                gsm_mode,
                gps_mode,
                device_type,
                duration,
            },
            json,
            config_path,
        ),
        Command::Simulate {
            scenario_file,
            quiet,
        } => simulate::cmd_simulate(&scenario_file, quiet, json),
        Command::Config => config_cmd::cmd_config(json, config_path),
    }
}
