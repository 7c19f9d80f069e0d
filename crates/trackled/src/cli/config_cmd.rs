//! `config` subcommand: show current configuration and file paths.

use std::path::Path;

use super::{Config, ConfigOutput, Result, kv, kv_indent, kv_width, print_json};
use trackled_lib::hardware::DeviceConfig;

pub(super) fn cmd_config(json: bool, custom_path: Option<&Path>) -> Result<()> {
    let config = super::load_config(custom_path);
    let config_path = custom_path.map(|p| p.to_path_buf()).or_else(Config::path);
    let config_exists = config_path.as_ref().is_some_and(|p| p.exists());
    let device_type = config.device_type();
    let errors: Vec<String> = match config.validate() {
        Ok(()) => vec![],
        Err(errs) => errs.iter().map(|e| e.to_string()).collect(),
    };

    if json {
        let output = ConfigOutput {
            config_file: config_path.as_ref().map(|p| p.display().to_string()),
            config_file_exists: config_exists,
            settings: config,
            device_type: device_type.to_string(),
            power_led: device_type.has_power_led(),
            errors,
        };
        print_json(&output);
        return Ok(());
    }

    // Human-readable output
    let w = kv_width(&["Config file:"], &["device_type:", "gsm_mode:", "gps_mode:"]);

    match &config_path {
        Some(p) => {
            if config_exists {
                kv("Config file:", format_args!("{} (loaded)", p.display()), w);
            } else {
                kv(
                    "Config file:",
                    format_args!("{} (not found, using defaults)", p.display()),
                    w,
                );
            }
        }
        None => kv("Config file:", "(no config directory)", w),
    }
    println!();

    println!("Settings:");
    let power = if device_type.has_power_led() {
        "power LED"
    } else {
        "no power LED"
    };
    kv_indent(
        "device_type:",
        format_args!("{} -> {device_type} ({power})", config.device_type),
        w,
    );
    kv_indent("gsm_mode:", &config.gsm_mode, w);
    kv_indent("gps_mode:", &config.gps_mode, w);

    if !errors.is_empty() {
        println!();
        println!("Problems:");
        for e in &errors {
            println!("  {e}");
        }
    }
    Ok(())
}
