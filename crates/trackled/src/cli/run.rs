//! `run` subcommand: drive the controller in real time and print LED changes.

use std::cell::Cell;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use trackled_lib::hardware::{BatteryStatus, LedHardware, WorkState, WorkStateSource};
use trackled_lib::ticker::Ticker;

use super::{
    Config, Led, LedController, LedEvent, LedMode, RUNNING, Result, hardware, kv, kv_indent,
    kv_width, led, level,
};

/// Signals held constant for the whole run.
#[derive(Debug, Clone, Copy, Default)]
pub(super) struct FixedSignals {
    pub sleep: bool,
    pub charging: bool,
    pub full: bool,
    pub low_voltage: bool,
}

impl WorkStateSource for FixedSignals {
    fn work_state(&self) -> WorkState {
        if self.sleep {
            WorkState::Sleep
        } else {
            WorkState::Work
        }
    }
}

impl BatteryStatus for FixedSignals {
    fn low_voltage_alarm(&self) -> bool {
        self.low_voltage
    }

    fn is_charging(&self) -> bool {
        self.charging
    }

    fn is_full(&self) -> bool {
        self.full
    }
}

pub(super) struct RunOptions {
    pub signals: FixedSignals,
    pub gsm_mode: Option<LedMode>,
    pub gps_mode: Option<LedMode>,
    pub device_type: Option<String>,
    pub duration: Option<u64>,
}

/// Terminal "LED driver": prints a line whenever an output changes level.
struct ConsoleLeds {
    started: Instant,
    levels: Cell<[bool; 3]>,
    json: bool,
}

impl ConsoleLeds {
    fn new(json: bool) -> Self {
        Self {
            started: Instant::now(),
            levels: Cell::new([false; 3]),
            json,
        }
    }
}

impl LedHardware for ConsoleLeds {
    fn set_led(&self, led: Led, on: bool) {
        let mut levels = self.levels.get();
        if levels[led.index()] == on {
            return;
        }
        levels[led.index()] = on;
        self.levels.set(levels);

        let at = self.started.elapsed();
        if self.json {
            let event = LedEvent {
                at_ms: u64::try_from(at.as_millis()).unwrap_or(u64::MAX),
                led,
                on,
            };
            match serde_json::to_string(&event) {
                Ok(line) => println!("{line}"),
                Err(e) => log::error!("serializing event: {e}"),
            }
        } else {
            println!("[{:>9.3}s] {:<6}{}", at.as_secs_f64(), led, level(on));
        }
    }
}

/// Tick period for the current work state.
fn tick_period(state: WorkState) -> Duration {
    let ms = if state.is_sleep() {
        led::SLEEP_TICK_MS
    } else {
        led::TICK_PERIOD_MS
    };
    Duration::from_millis(u64::from(ms))
}

/// Resolve config + overrides into the device config and initial modes.
fn resolve(opts: &RunOptions, mut config: Config) -> Result<(Config, LedMode, LedMode)> {
    if let Some(ref dt) = opts.device_type {
        config.device_type = dt.clone();
    }
    let gsm = match opts.gsm_mode {
        Some(m) => m,
        None => config.gsm_mode()?,
    };
    let gps = match opts.gps_mode {
        Some(m) => m,
        None => config.gps_mode()?,
    };
    Ok((config, gsm, gps))
}

pub(super) fn cmd_run(opts: RunOptions, json: bool, config_path: Option<&Path>) -> Result<()> {
    let (config, gsm_mode, gps_mode) = resolve(&opts, super::load_config(config_path))?;
    let device_type = hardware::DeviceConfig::device_type(&config);
    let signals = opts.signals;

    if !json {
        let w = kv_width(&["Device:", "Signals:", "Modes:"], &[]);
        kv(
            "Device:",
            format_args!(
                "{device_type} (power LED {})",
                if device_type.has_power_led() {
                    "fitted"
                } else {
                    "absent"
                }
            ),
            w,
        );
        kv(
            "Signals:",
            format_args!(
                "{}, charging={}, full={}, low_voltage={}",
                signals.work_state(),
                signals.charging,
                signals.full,
                signals.low_voltage
            ),
            w,
        );
        kv("Modes:", format_args!("GSM {gsm_mode}, GPS {gps_mode}"), w);
        println!();
        println!("Running... (Ctrl+C to stop)");
    }

    let mut ctrl = LedController::new();
    ctrl.set_gsm_mode(gsm_mode);
    ctrl.set_gps_mode(gps_mode);

    let leds = ConsoleLeds::new(json);
    let deadline = opts
        .duration
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut ticker = Ticker::every(tick_period(signals.work_state()));

    while RUNNING.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
        ctrl.tick(&signals, &signals, &config, &leds);
        ticker.set_period(tick_period(signals.work_state()));
        ticker.next();
    }

    let snap = ctrl.snapshot();
    if json {
        match serde_json::to_string(&snap) {
            Ok(line) => println!("{line}"),
            Err(e) => log::error!("serializing snapshot: {e}"),
        }
    } else {
        println!();
        let w = kv_width(&["Uptime:"], &["GSM:", "GPS:", "Power:"]);
        kv("Uptime:", format_args!("{} ms", snap.uptime_ms), w);
        for s in &snap.leds {
            kv_indent(
                &format!("{}:", s.led),
                format_args!("{} ({} ms since change)", level(s.is_on), s.elapsed_ms),
                w,
            );
        }
    }
    ctrl.destroy();
    Ok(())
}
