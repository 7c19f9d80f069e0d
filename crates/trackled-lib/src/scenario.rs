//! Scripted signal timelines replayed against the controller in virtual time.
//!
//! A scenario is a TOML list of steps. Each step holds a set of signals for
//! `duration_ms`; fields left out carry over from the previous step. No
//! hardware or wall-clock time is involved, so a replay is deterministic.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::hardware::{DeviceType, Led, LedHardware, Signals, WorkState};
use crate::led::{ControllerSnapshot, LedController, LedMode, SLEEP_TICK_MS, TICK_PERIOD_MS};
use crate::TrackledError;

/// One segment of a scenario.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Step {
    pub duration_ms: u64,
    #[serde(default)]
    pub work_state: Option<WorkState>,
    #[serde(default)]
    pub charging: Option<bool>,
    #[serde(default)]
    pub battery_full: Option<bool>,
    #[serde(default)]
    pub low_voltage_alarm: Option<bool>,
    /// Applied through the mode setter when the step begins.
    #[serde(default)]
    pub gsm_mode: Option<LedMode>,
    #[serde(default)]
    pub gps_mode: Option<LedMode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default = "default_device_type")]
    pub device_type: String,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

fn default_device_type() -> String {
    "GS06".into()
}

/// Longest allowed step: one day of virtual time.
pub const MAX_STEP_MS: u64 = 24 * 60 * 60 * 1000;

/// An LED output change at a point in virtual time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedEvent {
    pub at_ms: u64,
    pub led: Led,
    pub on: bool,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub device_type: String,
    pub ticks: u64,
    pub elapsed_ms: u64,
    /// Hardware writes per LED, including unchanged re-assertions.
    pub writes: LedCounts,
    /// Writes that changed the output level.
    pub events: Vec<LedEvent>,
    pub final_state: ControllerSnapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LedCounts {
    pub gsm: u64,
    pub gps: u64,
    pub power: u64,
}

impl LedCounts {
    pub fn get(&self, led: Led) -> u64 {
        match led {
            Led::Gsm => self.gsm,
            Led::Gps => self.gps,
            Led::Power => self.power,
        }
    }

    fn bump(&mut self, led: Led) {
        match led {
            Led::Gsm => self.gsm += 1,
            Led::Gps => self.gps += 1,
            Led::Power => self.power += 1,
        }
    }
}

impl SimulationReport {
    /// Output changes for one LED.
    pub fn events_for(&self, led: Led) -> impl Iterator<Item = &LedEvent> {
        self.events.iter().filter(move |e| e.led == led)
    }
}

/// LED sink that timestamps writes against the replay's virtual clock.
#[derive(Debug, Default)]
struct RecordingLeds {
    now_ms: u64,
    levels: RefCell<[bool; 3]>,
    writes: RefCell<LedCounts>,
    events: RefCell<Vec<LedEvent>>,
}

impl LedHardware for RecordingLeds {
    fn set_led(&self, led: Led, on: bool) {
        self.writes.borrow_mut().bump(led);
        let mut levels = self.levels.borrow_mut();
        if levels[led.index()] != on {
            levels[led.index()] = on;
            self.events.borrow_mut().push(LedEvent {
                at_ms: self.now_ms,
                led,
                on,
            });
        }
    }
}

impl Scenario {
    /// Parse and validate a scenario document.
    pub fn parse(contents: &str) -> Result<Self> {
        let scenario: Scenario =
            toml::from_str(contents).map_err(|e| TrackledError::Scenario(e.to_string()))?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read and parse a scenario file.
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    fn validate(&self) -> Result<()> {
        if self.steps.is_empty() {
            return Err(TrackledError::Scenario("scenario has no steps".into()));
        }
        if let Some(i) = self.steps.iter().position(|s| s.duration_ms == 0) {
            return Err(TrackledError::Scenario(format!(
                "step {} has zero duration",
                i + 1
            )));
        }
        if let Some(i) = self.steps.iter().position(|s| s.duration_ms > MAX_STEP_MS) {
            return Err(TrackledError::Scenario(format!(
                "step {} exceeds the {MAX_STEP_MS} ms step limit",
                i + 1
            )));
        }
        Ok(())
    }

    /// Replay every step against a fresh controller.
    pub fn run(&self) -> SimulationReport {
        let device_type = DeviceType::parse(&self.device_type);
        if device_type == DeviceType::Unknown {
            log::debug!(
                "[scenario] unrecognised device type \"{}\", power LED disabled",
                self.device_type
            );
        }

        let mut ctrl = LedController::new();
        let mut leds = RecordingLeds::default();
        let mut signals = Signals::idle(device_type);
        let mut ticks = 0u64;

        for (i, step) in self.steps.iter().enumerate() {
            apply_step(step, &mut signals, &mut ctrl);
            let tick_ms = u64::from(if signals.work_state.is_sleep() {
                SLEEP_TICK_MS
            } else {
                TICK_PERIOD_MS
            });
            let step_ticks = step.duration_ms.div_ceil(tick_ms);
            if step.duration_ms % tick_ms != 0 {
                log::debug!(
                    "[scenario] step {} runs {} ms past its {} ms duration",
                    i + 1,
                    step_ticks * tick_ms - step.duration_ms,
                    step.duration_ms
                );
            }
            for _ in 0..step_ticks {
                leds.now_ms += tick_ms;
                ctrl.tick_with(&signals, &leds);
            }
            ticks += step_ticks;
        }

        let final_state = ctrl.snapshot();
        ctrl.destroy();

        SimulationReport {
            device_type: device_type.to_string(),
            ticks,
            elapsed_ms: leds.now_ms,
            writes: *leds.writes.borrow(),
            events: leds.events.take(),
            final_state,
        }
    }
}

fn apply_step(step: &Step, signals: &mut Signals, ctrl: &mut LedController) {
    if let Some(ws) = step.work_state {
        signals.work_state = ws;
    }
    if let Some(v) = step.charging {
        signals.charging = v;
    }
    if let Some(v) = step.battery_full {
        signals.battery_full = v;
    }
    if let Some(v) = step.low_voltage_alarm {
        signals.low_voltage_alarm = v;
    }
    if let Some(m) = step.gsm_mode {
        ctrl.set_gsm_mode(m);
    }
    if let Some(m) = step.gps_mode {
        ctrl.set_gps_mode(m);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal() {
        let sc = Scenario::parse("[[step]]\nduration_ms = 100\n").unwrap();
        assert_eq!(sc.device_type, "GS06");
        assert_eq!(sc.steps.len(), 1);
        assert!(sc.steps[0].work_state.is_none());
    }

    #[test]
    fn parse_all_fields() {
        let sc = Scenario::parse(
            r#"
device_type = "GS08"

[[step]]
duration_ms = 500
work_state = "sleep"
charging = true
battery_full = false
low_voltage_alarm = true
gsm_mode = "on"
gps_mode = "steady-off"
"#,
        )
        .unwrap();
        let s = &sc.steps[0];
        assert_eq!(s.work_state, Some(WorkState::Sleep));
        assert_eq!(s.charging, Some(true));
        assert_eq!(s.gsm_mode, Some(LedMode::SteadyOn));
        assert_eq!(s.gps_mode, Some(LedMode::SteadyOff));
    }

    #[test]
    fn rejects_empty_scenario() {
        let err = Scenario::parse("device_type = \"GS06\"").unwrap_err();
        assert!(err.to_string().contains("no steps"), "got: {err}");
    }

    #[test]
    fn rejects_zero_duration() {
        let err = Scenario::parse("[[step]]\nduration_ms = 10\n[[step]]\nduration_ms = 0\n")
            .unwrap_err();
        assert!(err.to_string().contains("step 2"), "got: {err}");
    }

    #[test]
    fn rejects_unknown_field() {
        let err = Scenario::parse("[[step]]\nduration_ms = 10\nbrightness = 3\n").unwrap_err();
        assert!(matches!(err, TrackledError::Scenario(_)));
    }

    #[test]
    fn rejects_bad_mode() {
        assert!(Scenario::parse("[[step]]\nduration_ms = 10\ngsm_mode = \"blink\"\n").is_err());
    }

    #[test]
    fn rejects_oversized_step() {
        let err = Scenario::parse(
            "[[step]]\nduration_ms = 10\n[[step]]\nduration_ms = 9000000000000000000\n",
        )
        .unwrap_err();
        assert!(err.to_string().contains("step 2 exceeds"), "got: {err}");
        let at_limit = format!("[[step]]\nduration_ms = {MAX_STEP_MS}\nwork_state = \"sleep\"\n");
        assert!(Scenario::parse(&at_limit).is_ok());
    }

    #[test]
    fn awake_step_runs_one_tick_per_10ms() {
        let report = Scenario::parse("[[step]]\nduration_ms = 1000\n").unwrap().run();
        assert_eq!(report.ticks, 100);
        assert_eq!(report.elapsed_ms, 1000);
        assert_eq!(report.final_state.uptime_ms, 1000);
        assert_eq!(report.writes.gps, 10);
        assert_eq!(report.events_for(Led::Gps).count(), 10);
    }

    #[test]
    fn sleep_step_runs_one_tick_per_second() {
        let report = Scenario::parse("[[step]]\nduration_ms = 5000\nwork_state = \"sleep\"\n")
            .unwrap()
            .run();
        assert_eq!(report.ticks, 5);
        assert_eq!(report.elapsed_ms, 5000);
        // Every sleeping tick re-asserts GSM and power off.
        assert_eq!(report.writes.gsm, 5);
        assert_eq!(report.writes.power, 5);
        assert_eq!(report.events_for(Led::Gsm).count(), 0);
    }

    #[test]
    fn partial_tick_rounds_up() {
        let report = Scenario::parse("[[step]]\nduration_ms = 15\n").unwrap().run();
        assert_eq!(report.ticks, 2);
        assert_eq!(report.elapsed_ms, 20);
    }

    #[test]
    fn signals_carry_over_between_steps() {
        let report = Scenario::parse(
            "[[step]]\nduration_ms = 100\ncharging = true\n[[step]]\nduration_ms = 100\n",
        )
        .unwrap()
        .run();
        // Charging held for both steps: power forced on every tick.
        assert_eq!(report.writes.power, 20);
        assert_eq!(report.events_for(Led::Power).count(), 1);
    }

    #[test]
    fn events_carry_virtual_timestamps() {
        let report = Scenario::parse("[[step]]\nduration_ms = 300\n").unwrap().run();
        let gps: Vec<LedEvent> = report.events_for(Led::Gps).copied().collect();
        assert_eq!(
            gps,
            vec![
                LedEvent {
                    at_ms: 100,
                    led: Led::Gps,
                    on: true,
                },
                LedEvent {
                    at_ms: 200,
                    led: Led::Gps,
                    on: false,
                },
                LedEvent {
                    at_ms: 300,
                    led: Led::Gps,
                    on: true,
                },
            ]
        );
    }

    #[test]
    fn unknown_device_never_writes_power() {
        let report = Scenario::parse(
            "device_type = \"GS03\"\n[[step]]\nduration_ms = 5000\ncharging = true\n",
        )
        .unwrap()
        .run();
        assert_eq!(report.writes.power, 0);
        assert_eq!(report.device_type, "GS03");
    }

    #[test]
    fn report_serializes() {
        let report = Scenario::parse("[[step]]\nduration_ms = 100\n").unwrap().run();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ticks"], 10);
        assert_eq!(json["events"][0]["led"], "gsm");
        assert!(json["final_state"]["leds"].is_array());
    }
}
