//! Tick-driven controller for the GSM, GPS and power LEDs.
//!
//! [`LedController`] owns all LED timing state. The host calls
//! [`LedController::tick`] every [`TICK_PERIOD_MS`] from a single timer
//! context; the mode setters only record the new target, which takes effect
//! on the next tick.

use serde::Serialize;

use super::channel::{
    LedChannel, POWER_SLOW_PERIOD_MS, QUICK_FLASH_PERIOD_MS, QUICK_FLASH_WINDOW_MS,
    SLEEP_TICK_MS, SLOW_FLASH_OFF_MS, SLOW_FLASH_ON_MS, TICK_PERIOD_MS,
};
use super::mode::LedMode;
use super::power::PowerPattern;
use crate::hardware::{BatteryStatus, DeviceConfig, Led, LedHardware, Signals, WorkStateSource};

/// Serializable view of one LED.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedSnapshot {
    pub led: Led,
    pub is_on: bool,
    pub elapsed_ms: u32,
}

/// Serializable view of the whole controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub uptime_ms: u64,
    pub gsm_mode: LedMode,
    pub gps_mode: LedMode,
    pub leds: Vec<LedSnapshot>,
}

/// Indicator LED state machine.
#[derive(Debug, Clone)]
pub struct LedController {
    uptime_ms: u64,
    gsm: LedChannel,
    gsm_mode: LedMode,
    gps: LedChannel,
    gps_mode: LedMode,
    power: LedChannel,
}

impl Default for LedController {
    fn default() -> Self {
        Self::new()
    }
}

impl LedController {
    /// Zeroed state: uptime 0, every LED off, GSM and GPS flashing.
    pub fn new() -> Self {
        log::debug!("[led] controller created");
        Self {
            uptime_ms: 0,
            gsm: LedChannel::new(Led::Gsm),
            gsm_mode: LedMode::Flash,
            gps: LedChannel::new(Led::Gps),
            gps_mode: LedMode::Flash,
            power: LedChannel::new(Led::Power),
        }
    }

    /// Tear down. Owns no resources, so this only ends the controller's life.
    pub fn destroy(self) {
        log::debug!("[led] controller destroyed after {} ms", self.uptime_ms);
    }

    /// Sample the collaborators once, then run one tick.
    pub fn tick(
        &mut self,
        work: &impl WorkStateSource,
        battery: &impl BatteryStatus,
        config: &impl DeviceConfig,
        hw: &impl LedHardware,
    ) {
        let signals = Signals::sample(work, battery, config);
        self.tick_with(&signals, hw);
    }

    /// Run one tick against an already-sampled signal snapshot.
    pub fn tick_with(&mut self, signals: &Signals, hw: &impl LedHardware) {
        let step = if signals.work_state.is_sleep() {
            SLEEP_TICK_MS
        } else {
            TICK_PERIOD_MS
        };
        self.uptime_ms = self.uptime_ms.saturating_add(u64::from(step));

        self.gsm_step(signals, hw);
        self.gps_step(hw);
        if signals.device_type.has_power_led() {
            self.power_step(signals, hw);
        }
    }

    fn gsm_step(&mut self, signals: &Signals, hw: &impl LedHardware) {
        self.gsm.advance();

        // Asserted off on every sleeping tick; the accumulator keeps running.
        if signals.work_state.is_sleep() {
            self.gsm.hold_off(hw);
            return;
        }

        if self.uptime_ms < QUICK_FLASH_WINDOW_MS {
            self.gsm.toggle_after(QUICK_FLASH_PERIOD_MS, hw);
            return;
        }

        match self.gsm_mode.steady_level() {
            Some(level) => self.gsm.force(level, hw),
            None => {
                if self.gsm.is_on() {
                    self.gsm.toggle_after(SLOW_FLASH_ON_MS, hw);
                } else {
                    self.gsm.toggle_after(SLOW_FLASH_OFF_MS, hw);
                }
            }
        }
    }

    fn gps_step(&mut self, hw: &impl LedHardware) {
        self.gps.advance();

        match self.gps_mode.steady_level() {
            Some(level) => self.gps.force(level, hw),
            None => {
                self.gps.toggle_after(QUICK_FLASH_PERIOD_MS, hw);
            }
        }
    }

    fn power_step(&mut self, signals: &Signals, hw: &impl LedHardware) {
        self.power.advance();

        match PowerPattern::select(signals) {
            PowerPattern::Off => self.power.force(false, hw),
            PowerPattern::LowBatteryBlink => {
                self.power.toggle_after(QUICK_FLASH_PERIOD_MS, hw);
            }
            PowerPattern::FullBlink => {
                self.power.toggle_after(POWER_SLOW_PERIOD_MS, hw);
            }
            PowerPattern::Charging => self.power.force(true, hw),
            PowerPattern::Normal => {
                // Off-phase waits the full period, not SLOW_FLASH_OFF_MS.
                let threshold = if self.power.is_on() {
                    QUICK_FLASH_PERIOD_MS
                } else {
                    POWER_SLOW_PERIOD_MS
                };
                self.power.toggle_after(threshold, hw);
            }
        }
    }

    /// Set the GSM target mode. Takes effect on the next tick.
    pub fn set_gsm_mode(&mut self, mode: LedMode) {
        if self.gsm_mode != mode {
            log::debug!("[led] GSM mode {} -> {mode}", self.gsm_mode);
        }
        self.gsm_mode = mode;
    }

    /// Set the GPS target mode. Takes effect on the next tick.
    pub fn set_gps_mode(&mut self, mode: LedMode) {
        if self.gps_mode != mode {
            log::debug!("[led] GPS mode {} -> {mode}", self.gps_mode);
        }
        self.gps_mode = mode;
    }

    pub fn uptime_ms(&self) -> u64 {
        self.uptime_ms
    }

    pub fn gsm_mode(&self) -> LedMode {
        self.gsm_mode
    }

    pub fn gps_mode(&self) -> LedMode {
        self.gps_mode
    }

    fn channel(&self, led: Led) -> &LedChannel {
        match led {
            Led::Gsm => &self.gsm,
            Led::Gps => &self.gps,
            Led::Power => &self.power,
        }
    }

    /// Last level written to `led`.
    pub fn is_on(&self, led: Led) -> bool {
        self.channel(led).is_on()
    }

    /// Time since `led`'s last transition.
    pub fn elapsed_ms(&self, led: Led) -> u32 {
        self.channel(led).elapsed_ms()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            uptime_ms: self.uptime_ms,
            gsm_mode: self.gsm_mode,
            gps_mode: self.gps_mode,
            leds: [&self.gsm, &self.gps, &self.power]
                .into_iter()
                .map(|ch| LedSnapshot {
                    led: ch.led(),
                    is_on: ch.is_on(),
                    elapsed_ms: ch.elapsed_ms(),
                })
                .collect(),
        }
    }
}
