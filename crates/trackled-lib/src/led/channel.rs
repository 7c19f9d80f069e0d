//! Per-LED runtime state and cadence constants.

use crate::hardware::{Led, LedHardware};

/// Nominal tick period while awake (milliseconds).
pub const TICK_PERIOD_MS: u32 = 10;

/// Uptime credited per tick while the device sleeps (milliseconds).
pub const SLEEP_TICK_MS: u32 = 1000;

/// GSM quick-flashes for this much uptime after creation (milliseconds).
pub const QUICK_FLASH_WINDOW_MS: u64 = 7000;

/// Quick flash: toggle every 100 ms.
pub const QUICK_FLASH_PERIOD_MS: u32 = 100;

/// Slow flash on-phase (milliseconds).
pub const SLOW_FLASH_ON_MS: u32 = 100;

/// Slow flash off-phase (milliseconds).
pub const SLOW_FLASH_OFF_MS: u32 = 1900;

/// Power LED slow threshold: a full 2 s period, measured from the last toggle.
pub const POWER_SLOW_PERIOD_MS: u32 = QUICK_FLASH_PERIOD_MS + SLOW_FLASH_OFF_MS;

/// Output level and time since the last transition for one LED.
///
/// `is_on` mirrors the last level pushed to the hardware. `elapsed_ms` is
/// reset on every transition and saturates rather than wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LedChannel {
    led: Led,
    is_on: bool,
    elapsed_ms: u32,
}

impl LedChannel {
    pub fn new(led: Led) -> Self {
        Self {
            led,
            is_on: false,
            elapsed_ms: 0,
        }
    }

    pub fn led(&self) -> Led {
        self.led
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn elapsed_ms(&self) -> u32 {
        self.elapsed_ms
    }

    /// Account for one tick.
    pub(crate) fn advance(&mut self) {
        self.elapsed_ms = self.elapsed_ms.saturating_add(TICK_PERIOD_MS);
    }

    /// Write `on` and restart the accumulator. Writes even if unchanged.
    pub(crate) fn force(&mut self, on: bool, hw: &impl LedHardware) {
        self.is_on = on;
        self.elapsed_ms = 0;
        log::trace!("[led] {} -> {}", self.led, if on { "on" } else { "off" });
        hw.set_led(self.led, on);
    }

    /// Write off without touching the accumulator.
    pub(crate) fn hold_off(&mut self, hw: &impl LedHardware) {
        self.is_on = false;
        log::trace!("[led] {} -> off (held)", self.led);
        hw.set_led(self.led, false);
    }

    /// Toggle once the accumulator has reached `threshold_ms`.
    pub(crate) fn toggle_after(&mut self, threshold_ms: u32, hw: &impl LedHardware) -> bool {
        if self.elapsed_ms >= threshold_ms {
            self.force(!self.is_on, hw);
            true
        } else {
            false
        }
    }
}
