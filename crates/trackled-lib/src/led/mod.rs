//! Indicator LEDs: per-LED timing, blink cadences and the tick controller.

mod channel;
mod controller;
mod mode;
mod power;

pub use channel::{
    LedChannel, POWER_SLOW_PERIOD_MS, QUICK_FLASH_PERIOD_MS, QUICK_FLASH_WINDOW_MS,
    SLEEP_TICK_MS, SLOW_FLASH_OFF_MS, SLOW_FLASH_ON_MS, TICK_PERIOD_MS,
};
pub use controller::{ControllerSnapshot, LedController, LedSnapshot};
pub use mode::LedMode;
pub use power::PowerPattern;

pub use crate::hardware::Led;
