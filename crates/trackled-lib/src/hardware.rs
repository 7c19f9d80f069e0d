//! Collaborator seams: work-state, battery, device type and the LED outputs.
//!
//! The controller only talks to the outside world through these traits.
//! Every query is infallible here: a backend that can fail must fall back to
//! a sensible value before it answers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ── LED outputs ──

/// One of the three indicator LEDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Led {
    Gsm,
    Gps,
    Power,
}

impl Led {
    pub const ALL: [Led; 3] = [Led::Gsm, Led::Gps, Led::Power];

    /// Stable array index (GSM = 0, GPS = 1, Power = 2).
    pub fn index(self) -> usize {
        match self {
            Led::Gsm => 0,
            Led::Gps => 1,
            Led::Power => 2,
        }
    }
}

impl fmt::Display for Led {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Led::Gsm => "GSM",
            Led::Gps => "GPS",
            Led::Power => "Power",
        };
        f.pad(name)
    }
}

/// Physical LED driver. One boolean set operation per LED.
pub trait LedHardware {
    fn set_led(&self, led: Led, on: bool);
}

// ── Work state ──

/// Device-wide operating mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkState {
    #[default]
    Work,
    Sleep,
}

impl WorkState {
    pub fn is_sleep(self) -> bool {
        self == WorkState::Sleep
    }
}

impl fmt::Display for WorkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkState::Work => write!(f, "work"),
            WorkState::Sleep => write!(f, "sleep"),
        }
    }
}

impl FromStr for WorkState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(WorkState::Work),
            "sleep" => Ok(WorkState::Sleep),
            other => Err(format!("unknown work state \"{other}\" (expected work or sleep)")),
        }
    }
}

/// Reports the current work state.
pub trait WorkStateSource {
    fn work_state(&self) -> WorkState;
}

// ── Battery ──

/// Battery and charger status. The three facts are independent.
pub trait BatteryStatus {
    /// Low-voltage alarm is active.
    fn low_voltage_alarm(&self) -> bool;
    /// Charger is connected and charging.
    fn is_charging(&self) -> bool;
    /// Battery reports full.
    fn is_full(&self) -> bool;
}

// ── Device type ──

/// GS-series tracker model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceType {
    Gs03,
    Gs05,
    Gs06,
    Gs07,
    Gs08,
    Gs09,
    Gs10,
    Unknown,
}

impl DeviceType {
    /// Whether this model carries a power LED. Only GS06 and GS08 do.
    pub fn has_power_led(self) -> bool {
        matches!(self, DeviceType::Gs06 | DeviceType::Gs08)
    }

    /// Parse a model name. Unrecognised names map to [`DeviceType::Unknown`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_uppercase().as_str() {
            "GS03" => DeviceType::Gs03,
            "GS05" => DeviceType::Gs05,
            "GS06" => DeviceType::Gs06,
            "GS07" => DeviceType::Gs07,
            "GS08" => DeviceType::Gs08,
            "GS09" => DeviceType::Gs09,
            "GS10" => DeviceType::Gs10,
            _ => DeviceType::Unknown,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceType::Gs03 => "GS03",
            DeviceType::Gs05 => "GS05",
            DeviceType::Gs06 => "GS06",
            DeviceType::Gs07 => "GS07",
            DeviceType::Gs08 => "GS08",
            DeviceType::Gs09 => "GS09",
            DeviceType::Gs10 => "GS10",
            DeviceType::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Configuration lookup for the device model.
pub trait DeviceConfig {
    fn device_type(&self) -> DeviceType;
}

// ── Per-tick snapshot ──

/// Every inbound query, sampled once at the start of a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    pub work_state: WorkState,
    pub low_voltage_alarm: bool,
    pub charging: bool,
    pub battery_full: bool,
    pub device_type: DeviceType,
}

impl Signals {
    /// Query each collaborator exactly once.
    pub fn sample(
        work: &impl WorkStateSource,
        battery: &impl BatteryStatus,
        config: &impl DeviceConfig,
    ) -> Self {
        Signals {
            work_state: work.work_state(),
            low_voltage_alarm: battery.low_voltage_alarm(),
            charging: battery.is_charging(),
            battery_full: battery.is_full(),
            device_type: config.device_type(),
        }
    }

    /// Awake, battery idle, on the given model.
    pub fn idle(device_type: DeviceType) -> Self {
        Signals {
            work_state: WorkState::Work,
            low_voltage_alarm: false,
            charging: false,
            battery_full: false,
            device_type,
        }
    }
}

// ── Mock board for testing ──

/// In-memory board for unit and integration tests.
///
/// Always compiled (zero runtime cost), hidden from public docs.
#[doc(hidden)]
pub mod mock {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Settable signals plus a log of every LED write, in call order.
    pub struct MockBoard {
        pub work_state: Cell<WorkState>,
        pub low_voltage_alarm: Cell<bool>,
        pub charging: Cell<bool>,
        pub full: Cell<bool>,
        pub device_type: Cell<DeviceType>,
        /// Recorded LED writes: (led, level).
        pub writes: RefCell<Vec<(Led, bool)>>,
    }

    impl Default for MockBoard {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockBoard {
        /// A GS06 (power LED fitted), awake, battery idle.
        pub fn new() -> Self {
            MockBoard {
                work_state: Cell::new(WorkState::Work),
                low_voltage_alarm: Cell::new(false),
                charging: Cell::new(false),
                full: Cell::new(false),
                device_type: Cell::new(DeviceType::Gs06),
                writes: RefCell::new(Vec::new()),
            }
        }

        pub fn with_device_type(device_type: DeviceType) -> Self {
            let board = Self::new();
            board.device_type.set(device_type);
            board
        }

        /// Levels written to one LED, in order.
        pub fn writes_for(&self, led: Led) -> Vec<bool> {
            self.writes
                .borrow()
                .iter()
                .filter(|(l, _)| *l == led)
                .map(|&(_, on)| on)
                .collect()
        }

        /// Number of writes that changed the LED's level (first write counts
        /// as a change when it turns the LED on).
        pub fn toggles_for(&self, led: Led) -> usize {
            let mut last = false;
            let mut toggles = 0;
            for on in self.writes_for(led) {
                if on != last {
                    toggles += 1;
                    last = on;
                }
            }
            toggles
        }

        pub fn clear_writes(&self) {
            self.writes.borrow_mut().clear();
        }
    }

    impl LedHardware for MockBoard {
        fn set_led(&self, led: Led, on: bool) {
            self.writes.borrow_mut().push((led, on));
        }
    }

    impl WorkStateSource for MockBoard {
        fn work_state(&self) -> WorkState {
            self.work_state.get()
        }
    }

    impl BatteryStatus for MockBoard {
        fn low_voltage_alarm(&self) -> bool {
            self.low_voltage_alarm.get()
        }

        fn is_charging(&self) -> bool {
            self.charging.get()
        }

        fn is_full(&self) -> bool {
            self.full.get()
        }
    }

    impl DeviceConfig for MockBoard {
        fn device_type(&self) -> DeviceType {
            self.device_type.get()
        }
    }
}
