//! Power LED pattern selection.

use serde::Serialize;

use crate::hardware::Signals;

/// Which power LED behavior applies this tick. First match wins, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerPattern {
    /// Asleep: held off so the LED draws nothing on a low battery.
    Off,
    /// Low-voltage alarm while not charging: 100 ms quick flash.
    LowBatteryBlink,
    /// Charging and full: toggle every 2 s.
    FullBlink,
    /// Charging, not yet full: held on.
    Charging,
    /// Normal operation: short flash then a 2 s wait.
    Normal,
}

impl PowerPattern {
    /// Select from a fresh signal snapshot. Nothing carries over between ticks.
    pub fn select(signals: &Signals) -> Self {
        if signals.work_state.is_sleep() {
            PowerPattern::Off
        } else if signals.low_voltage_alarm && !signals.charging {
            PowerPattern::LowBatteryBlink
        } else if signals.battery_full && signals.charging {
            PowerPattern::FullBlink
        } else if signals.charging {
            PowerPattern::Charging
        } else {
            PowerPattern::Normal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::{DeviceType, WorkState};

    fn signals(sleep: bool, alarm: bool, charging: bool, full: bool) -> Signals {
        Signals {
            work_state: if sleep { WorkState::Sleep } else { WorkState::Work },
            low_voltage_alarm: alarm,
            charging,
            battery_full: full,
            device_type: DeviceType::Gs06,
        }
    }

    #[test]
    fn sleep_overrides_everything() {
        for alarm in [false, true] {
            for charging in [false, true] {
                for full in [false, true] {
                    assert_eq!(
                        PowerPattern::select(&signals(true, alarm, charging, full)),
                        PowerPattern::Off
                    );
                }
            }
        }
    }

    #[test]
    fn alarm_only_when_not_charging() {
        assert_eq!(
            PowerPattern::select(&signals(false, true, false, false)),
            PowerPattern::LowBatteryBlink
        );
        assert_eq!(
            PowerPattern::select(&signals(false, true, false, true)),
            PowerPattern::LowBatteryBlink
        );
        assert_eq!(
            PowerPattern::select(&signals(false, true, true, false)),
            PowerPattern::Charging
        );
        assert_eq!(
            PowerPattern::select(&signals(false, true, true, true)),
            PowerPattern::FullBlink
        );
    }

    #[test]
    fn full_without_charging_is_normal() {
        assert_eq!(
            PowerPattern::select(&signals(false, false, false, true)),
            PowerPattern::Normal
        );
    }

    #[test]
    fn charging_not_full_is_steady() {
        assert_eq!(
            PowerPattern::select(&signals(false, false, true, false)),
            PowerPattern::Charging
        );
    }

    #[test]
    fn idle_is_normal() {
        assert_eq!(
            PowerPattern::select(&Signals::idle(DeviceType::Gs08)),
            PowerPattern::Normal
        );
    }
}
