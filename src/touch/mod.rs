//! Touch routing: screen coordinate + power mode → logical action.
//!
//! Priority (first match wins):
//!
//! 1. Status region (top right): [`TouchAction::ToggleWireless`], awake or not.
//! 2. Display asleep: only the wake region yields [`TouchAction::WakeDisplay`].
//! 3. Display awake: left button [`TouchAction::ToggleOutput`], right button
//!    [`TouchAction::SleepDisplay`].
//!
//! Everything else is [`TouchAction::NoAction`].

pub mod calibration;
pub mod debounce;

use crate::app::commands::TouchAction;
use crate::app::state::SystemState;
use crate::ui::layout::{self, Rect};

/// Calibrated screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchPoint {
    pub x: u16,
    pub y: u16,
}

/// Hit regions used to resolve a touch.
#[derive(Debug, Clone, Copy)]
pub struct TouchRouter {
    status: Rect,
    wake: Rect,
    output: Rect,
    sleep: Rect,
}

impl Default for TouchRouter {
    fn default() -> Self {
        Self {
            status: layout::STATUS_REGION,
            wake: layout::SLEEP_BUTTON,
            output: layout::OUTPUT_BUTTON,
            sleep: layout::SLEEP_BUTTON,
        }
    }
}

impl TouchRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pure: resolving never mutates state.
    pub fn resolve(&self, point: TouchPoint, state: &SystemState) -> TouchAction {
        let (x, y) = (i32::from(point.x), i32::from(point.y));

        if self.status.contains(x, y) {
            return TouchAction::ToggleWireless;
        }

        if !state.display_awake {
            return if self.wake.contains(x, y) {
                TouchAction::WakeDisplay
            } else {
                TouchAction::NoAction
            };
        }

        if self.output.contains(x, y) {
            TouchAction::ToggleOutput
        } else if self.sleep.contains(x, y) {
            TouchAction::SleepDisplay
        } else {
            TouchAction::NoAction
        }
    }
}
