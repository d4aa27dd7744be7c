//! Logical actions produced by the touch router.
//!
//! The [`TouchRouter`](crate::touch::TouchRouter) resolves a coordinate to
//! one of these; [`PanelService`](super::service::PanelService) carries out
//! the side effects.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchAction {
    /// Touch outside every active region.
    NoAction,
    /// Start or stop the wireless report channel.
    ToggleWireless,
    /// Leave sleep mode.
    WakeDisplay,
    /// Flip the user-facing output flag and report it.
    ToggleOutput,
    /// Enter sleep mode.
    SleepDisplay,
}

impl TouchAction {
    pub fn is_action(self) -> bool {
        self != Self::NoAction
    }
}
