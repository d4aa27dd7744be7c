//! Touch gesture debouncing.
//!
//! One physical press must yield one action, however long the finger
//! stays down and however much the resistive panel chatters on release.
//!
//! ```text
//!            contact                      no contact
//!   Idle ───────────────▶ Pressed ───────────────────▶ Settling
//!    ▲   (new gesture)      ▲                              │
//!    │                      └────── contact (same) ────────┤
//!    └──────────── quiet for the settle window ────────────┘
//! ```
//!
//! A contact seen while `Settling` after the window has already elapsed is
//! a new gesture, so a tap immediately following the quiet period is not
//! lost just because no empty sample was taken in between.

use crate::touch::TouchPoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Pressed,
    Settling { since_ms: u64 },
}

pub struct TouchDebouncer {
    state: DebounceState,
    settle_ms: u32,
    default_settle_ms: u32,
}

impl TouchDebouncer {
    pub fn new(default_settle_ms: u32) -> Self {
        Self {
            state: DebounceState::Idle,
            settle_ms: default_settle_ms,
            default_settle_ms,
        }
    }

    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Override the settle window for the gesture currently in progress.
    /// Resets to the default when the next gesture begins.
    pub fn set_settle_ms(&mut self, settle_ms: u32) {
        self.settle_ms = settle_ms;
    }

    /// Feed one touch sample.  Returns the point when it starts a new
    /// gesture; continued or bouncing contact returns `None`.
    pub fn update(&mut self, contact: Option<TouchPoint>, now_ms: u64) -> Option<TouchPoint> {
        match (self.state, contact) {
            (DebounceState::Idle, Some(p)) => self.begin(p),
            (DebounceState::Idle, None) => None,

            (DebounceState::Pressed, Some(_)) => None,
            (DebounceState::Pressed, None) => {
                self.state = DebounceState::Settling { since_ms: now_ms };
                None
            }

            (DebounceState::Settling { since_ms }, contact) => {
                let quiet = now_ms.saturating_sub(since_ms) >= u64::from(self.settle_ms);
                match contact {
                    Some(p) if quiet => self.begin(p),
                    Some(_) => {
                        self.state = DebounceState::Pressed;
                        None
                    }
                    None => {
                        if quiet {
                            self.state = DebounceState::Idle;
                        }
                        None
                    }
                }
            }
        }
    }

    fn begin(&mut self, p: TouchPoint) -> Option<TouchPoint> {
        self.state = DebounceState::Pressed;
        self.settle_ms = self.default_settle_ms;
        Some(p)
    }
}
