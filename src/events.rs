//! Cross-context signalling.
//!
//! The only producer outside the control loop is the wireless stack's
//! client-connected callback.  It runs in the Bluetooth task, so it may not
//! draw or touch [`SystemState`](crate::app::state::SystemState).  It raises
//! an [`EventFlag`] instead, and the loop drains the flag on its next pass.
//!
//! ```text
//! ┌──────────────────┐   raise()   ┌───────────┐   take()   ┌───────────┐
//! │ SPP connect cb   │────────────▶│ EventFlag │───────────▶│ Main loop │
//! │ (Bluetooth task) │             │ (1 slot)  │            │ (consumer)│
//! └──────────────────┘             └───────────┘            └───────────┘
//! ```
//!
//! The flag is single-slot: several connects before the loop drains it
//! collapse into one pending report.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Single-slot pending-event flag shared between a producer and the loop.
#[derive(Debug, Clone, Default)]
pub struct EventFlag(Arc<AtomicBool>);

impl EventFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the event pending.  Safe from any task.
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Consume the pending event.  Returns `true` at most once per raise.
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::AcqRel)
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
