//! Periodic task scheduler.
//!
//! Two fixed-interval jobs share the control loop: the sensor poll and the
//! relay toggle.  The scheduler only decides *when*; the work itself is done
//! by a [`SchedulerDelegate`] the service passes in on every tick.
//!
//! ```text
//!   ┌──────────────┐  tick(now)  ┌───────────┐  on_task_due()  ┌──────────────┐
//!   │  Main loop   │────────────▶│ Scheduler │────────────────▶│ PanelService │
//!   └──────────────┘             └───────────┘                 └──────────────┘
//! ```
//!
//! Timing rules:
//!
//! * A task fires when `now - last >= interval`.
//! * Firing re-baselines to `now`, not to `last + interval`.  A late loop
//!   pass never produces a burst of catch-up firings.
//! * Tasks are checked in slot order, so within one tick the sensor poll
//!   always runs before the relay toggle.

use crate::app::ports::{SchedulerDelegate, TaskId};
use crate::config::PanelConfig;
use log::debug;

// ═══════════════════════════════════════════════════════════════
//  Task slots
// ═══════════════════════════════════════════════════════════════

const TASK_COUNT: usize = 2;

/// Bookkeeping for one periodic task.
#[derive(Debug, Clone, Copy)]
struct TaskEntry {
    id: TaskId,
    interval_ms: u64,
    /// Monotonic time of the last firing (boot counts as a firing).
    last_ms: u64,
}

impl TaskEntry {
    fn is_due(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.last_ms) >= self.interval_ms
    }
}

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Fixed two-slot scheduler owned by the service.
pub struct Scheduler {
    tasks: [TaskEntry; TASK_COUNT],
}

impl Scheduler {
    /// Both baselines start at `0`, i.e. boot.
    pub fn new(sensor_interval_ms: u32, relay_interval_ms: u32) -> Self {
        Self {
            tasks: [
                TaskEntry {
                    id: TaskId::SensorPoll,
                    interval_ms: u64::from(sensor_interval_ms),
                    last_ms: 0,
                },
                TaskEntry {
                    id: TaskId::RelayToggle,
                    interval_ms: u64::from(relay_interval_ms),
                    last_ms: 0,
                },
            ],
        }
    }

    pub fn from_config(config: &PanelConfig) -> Self {
        Self::new(config.sensor_poll_interval_ms, config.relay_toggle_interval_ms)
    }

    /// Fire every due task, in slot order.
    pub fn tick(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) {
        for task in self.tasks.iter_mut() {
            if task.is_due(now_ms) {
                debug!(
                    "Scheduler: {:?} due at {} ms ({} ms late)",
                    task.id,
                    now_ms,
                    now_ms.saturating_sub(task.last_ms + task.interval_ms)
                );
                task.last_ms = now_ms;
                delegate.on_task_due(task.id, now_ms);
            }
        }
    }

    /// Timestamp of the last firing of `task`.
    pub fn last_fired(&self, task: TaskId) -> u64 {
        self.tasks
            .iter()
            .find(|t| t.id == task)
            .map_or(0, |t| t.last_ms)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
