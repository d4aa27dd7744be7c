//! Application service: the hexagonal core.
//!
//! [`PanelService`] owns the system state, the latest sensor readings, the
//! scheduler, the power controller and the touch pipeline.  All I/O flows
//! through port traits injected at call sites, making the entire service
//! testable with mock adapters.
//!
//! ```text
//!  Board ─────────▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                   │         PanelService         │
//!  WirelessPort ◀──▶│ Scheduler · Power · Router   │ ──▶ ConsolePort
//!                   └──────────────────────────────┘
//! ```
//!
//! One [`poll`](PanelService::poll) is one pass of the cooperative loop:
//!
//! 1. drain the client-connected flag, emit a due delayed report
//! 2. drain received wireless lines
//! 3. periodic tasks: sensor poll, then relay toggle
//! 4. touch: sample, debounce, route, dispatch

use log::{info, warn};

use crate::config::PanelConfig;
use crate::events::EventFlag;
use crate::power::PowerController;
use crate::report;
use crate::scheduler::Scheduler;
use crate::sensors::SensorReadings;
use crate::touch::calibration::{self, CalibrationBlob, TouchCalibration};
use crate::touch::debounce::{DebounceState, TouchDebouncer};
use crate::touch::TouchRouter;
use crate::ui::Screen;

use super::commands::TouchAction;
use super::events::{AppEvent, CalibrationSource};
use super::ports::{
    Board, CalibrationPort, ConsolePort, EventSink, SchedulerDelegate, TaskId,
    TouchCalibrationPort, WirelessPort,
};
use super::state::SystemState;

// ───────────────────────────────────────────────────────────────
// PanelService
// ───────────────────────────────────────────────────────────────

pub struct PanelService {
    config: PanelConfig,
    state: SystemState,
    readings: SensorReadings,
    scheduler: Scheduler,
    power: PowerController,
    router: TouchRouter,
    debouncer: TouchDebouncer,
    screen: Screen,
    /// Raised by the wireless stack when a client connects.
    connect_flag: EventFlag,
    /// Monotonic time at which the connect-triggered report is due.
    pending_report_at: Option<u64>,
    /// Discard the stored calibration on the next boot.
    recalibrate: bool,
}

impl PanelService {
    /// Construct the service from configuration.
    ///
    /// Touches no hardware; call [`boot`](Self::boot) next.
    pub fn new(config: PanelConfig) -> Self {
        Self {
            state: SystemState::new(config.relay_initial_phase),
            readings: SensorReadings::default(),
            scheduler: Scheduler::from_config(&config),
            power: PowerController::new(&config),
            router: TouchRouter::new(),
            debouncer: TouchDebouncer::new(config.touch_settle_ms),
            screen: Screen::new(),
            connect_flag: EventFlag::new(),
            pending_report_at: None,
            recalibrate: false,
            config,
        }
    }

    /// Hand the connect flag to the wireless adapter.
    pub fn attach_wireless(&self, radio: &mut impl WirelessPort) {
        radio.set_connect_notifier(self.connect_flag.clone());
    }

    /// Any console input before boot forces an interactive touch
    /// calibration, replacing whatever is stored.
    pub fn check_recalibration_request(&mut self, console: &mut impl ConsolePort) -> bool {
        if console.input_pending() {
            info!("Console input at boot, touch recalibration requested");
            self.recalibrate = true;
        }
        self.recalibrate
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the panel up: clocks, relays, first conversion, calibration,
    /// full UI, backlight.
    pub fn boot<H, C>(
        &mut self,
        hw: &mut H,
        store: &mut C,
        sink: &mut impl EventSink,
    ) -> CalibrationSource
    where
        H: Board + TouchCalibrationPort,
        C: CalibrationPort,
    {
        self.power.boot(hw);
        hw.set_outputs(self.state.relay_phase());
        hw.request_conversion();

        let source = self.restore_calibration(hw, store);
        sink.emit(&AppEvent::Calibration(source));

        hw.set_backlight(false);
        self.screen.redraw_all(hw, &self.state, &self.readings);
        hw.set_backlight(true);
        self.state.display_awake = true;

        sink.emit(&AppEvent::Started);
        info!(
            "PanelService started (relay phase {}, {} MHz)",
            self.state.relay_phase(),
            self.power.cpu_mhz()
        );
        source
    }

    fn restore_calibration<H, C>(&mut self, hw: &mut H, store: &mut C) -> CalibrationSource
    where
        H: Board + TouchCalibrationPort,
        C: CalibrationPort,
    {
        let stored = if core::mem::take(&mut self.recalibrate) {
            if let Err(e) = store.clear() {
                warn!("Stored touch calibration not cleared: {}", e);
            }
            None
        } else {
            match store.load() {
                Ok(blob) => Some(blob),
                Err(e) => {
                    warn!("Touch calibration unavailable ({}), acquiring", e);
                    None
                }
            }
        };

        match stored {
            Some(blob) => {
                hw.apply_calibration(&TouchCalibration::from(&blob));
                info!("Touch calibration restored");
                CalibrationSource::Restored
            }
            None => {
                let cal = calibration::acquire(hw, self.config.touch_sample_timeout_ms);
                hw.apply_calibration(&cal);
                if let Err(e) = store.save(&CalibrationBlob::from(&cal)) {
                    warn!("Touch calibration not persisted: {}", e);
                }
                CalibrationSource::Acquired
            }
        }
    }

    // ── Per-pass orchestration ────────────────────────────────

    /// Run one pass of the control loop.  Never blocks beyond the touch
    /// sampling timeout and the fixed settle delays inside a dispatch.
    pub fn poll<H, W, C>(&mut self, hw: &mut H, radio: &mut W, console: &mut C, sink: &mut impl EventSink)
    where
        H: Board,
        W: WirelessPort,
        C: ConsolePort,
    {
        let now = hw.now_ms();

        // 1. Client connected → schedule a report after the settle delay.
        if self.connect_flag.take() && self.state.wireless_enabled {
            let at = now + u64::from(self.config.client_report_delay_ms);
            info!("Wireless client connected, report due at {} ms", at);
            self.pending_report_at = Some(at);
        }
        if self.pending_report_at.is_some_and(|at| now >= at) {
            self.pending_report_at = None;
            self.emit_report(console, radio, sink);
        }

        // 2. Received lines.
        if self.state.wireless_enabled {
            while let Some(line) = radio.try_receive_line() {
                sink.emit(&AppEvent::LineReceived(line));
            }
        }

        // 3. Periodic tasks.
        let mut runner = TaskRunner {
            hw: &mut *hw,
            sink: &mut *sink,
            state: &mut self.state,
            readings: &mut self.readings,
            screen: &mut self.screen,
        };
        self.scheduler.tick(now, &mut runner);

        // 4. Touch.
        let contact = hw.poll_touch(self.config.touch_sample_timeout_ms);
        if let Some(point) = self.debouncer.update(contact, hw.now_ms()) {
            let action = self.router.resolve(point, &self.state);
            self.debouncer.set_settle_ms(self.settle_for(action));
            if action.is_action() {
                info!("Touch ({}, {}) → {:?}", point.x, point.y, action);
                sink.emit(&AppEvent::Touch(action));
                self.dispatch(action, hw, radio, console, sink);
            }
        }
    }

    /// Quiet window the debouncer enforces after `action`.
    fn settle_for(&self, action: TouchAction) -> u32 {
        match action {
            TouchAction::ToggleOutput => self.config.output_settle_ms,
            _ => self.config.touch_settle_ms,
        }
    }

    // ── Action handling ───────────────────────────────────────

    /// Apply the side effects of a resolved touch action.
    pub fn dispatch<H, W, C>(
        &mut self,
        action: TouchAction,
        hw: &mut H,
        radio: &mut W,
        console: &mut C,
        sink: &mut impl EventSink,
    ) where
        H: Board,
        W: WirelessPort,
        C: ConsolePort,
    {
        match action {
            TouchAction::NoAction => {}
            TouchAction::ToggleWireless => self.toggle_wireless(hw, radio, sink),
            TouchAction::WakeDisplay => {
                if self.power.wake(hw, &mut self.state) {
                    self.screen.redraw_all(hw, &self.state, &self.readings);
                    sink.emit(&AppEvent::PowerChanged {
                        awake: true,
                        cpu_mhz: self.power.cpu_mhz(),
                    });
                }
            }
            TouchAction::SleepDisplay => {
                if self.power.sleep(hw, &mut self.state) {
                    sink.emit(&AppEvent::PowerChanged {
                        awake: false,
                        cpu_mhz: self.power.cpu_mhz(),
                    });
                }
            }
            TouchAction::ToggleOutput => {
                self.state.touch_output_enabled = !self.state.touch_output_enabled;
                if self.state.display_awake {
                    self.screen
                        .draw_output_button(hw, self.state.touch_output_enabled);
                }
                sink.emit(&AppEvent::OutputToggled {
                    enabled: self.state.touch_output_enabled,
                });
                self.emit_report(console, radio, sink);
            }
        }
    }

    fn toggle_wireless<H: Board, W: WirelessPort>(
        &mut self,
        hw: &mut H,
        radio: &mut W,
        sink: &mut impl EventSink,
    ) {
        if self.state.wireless_enabled {
            radio.stop();
            self.state.wireless_enabled = false;
            self.pending_report_at = None;
            self.connect_flag.take();
        } else {
            self.power.prepare_radio(hw);
            match radio.start(&self.config.wireless_name) {
                Ok(()) => self.state.wireless_enabled = true,
                Err(e) => warn!("Wireless start failed: {}", e),
            }
        }
        self.power.wireless_changed(hw, &self.state);

        if self.state.display_awake {
            self.screen
                .draw_wireless_indicator(hw, self.state.wireless_enabled);
        }
        sink.emit(&AppEvent::WirelessChanged {
            enabled: self.state.wireless_enabled,
        });
    }

    /// Write the current report to the console, and to the wireless client
    /// when one is connected.
    pub fn emit_report(
        &self,
        console: &mut impl ConsolePort,
        radio: &mut impl WirelessPort,
        sink: &mut impl EventSink,
    ) -> bool {
        let wireless = report::emit_report(&self.state, &self.readings, console, radio);
        sink.emit(&AppEvent::ReportEmitted { wireless });
        wireless
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> &SystemState {
        &self.state
    }

    pub fn readings(&self) -> &SensorReadings {
        &self.readings
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub fn cpu_mhz(&self) -> u32 {
        self.power.cpu_mhz()
    }

    pub fn debounce_state(&self) -> DebounceState {
        self.debouncer.state()
    }

    /// When the connect-triggered report will fire, if one is pending.
    pub fn pending_report_at(&self) -> Option<u64> {
        self.pending_report_at
    }

    pub fn format_report(&self) -> String {
        report::format_report(&self.state, &self.readings)
    }
}

// ───────────────────────────────────────────────────────────────
// Periodic task execution
// ───────────────────────────────────────────────────────────────

/// Borrows exactly what the periodic tasks touch, so the scheduler can
/// run them while the service still owns everything else.
struct TaskRunner<'a, H: Board, S: EventSink> {
    hw: &'a mut H,
    sink: &'a mut S,
    state: &'a mut SystemState,
    readings: &'a mut SensorReadings,
    screen: &'a mut Screen,
}

impl<H: Board, S: EventSink> SchedulerDelegate for TaskRunner<'_, H, S> {
    fn on_task_due(&mut self, task: TaskId, _now_ms: u64) {
        match task {
            TaskId::SensorPoll => {
                self.hw.request_conversion();
                *self.readings = SensorReadings::read_from(&mut *self.hw);
                if self.state.display_awake {
                    self.screen.draw_temperatures(&mut *self.hw, self.readings);
                }
                self.sink.emit(&AppEvent::SensorsPolled(*self.readings));
            }
            TaskId::RelayToggle => {
                let phase = self.state.toggle_relay_phase();
                self.hw.set_outputs(phase);
                if self.state.display_awake {
                    self.screen
                        .draw_relay_status(&mut *self.hw, self.state.relay_outputs());
                }
                self.sink.emit(&AppEvent::RelaysToggled { phase });
            }
        }
    }
}
