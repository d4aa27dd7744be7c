//! Bluetooth serial adapter: the wireless report channel.
//!
//! Implements [`WirelessPort`] as a line-oriented SPP server.  Reports go
//! out verbatim and incoming bytes are assembled into lines on the control
//! loop side.
//!
//! ## cfg gating
//!
//! | Target                      | Backend                                   |
//! |-----------------------------|-------------------------------------------|
//! | `target_os = "espidf"`      | `BtDriver<BtClassic>` + SPP (`esp_spp_*`) |
//! | `not(target_os = "espidf")` | In-memory link driven by `sim_*` methods  |
//!
//! The controller and Bluedroid are owned by an `esp_idf_svc` [`BtDriver`]
//! that lives only while the server is up; dropping it powers the radio
//! down.  The Bluetooth options must be enabled in `sdkconfig.defaults`.
//!
//! Bluedroid runs its callbacks on its own task.  The callback only stores
//! the connection handle, queues received bytes and raises the connect
//! [`EventFlag`]; it never draws or touches application state.

use super::utils::is_printable_ascii;
use log::{info, warn};

use crate::app::ports::{ReceivedLine, WirelessPort};
use crate::error::CommsError;
use crate::events::EventFlag;

#[cfg(target_os = "espidf")]
use esp_idf_svc::bt::{BtClassic, BtDriver};
#[cfg(target_os = "espidf")]
use esp_idf_svc::hal::modem::Modem;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

/// Longest line handed to the loop.  Extra bytes are discarded.
pub const MAX_LINE_LEN: usize = 128;

/// Raw receive queue between the Bluetooth task and the loop.
#[cfg(target_os = "espidf")]
const RX_QUEUE_LEN: usize = 512;

#[cfg(target_os = "espidf")]
const SPP_SERVER_NAME: &core::ffi::CStr = c"PANEL_SPP";

// ───────────────────────────────────────────────────────────────
// Line assembly
// ───────────────────────────────────────────────────────────────

/// Splits a byte stream into `\n`-terminated lines.
///
/// `\r` is stripped, empty lines are dropped and anything past
/// [`MAX_LINE_LEN`] bytes is truncated.  Invalid UTF-8 is replaced.
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: heapless::Vec<u8, MAX_LINE_LEN>,
    truncated: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one byte.  Returns the completed line when `byte` is `\n`.
    pub fn push(&mut self, byte: u8) -> Option<ReceivedLine> {
        match byte {
            b'\n' => self.finish(),
            b'\r' => None,
            _ => {
                if self.buf.push(byte).is_err() {
                    self.truncated = true;
                }
                None
            }
        }
    }

    /// Discard a partial line.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    pub fn pending_len(&self) -> usize {
        self.buf.len()
    }

    fn finish(&mut self) -> Option<ReceivedLine> {
        if self.truncated {
            warn!("SPP: line longer than {} bytes truncated", MAX_LINE_LEN);
        }
        let bytes = core::mem::take(&mut self.buf);
        self.truncated = false;

        let mut line = ReceivedLine::new();
        for c in String::from_utf8_lossy(&bytes).chars() {
            if line.push(c).is_err() {
                break;
            }
        }
        (!line.is_empty()).then_some(line)
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF SPP static state
// ───────────────────────────────────────────────────────────────
//
// Bluedroid callbacks are C function pointers and cannot capture the
// adapter.  These statics bridge the callback context to it.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

/// Open SPP connection handle, `0` when no client is attached.
#[cfg(target_os = "espidf")]
static SPP_HANDLE: AtomicU32 = AtomicU32::new(0);

#[cfg(target_os = "espidf")]
static SPP_RX: std::sync::Mutex<heapless::Deque<u8, RX_QUEUE_LEN>> =
    std::sync::Mutex::new(heapless::Deque::new());

#[cfg(target_os = "espidf")]
static SPP_CONNECT_FLAG: std::sync::Mutex<Option<EventFlag>> = std::sync::Mutex::new(None);

#[cfg(target_os = "espidf")]
fn clear_rx_queue() {
    if let Ok(mut q) = SPP_RX.lock() {
        q.clear();
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn spp_event_handler(
    event: esp_idf_svc::sys::esp_spp_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_spp_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_spp_cb_event_t_ESP_SPP_INIT_EVT => {
            // SAFETY: called on the Bluedroid task after SPP init completed.
            let ret = unsafe {
                esp_spp_start_srv(
                    ESP_SPP_SEC_AUTHENTICATE as esp_spp_sec_t,
                    esp_spp_role_t_ESP_SPP_ROLE_SLAVE,
                    0,
                    SPP_SERVER_NAME.as_ptr(),
                )
            };
            if ret != ESP_OK as i32 {
                warn!("SPP: start_srv failed ({})", ret);
            }
        }
        esp_spp_cb_event_t_ESP_SPP_START_EVT => {
            info!("SPP: server listening");
        }
        esp_spp_cb_event_t_ESP_SPP_SRV_OPEN_EVT => {
            // SAFETY: Bluedroid passes a valid param for this event.
            let handle = unsafe { (*param).srv_open.handle };
            SPP_HANDLE.store(handle, AtomicOrdering::Release);
            clear_rx_queue();
            info!("SPP: client connected (handle={})", handle);
            if let Ok(flag) = SPP_CONNECT_FLAG.lock() {
                if let Some(flag) = flag.as_ref() {
                    flag.raise();
                }
            }
        }
        esp_spp_cb_event_t_ESP_SPP_CLOSE_EVT => {
            SPP_HANDLE.store(0, AtomicOrdering::Release);
            info!("SPP: client disconnected");
        }
        esp_spp_cb_event_t_ESP_SPP_DATA_IND_EVT => {
            // SAFETY: `data` points at `len` bytes valid for this callback.
            let data = unsafe {
                let p = &(*param).data_ind;
                core::slice::from_raw_parts(p.data, p.len as usize)
            };
            if let Ok(mut q) = SPP_RX.lock() {
                for &b in data {
                    if q.push_back(b).is_err() {
                        warn!("SPP: receive queue full, dropping {} bytes", data.len());
                        break;
                    }
                }
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// Simulation backend
// ───────────────────────────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
#[derive(Debug, Default)]
struct SimLink {
    connected: bool,
    rx: std::collections::VecDeque<u8>,
    sent: Vec<String>,
}

// ───────────────────────────────────────────────────────────────
// SPP adapter
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Off,
    Listening,
}

pub struct BtSerial {
    state: LinkState,
    assembler: LineAssembler,
    /// Controller plus Bluedroid, present while listening.
    #[cfg(target_os = "espidf")]
    driver: Option<BtDriver<'static, BtClassic>>,
    #[cfg(not(target_os = "espidf"))]
    notifier: Option<EventFlag>,
    #[cfg(not(target_os = "espidf"))]
    sim: SimLink,
}

impl Default for BtSerial {
    fn default() -> Self {
        Self::new()
    }
}

impl BtSerial {
    pub fn new() -> Self {
        Self {
            state: LinkState::Off,
            assembler: LineAssembler::new(),
            #[cfg(target_os = "espidf")]
            driver: None,
            #[cfg(not(target_os = "espidf"))]
            notifier: None,
            #[cfg(not(target_os = "espidf"))]
            sim: SimLink::default(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_start(&mut self, name: &str) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        let c_name = std::ffi::CString::new(name).map_err(|_| CommsError::ServerStartFailed)?;

        // SAFETY: nothing else in the firmware claims the radio modem, and
        // `platform_stop` drops the previous driver before a new one exists.
        let modem = unsafe { Modem::new() };
        let driver: BtDriver<'static, BtClassic> = BtDriver::new(modem, None).map_err(|e| {
            warn!("SPP: controller bring-up failed ({})", e);
            CommsError::StackInitFailed
        })?;
        self.driver = Some(driver);

        // SAFETY: the GAP/SPP calls below run on this task only, with the
        // stack enabled by the driver; the callback is a plain `extern "C"`
        // fn with static lifetime.
        unsafe {
            esp_bt_gap_set_device_name(c_name.as_ptr());
            esp_bt_gap_set_scan_mode(
                esp_bt_connection_mode_t_ESP_BT_CONNECTABLE,
                esp_bt_discovery_mode_t_ESP_BT_GENERAL_DISCOVERABLE,
            );

            if esp_spp_register_callback(Some(spp_event_handler)) != ESP_OK as i32 {
                warn!("SPP: callback registration failed");
                self.platform_stop();
                return Err(CommsError::ServerStartFailed);
            }

            let spp_cfg = esp_spp_cfg_t {
                mode: esp_spp_mode_t_ESP_SPP_MODE_CB,
                enable_l2cap_ertm: true,
                tx_buffer_size: 0,
            };
            if esp_spp_enhanced_init(&spp_cfg) != ESP_OK as i32 {
                warn!("SPP: init failed");
                self.platform_stop();
                return Err(CommsError::ServerStartFailed);
            }
        }

        info!("SPP(espidf): discoverable as '{}'", name);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_start(&mut self, name: &str) -> Result<(), CommsError> {
        info!("SPP(sim): discoverable as '{}'", name);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_stop(&mut self) {
        use esp_idf_svc::sys::*;

        // SAFETY: tolerates an SPP layer that never finished init.
        unsafe {
            esp_spp_deinit();
        }
        // Drop disables Bluedroid and the controller.
        self.driver = None;
        SPP_HANDLE.store(0, AtomicOrdering::Release);
        clear_rx_queue();
        info!("SPP(espidf): stack shut down");
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_stop(&mut self) {
        self.sim.connected = false;
        self.sim.rx.clear();
        info!("SPP(sim): stopped");
    }

    #[cfg(target_os = "espidf")]
    fn platform_send(&mut self, text: &str) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        let handle = SPP_HANDLE.load(AtomicOrdering::Acquire);
        if handle == 0 {
            return Err(CommsError::NotConnected);
        }
        // SAFETY: the stack copies the buffer before returning.
        let ret = unsafe { esp_spp_write(handle, text.len() as i32, text.as_ptr().cast_mut()) };
        if ret == ESP_OK as i32 {
            Ok(())
        } else {
            Err(CommsError::SendFailed)
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_send(&mut self, text: &str) -> Result<(), CommsError> {
        self.sim.sent.push(text.to_owned());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn next_rx_byte(&mut self) -> Option<u8> {
        SPP_RX.lock().ok().and_then(|mut q| q.pop_front())
    }

    #[cfg(not(target_os = "espidf"))]
    fn next_rx_byte(&mut self) -> Option<u8> {
        self.sim.rx.pop_front()
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Simulation: a client opens the SPP channel.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect_client(&mut self) {
        if self.state == LinkState::Off {
            warn!("SPP(sim): connect ignored, server not started");
            return;
        }
        self.sim.connected = true;
        info!("SPP(sim): client connected");
        if let Some(flag) = &self.notifier {
            flag.raise();
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_disconnect_client(&mut self) {
        self.sim.connected = false;
        self.sim.rx.clear();
    }

    /// Simulation: bytes written by the connected client.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_push_bytes(&mut self, bytes: &[u8]) {
        if self.sim.connected {
            self.sim.rx.extend(bytes);
        }
    }

    /// Simulation: everything sent to the client so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_sent(&self) -> &[String] {
        &self.sim.sent
    }
}

// ───────────────────────────────────────────────────────────────
// WirelessPort implementation
// ───────────────────────────────────────────────────────────────

impl WirelessPort for BtSerial {
    fn start(&mut self, name: &str) -> Result<(), CommsError> {
        if self.state == LinkState::Listening {
            return Ok(());
        }
        if name.is_empty() || !is_printable_ascii(name) {
            warn!("SPP: refusing to advertise invalid name {:?}", name);
            return Err(CommsError::ServerStartFailed);
        }
        self.platform_start(name)?;
        self.assembler.reset();
        self.state = LinkState::Listening;
        Ok(())
    }

    fn stop(&mut self) {
        if self.state == LinkState::Off {
            return;
        }
        self.platform_stop();
        self.assembler.reset();
        self.state = LinkState::Off;
    }

    #[cfg(target_os = "espidf")]
    fn is_client_connected(&self) -> bool {
        self.state == LinkState::Listening && SPP_HANDLE.load(AtomicOrdering::Acquire) != 0
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_client_connected(&self) -> bool {
        self.state == LinkState::Listening && self.sim.connected
    }

    fn send(&mut self, text: &str) -> Result<(), CommsError> {
        if !self.is_client_connected() {
            return Err(CommsError::NotConnected);
        }
        self.platform_send(text)
    }

    fn try_receive_line(&mut self) -> Option<ReceivedLine> {
        if self.state == LinkState::Off {
            return None;
        }
        while let Some(byte) = self.next_rx_byte() {
            if let Some(line) = self.assembler.push(byte) {
                return Some(line);
            }
        }
        None
    }

    #[cfg(target_os = "espidf")]
    fn set_connect_notifier(&mut self, flag: EventFlag) {
        if let Ok(mut slot) = SPP_CONNECT_FLAG.lock() {
            *slot = Some(flag);
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn set_connect_notifier(&mut self, flag: EventFlag) {
        self.notifier = Some(flag);
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
