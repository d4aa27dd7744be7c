//! Console adapter: status reports on the UART.
//!
//! ESP-IDF routes `stdout` to UART0, so the same `std::io` path serves
//! the board and the host.  Input is only ever peeked once, at boot, to
//! let an operator force a touch recalibration.

use std::io::Write;

use crate::app::ports::ConsolePort;

#[derive(Default)]
pub struct StdoutConsole;

impl StdoutConsole {
    pub fn new() -> Self {
        Self
    }
}

impl ConsolePort for StdoutConsole {
    fn write_text(&mut self, text: &str) {
        let mut out = std::io::stdout().lock();
        if out.write_all(text.as_bytes()).and_then(|()| out.flush()).is_err() {
            log::warn!("console: write failed");
        }
    }

    #[cfg(target_os = "espidf")]
    fn input_pending(&mut self) -> bool {
        use esp_idf_svc::sys::{F_GETFL, F_SETFL, O_NONBLOCK, fcntl, read};

        let mut byte = 0u8;
        // SAFETY: the console fd stays open for the program's lifetime and
        // the read targets a local byte.
        unsafe {
            let flags = fcntl(CONSOLE_FD, F_GETFL as i32);
            fcntl(CONSOLE_FD, F_SETFL as i32, flags | O_NONBLOCK as i32);
            read(CONSOLE_FD, (&raw mut byte).cast(), 1) > 0
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn input_pending(&mut self) -> bool {
        false
    }
}

/// UART0 as seen through the VFS.
#[cfg(target_os = "espidf")]
const CONSOLE_FD: i32 = 0;
