//! Application core: pure domain logic, zero I/O.
//!
//! Power modes, touch dispatch, periodic tasks and status reports for the
//! panel.  All interaction with hardware happens through **port traits**
//! defined in [`ports`], keeping this layer fully testable without real
//! peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
pub mod state;
