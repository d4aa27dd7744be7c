//! RelayPanel firmware library.
//!
//! Exposes the control-loop core and the adapters for integration testing.
//! All ESP-IDF-specific code is guarded by `#[cfg(target_os = "espidf")]`
//! within each module; every other target gets a simulation backend.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod error;
pub mod events;
pub mod power;
pub mod report;
pub mod scheduler;
pub mod touch;
pub mod ui;

pub mod pins;

pub mod adapters;
pub mod drivers;
pub mod sensors;
