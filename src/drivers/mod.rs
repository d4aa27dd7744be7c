//! Peripheral drivers and one-shot hardware initialisation.

pub mod hw_init;
pub mod onewire;
pub mod relay;
pub mod xpt2046;
