//! Engine core: lifecycle, configuration and the ISR entry points.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer fully testable without real peripherals.

pub mod commands;
pub mod engine;
pub mod ports;
pub mod shared;
