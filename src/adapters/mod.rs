//! Hardware adapters implementing the engine's port traits.
//!
//! `hal_pins` works with any `embedded-hal` HAL.  The ESP-IDF adapters are
//! only compiled with the `espidf` feature on an ESP-IDF target.

pub mod hal_pins;

#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub mod esp_gpio;
#[cfg(all(feature = "espidf", target_os = "espidf"))]
pub mod esp_timer;
