//! Inbound configuration commands.
//!
//! Firmware-level automations describe a PWM change as one action record;
//! [`Engine::apply_action`](super::engine::Engine::apply_action) applies it.

use super::ports::PinId;

/// Set a channel's duty and dithering, optionally retuning the frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmAction {
    pub pin: PinId,
    pub duty: u16,
    pub dithering: u16,
    /// New engine-wide frequency; `None` leaves it unchanged.
    pub frequency_hz: Option<u16>,
}
